//! 单个实体到几何图元的纯函数转换。
//!
//! 角度均为弧度、逆时针；采样数指等分段数，输出顶点数为段数 + 1。

use std::f64::consts::TAU;

use glam::{DVec2, DVec3};
use zview_core::drawing::{
    Arc, Circle, Ellipse, LineType, MText, Point, Polyline, Solid, Spline, Text,
};

use crate::bulge::expand_bulge;
use crate::color::Color;
use crate::diagnostics::Diagnostic;
use crate::primitive::{
    DashStyle, LinePrimitive, MeshPrimitive, PointPrimitive, Primitive, Stroke, TextPrimitive,
};
use crate::text::{Attachment, TextRequest, TextShaper, sanitize_mtext};

const DASH_SIZE: f64 = 4.0;
const GAP_SIZE: f64 = 4.0;
const DEFAULT_TEXT_HEIGHT: f64 = 12.0;
/// MTEXT 排版字号相对声明高度的比例。
const MTEXT_SIZE_FACTOR: f64 = 4.0 / 5.0;

/// 曲线采样与块展开参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationSettings {
    pub arc_divisions: usize,
    pub ellipse_divisions: usize,
    pub spline_bezier_divisions: usize,
    pub spline_curve_divisions: usize,
    /// 为 `None` 时按包含角自动计算凸度弧分段。
    pub bulge_segments: Option<usize>,
    pub max_block_depth: usize,
    pub point_size: f64,
}

impl Default for TessellationSettings {
    fn default() -> Self {
        Self {
            arc_divisions: 32,
            ellipse_divisions: 50,
            spline_bezier_divisions: 50,
            spline_curve_divisions: 100,
            bulge_segments: None,
            max_block_depth: 32,
            point_size: 0.05,
        }
    }
}

pub fn circle(circle: &Circle, color: Color, settings: &TessellationSettings) -> Primitive {
    let start = circle.start_angle.unwrap_or(0.0);
    let vertices = arc_points(
        circle.center,
        circle.radius,
        start,
        start + TAU,
        settings.arc_divisions,
    );
    solid_line(vertices, color)
}

pub fn arc(arc: &Arc, color: Color, settings: &TessellationSettings) -> Primitive {
    let vertices = arc_points(
        arc.center,
        arc.radius,
        arc.start_angle,
        arc.end_angle,
        settings.arc_divisions,
    );
    solid_line(vertices, color)
}

/// 多段线：凸度顶点展开为圆弧，闭合时首点追加到末尾。
pub fn polyline(
    polyline: &Polyline,
    color: Color,
    line_type: Option<&LineType>,
    settings: &TessellationSettings,
) -> Primitive {
    let source = &polyline.vertices;
    let mut vertices: Vec<DVec3> = Vec::with_capacity(source.len());
    for (index, vertex) in source.iter().enumerate() {
        if vertex.has_bulge() {
            let end = match source.get(index + 1) {
                Some(next) => next.position,
                // 末顶点的凸度指向首个输出顶点。
                None => vertices.first().copied().unwrap_or(vertex.position),
            };
            vertices.extend(expand_bulge(
                vertex.position,
                end,
                vertex.bulge,
                settings.bulge_segments,
            ));
        } else {
            let position = vertex.position;
            vertices.push(DVec3::new(position.x, position.y, 0.0));
        }
    }
    if polyline.closed {
        if let Some(first) = vertices.first().copied() {
            vertices.push(first);
        }
    }

    Primitive::Line(LinePrimitive {
        vertices,
        color,
        stroke: stroke_for(line_type),
    })
}

/// 线型存在且图案非空时使用虚线。
pub fn stroke_for(line_type: Option<&LineType>) -> Stroke {
    match line_type {
        Some(line_type) if line_type.is_dashed() => Stroke::Dashed(DashStyle {
            dash_size: DASH_SIZE,
            gap_size: GAP_SIZE,
            pattern: line_type.pattern.clone(),
            pattern_length: line_type.pattern_length(),
        }),
        _ => Stroke::Solid,
    }
}

pub fn ellipse(ellipse: &Ellipse, color: Color, settings: &TessellationSettings) -> Primitive {
    let axis = ellipse.major_axis_end;
    let major = (axis.x * axis.x + axis.y * axis.y).sqrt();
    let minor = major * ellipse.axis_ratio;
    let rotation = axis.y.atan2(axis.x);
    let (sin, cos) = rotation.sin_cos();
    let center = ellipse.center;

    let vertices = sweep(
        ellipse.start_angle,
        ellipse.end_angle,
        settings.ellipse_divisions,
    )
    .map(|angle| {
        let local = DVec2::new(major * angle.cos(), minor * angle.sin());
        DVec3::new(
            center.x + local.x * cos - local.y * sin,
            center.y + local.x * sin + local.y * cos,
            center.z,
        )
    })
    .collect();
    solid_line(vertices, color)
}

/// 二次/三次样条按步长 2 取重叠三元组近似为二次贝塞尔，其余阶数用 Catmull-Rom 插值。
/// 控制点不足以采样时返回 `DegenerateSpline`。
pub fn spline(
    spline: &Spline,
    color: Color,
    settings: &TessellationSettings,
) -> Result<Primitive, Diagnostic> {
    let points: Vec<DVec2> = spline
        .control_points
        .iter()
        .map(|point| point.truncate())
        .collect();
    let degenerate = || Diagnostic::DegenerateSpline {
        degree: spline.degree,
        control_points: points.len(),
    };
    if points.len() < 2 {
        return Err(degenerate());
    }

    let sampled: Vec<DVec2> = if matches!(spline.degree, 2 | 3) {
        let divisions = settings.spline_bezier_divisions.max(1);
        let mut sampled = Vec::new();
        let mut i = 0;
        while i + 2 < points.len() {
            let (p0, p1, p2) = (points[i], points[i + 1], points[i + 2]);
            sampled.extend((0..=divisions).map(|step| {
                quadratic_bezier(p0, p1, p2, step as f64 / divisions as f64)
            }));
            i += 2;
        }
        sampled
    } else {
        let divisions = settings.spline_curve_divisions.max(1);
        (0..=divisions)
            .map(|step| catmull_rom(&points, step as f64 / divisions as f64))
            .collect()
    };
    if sampled.is_empty() {
        return Err(degenerate());
    }

    Ok(solid_line(
        sampled.into_iter().map(|point| point.extend(0.0)).collect(),
        color,
    ))
}

/// 四点实心填充。根据 (p1-p0)×(p2-p0) 的 z 分量决定三角形环绕方向，保证朝向一致。
pub fn solid(solid: &Solid, color: Color) -> Primitive {
    let [p0, p1, p2, _] = solid.points;
    let normal_z = (p1 - p0).cross(p2 - p0).z;
    let triangles = if normal_z < 0.0 {
        vec![[2, 1, 0], [2, 3, 1]]
    } else {
        vec![[0, 1, 2], [1, 3, 2]]
    };
    Primitive::Mesh(MeshPrimitive {
        vertices: solid.points.to_vec(),
        triangles,
        color,
    })
}

pub fn point(point: &Point, color: Color, settings: &TessellationSettings) -> Primitive {
    Primitive::Point(PointPrimitive {
        position: point.position,
        color,
        size: settings.point_size,
    })
}

/// 单行文字：按声明高度排版，旋转由角度转为弧度。
pub fn text(
    text: &Text,
    color: Color,
    shaper: &dyn TextShaper,
) -> Result<Primitive, Diagnostic> {
    let height = text
        .height
        .filter(|height| *height > 0.0)
        .unwrap_or(DEFAULT_TEXT_HEIGHT);
    let metrics = shaper
        .shape(&TextRequest {
            text: &text.text,
            height,
        })
        .ok_or_else(|| Diagnostic::TextShapingUnavailable {
            text: text.text.clone(),
        })?;

    Ok(Primitive::Text(TextPrimitive {
        content: text.text.clone(),
        position: text.position,
        rotation: text.rotation.unwrap_or(0.0).to_radians(),
        height: metrics.height,
        width: metrics.width,
        color,
    }))
}

/// 多行文字：排版后测宽，超出参考框则放弃；再按附着点偏移插入位置。
pub fn mtext(
    mtext: &MText,
    color: Color,
    shaper: &dyn TextShaper,
) -> Result<Primitive, Diagnostic> {
    let content = sanitize_mtext(&mtext.text);
    let metrics = shaper
        .shape(&TextRequest {
            text: &content,
            height: mtext.height * MTEXT_SIZE_FACTOR,
        })
        .ok_or_else(|| Diagnostic::TextShapingUnavailable {
            text: content.clone(),
        })?;

    if let Some(declared) = mtext.width {
        if metrics.width > declared {
            return Err(Diagnostic::LayoutOverflow {
                measured: metrics.width,
                declared,
            });
        }
    }

    let attachment = Attachment::from_code(mtext.attachment_point).ok_or(
        Diagnostic::InvalidAttachment {
            code: mtext.attachment_point,
        },
    )?;
    let offset = attachment.offset(metrics.width, mtext.height);

    Ok(Primitive::Text(TextPrimitive {
        content,
        position: DVec3::new(
            mtext.position.x + offset.x,
            mtext.position.y + offset.y,
            0.0,
        ),
        rotation: 0.0,
        height: metrics.height,
        width: metrics.width,
        color,
    }))
}

/// 参数化圆弧采样，结果平移到圆心。
pub fn arc_points(
    center: DVec3,
    radius: f64,
    start: f64,
    end: f64,
    divisions: usize,
) -> Vec<DVec3> {
    sweep(start, end, divisions)
        .map(|angle| {
            DVec3::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z,
            )
        })
        .collect()
}

/// 逆时针扫角：差值折算到 [0, 2π]；起止角完全相同时退化为 0，其余接近 0 的差值视为整圆。
fn sweep(start: f64, end: f64, divisions: usize) -> impl Iterator<Item = f64> {
    let divisions = divisions.max(1);
    let mut delta = end - start;
    let same_points = delta.abs() < f64::EPSILON;
    delta = delta.rem_euclid(TAU);
    if delta < f64::EPSILON {
        delta = if same_points { 0.0 } else { TAU };
    }
    (0..=divisions).map(move |step| start + delta * step as f64 / divisions as f64)
}

fn solid_line(vertices: Vec<DVec3>, color: Color) -> Primitive {
    Primitive::Line(LinePrimitive {
        vertices,
        color,
        stroke: Stroke::Solid,
    })
}

fn quadratic_bezier(p0: DVec2, p1: DVec2, p2: DVec2, t: f64) -> DVec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

/// 均匀 Catmull-Rom，端点重复作为虚拟控制点。
fn catmull_rom(points: &[DVec2], t: f64) -> DVec2 {
    let last = points.len() - 1;
    let position = last as f64 * t;
    let index = (position.floor() as usize).min(last);
    let weight = position - index as f64;

    let p0 = points[index.saturating_sub(1)];
    let p1 = points[index];
    let p2 = points[(index + 1).min(last)];
    let p3 = points[(index + 2).min(last)];

    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;
    let t2 = weight * weight;
    let t3 = t2 * weight;
    (p1 * 2.0 - p2 * 2.0 + v0 + v1) * t3
        + (p1 * -3.0 + p2 * 3.0 - v0 * 2.0 - v1) * t2
        + v0 * weight
        + p1
}
