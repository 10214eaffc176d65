use glam::{DAffine3, DVec3};
use serde::Serialize;
use zview_core::geometry::{BoundingBox, Transform};

use crate::color::Color;

/// 渲染端可直接消费的几何图元。`Group` 对应块参照，子图元处于组的局部坐标系。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Line(LinePrimitive),
    Point(PointPrimitive),
    Mesh(MeshPrimitive),
    Text(TextPrimitive),
    Group(GroupPrimitive),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePrimitive {
    pub vertices: Vec<DVec3>,
    pub color: Color,
    pub stroke: Stroke,
}

impl LinePrimitive {
    /// 沿折线累计的长度，渲染端据此计算虚线相位。
    pub fn line_distances(&self) -> Vec<f64> {
        let mut distances = Vec::with_capacity(self.vertices.len());
        let mut total = 0.0;
        let mut previous: Option<DVec3> = None;
        for vertex in &self.vertices {
            if let Some(prev) = previous {
                total += prev.distance(*vertex);
            }
            distances.push(total);
            previous = Some(*vertex);
        }
        distances
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum Stroke {
    Solid,
    Dashed(DashStyle),
}

/// 虚线样式元数据，不在引擎内栅格化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashStyle {
    pub dash_size: f64,
    pub gap_size: f64,
    pub pattern: Vec<f64>,
    pub pattern_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointPrimitive {
    pub position: DVec3,
    pub color: Color,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshPrimitive {
    pub vertices: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
    pub color: Color,
}

/// 已完成排版定位的文字。`position` 为左下角，宽高来自文字排版协作者的测量。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPrimitive {
    pub content: String,
    pub position: DVec3,
    /// 弧度。
    pub rotation: f64,
    pub height: f64,
    pub width: f64,
    pub color: Color,
}

impl TextPrimitive {
    fn corners(&self) -> [DVec3; 4] {
        let (sin, cos) = self.rotation.sin_cos();
        let along = DVec3::new(cos, sin, 0.0);
        let up = DVec3::new(-sin, cos, 0.0);
        [
            self.position,
            self.position + along * self.width,
            self.position + up * self.height,
            self.position + along * self.width + up * self.height,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPrimitive {
    pub transform: Transform,
    pub children: Vec<Primitive>,
}

impl Primitive {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Line(_) => "line",
            Primitive::Point(_) => "point",
            Primitive::Mesh(_) => "mesh",
            Primitive::Text(_) => "text",
            Primitive::Group(_) => "group",
        }
    }

    /// 世界坐标下的包围盒（组会把变换作用到所有后代）。
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        self.accumulate_bounds(&DAffine3::IDENTITY, &mut bounds);
        bounds
    }

    fn accumulate_bounds(&self, parent: &DAffine3, bounds: &mut BoundingBox) {
        match self {
            Primitive::Line(line) => {
                for vertex in &line.vertices {
                    bounds.include_point(world_point(parent, *vertex));
                }
            }
            Primitive::Point(point) => {
                bounds.include_point(world_point(parent, point.position));
            }
            Primitive::Mesh(mesh) => {
                for vertex in &mesh.vertices {
                    bounds.include_point(world_point(parent, *vertex));
                }
            }
            Primitive::Text(text) => {
                for corner in text.corners() {
                    bounds.include_point(world_point(parent, corner));
                }
            }
            Primitive::Group(group) => {
                let affine = *parent * group.transform.to_affine();
                for child in &group.children {
                    child.accumulate_bounds(&affine, bounds);
                }
            }
        }
    }

    /// 展开组，返回世界坐标下的叶子图元。
    pub fn flatten(&self) -> Vec<Primitive> {
        let mut out = Vec::new();
        self.flatten_into(&DAffine3::IDENTITY, &mut out);
        out
    }

    fn flatten_into(&self, parent: &DAffine3, out: &mut Vec<Primitive>) {
        match self {
            Primitive::Line(line) => out.push(Primitive::Line(LinePrimitive {
                vertices: transform_all(parent, &line.vertices),
                ..line.clone()
            })),
            Primitive::Point(point) => out.push(Primitive::Point(PointPrimitive {
                position: world_point(parent, point.position),
                ..point.clone()
            })),
            Primitive::Mesh(mesh) => out.push(Primitive::Mesh(MeshPrimitive {
                vertices: transform_all(parent, &mesh.vertices),
                ..mesh.clone()
            })),
            Primitive::Text(text) => {
                let along = parent.transform_vector3(DVec3::X);
                let up = parent.transform_vector3(DVec3::Y);
                out.push(Primitive::Text(TextPrimitive {
                    position: world_point(parent, text.position),
                    rotation: text.rotation + along.y.atan2(along.x),
                    height: text.height * up.length(),
                    width: text.width * along.length(),
                    ..text.clone()
                }));
            }
            Primitive::Group(group) => {
                let affine = *parent * group.transform.to_affine();
                for child in &group.children {
                    child.flatten_into(&affine, out);
                }
            }
        }
    }

    /// 叶子图元数量（组本身不计）。
    pub fn leaf_count(&self) -> usize {
        match self {
            Primitive::Group(group) => group.children.iter().map(Primitive::leaf_count).sum(),
            _ => 1,
        }
    }
}

fn transform_all(affine: &DAffine3, vertices: &[DVec3]) -> Vec<DVec3> {
    vertices
        .iter()
        .map(|vertex| world_point(affine, *vertex))
        .collect()
}

/// 变换单个点。非有限分量只让依赖它的世界轴变为 NaN，其余轴照常计算。
fn world_point(affine: &DAffine3, point: DVec3) -> DVec3 {
    if point.is_finite() {
        return affine.transform_point3(point);
    }
    let columns = [
        (affine.matrix3.x_axis, point.x),
        (affine.matrix3.y_axis, point.y),
        (affine.matrix3.z_axis, point.z),
    ];
    let mut world = affine.translation;
    for (column, value) in columns {
        if value.is_finite() {
            world += column * value;
        } else {
            world = DVec3::select(column.cmpne(DVec3::ZERO), DVec3::NAN, world);
        }
    }
    world
}
