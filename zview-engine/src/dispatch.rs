use zview_core::drawing::{Dimension, Drawing, Entity, EntityGeometry, LineType};

use crate::block;
use crate::color::resolve_color;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::primitive::Primitive;
use crate::tessellate::{self, TessellationSettings};
use crate::text::TextShaper;

/// 这些线型名不在线型表中出现也属正常。
const IMPLICIT_LINE_TYPES: [&str; 3] = ["BYLAYER", "BYBLOCK", "CONTINUOUS"];

/// 单次转换的只读上下文，外加当前块嵌套深度。
#[derive(Clone, Copy)]
pub struct DispatchContext<'a> {
    pub drawing: &'a Drawing,
    pub settings: &'a TessellationSettings,
    pub shaper: &'a dyn TextShaper,
    depth: usize,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        drawing: &'a Drawing,
        settings: &'a TessellationSettings,
        shaper: &'a dyn TextShaper,
    ) -> Self {
        Self {
            drawing,
            settings,
            shaper,
            depth: 0,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 进入下一层块；超过最大深度时返回 `None`。
    pub fn descend(&self) -> Option<Self> {
        if self.depth >= self.settings.max_block_depth {
            return None;
        }
        Some(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

/// 将实体转换为图元并追加到 `out`。
///
/// 普通实体最多产生一个图元；INSERT 产生一个组；DIMENSION 的块内实体直接展开到 `out`。
pub fn dispatch(
    entity: &Entity,
    ctx: &DispatchContext<'_>,
    out: &mut Vec<Primitive>,
    diagnostics: &mut Diagnostics,
) {
    let color = resolve_color(entity, ctx.drawing);
    let settings = ctx.settings;
    let primitive = match &entity.geometry {
        EntityGeometry::Circle(circle) => Some(tessellate::circle(circle, color, settings)),
        EntityGeometry::Arc(arc) => Some(tessellate::arc(arc, color, settings)),
        EntityGeometry::Line(polyline) => {
            let line_type = lookup_line_type(entity, ctx.drawing, diagnostics);
            Some(tessellate::polyline(polyline, color, line_type, settings))
        }
        EntityGeometry::Ellipse(ellipse) => Some(tessellate::ellipse(ellipse, color, settings)),
        EntityGeometry::Spline(spline) => {
            reported(tessellate::spline(spline, color, settings), diagnostics)
        }
        EntityGeometry::Solid(solid) => Some(tessellate::solid(solid, color)),
        EntityGeometry::Point(point) => Some(tessellate::point(point, color, settings)),
        EntityGeometry::Text(text) => {
            reported(tessellate::text(text, color, ctx.shaper), diagnostics)
        }
        EntityGeometry::MText(mtext) => {
            reported(tessellate::mtext(mtext, color, ctx.shaper), diagnostics)
        }
        EntityGeometry::Insert(insert) => block::instantiate(insert, ctx, diagnostics),
        EntityGeometry::Dimension(dimension) => {
            flatten_dimension(dimension, ctx, out, diagnostics);
            None
        }
        EntityGeometry::Unsupported { kind } => {
            diagnostics.report(Diagnostic::UnsupportedEntity { kind: kind.clone() });
            None
        }
    };

    if let Some(primitive) = primitive {
        out.push(primitive);
    }
}

/// DIMENSION 引用的块内实体按顶层实体处理，直接进入调用方的输出。
fn flatten_dimension(
    dimension: &Dimension,
    ctx: &DispatchContext<'_>,
    out: &mut Vec<Primitive>,
    diagnostics: &mut Diagnostics,
) {
    let Some(name) = dimension.block.as_deref() else {
        diagnostics.report(Diagnostic::DimensionWithoutBlock);
        return;
    };
    let Some(block) = ctx
        .drawing
        .block(name)
        .filter(|block| !block.entities.is_empty())
    else {
        diagnostics.report(Diagnostic::MissingBlock {
            name: name.to_string(),
            referrer: "dimension",
        });
        return;
    };
    let Some(nested) = ctx.descend() else {
        diagnostics.report(Diagnostic::BlockDepthExceeded {
            name: name.to_string(),
            limit: ctx.settings.max_block_depth,
        });
        return;
    };

    for entity in &block.entities {
        dispatch(entity, &nested, out, diagnostics);
    }
}

fn lookup_line_type<'d>(
    entity: &Entity,
    drawing: &'d Drawing,
    diagnostics: &mut Diagnostics,
) -> Option<&'d LineType> {
    let name = entity.line_type.as_deref()?;
    let found = drawing.line_type(name);
    if found.is_none()
        && !IMPLICIT_LINE_TYPES
            .iter()
            .any(|implicit| implicit.eq_ignore_ascii_case(name))
    {
        diagnostics.report(Diagnostic::MissingLineType {
            name: name.to_string(),
        });
    }
    found
}

fn reported(
    result: Result<Primitive, Diagnostic>,
    diagnostics: &mut Diagnostics,
) -> Option<Primitive> {
    result
        .map_err(|diagnostic| diagnostics.report(diagnostic))
        .ok()
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use zview_core::drawing::{Block, Circle, MText, Point, Polyline, Spline, Vertex};

    use super::*;
    use crate::primitive::Stroke;
    use crate::text::FixedAdvanceShaper;

    fn run(drawing: &Drawing) -> (Vec<Primitive>, Diagnostics) {
        let settings = TessellationSettings::default();
        let shaper = FixedAdvanceShaper::default();
        let ctx = DispatchContext::new(drawing, &settings, &shaper);
        let mut out = Vec::new();
        let mut diagnostics = Diagnostics::new();
        for entity in drawing.entities() {
            dispatch(entity, &ctx, &mut out, &mut diagnostics);
        }
        (out, diagnostics)
    }

    fn point_at(x: f64, y: f64) -> Entity {
        Entity::new(EntityGeometry::Point(Point {
            position: DVec3::new(x, y, 0.0),
        }))
    }

    #[test]
    fn unsupported_entity_is_reported_and_skipped() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityGeometry::Unsupported {
            kind: "HATCH".to_string(),
        }));
        drawing.add_entity(point_at(0.0, 0.0));

        let (out, diagnostics) = run(&drawing);
        assert_eq!(out.len(), 1);
        assert_eq!(
            diagnostics.iter().next(),
            Some(&Diagnostic::UnsupportedEntity {
                kind: "HATCH".to_string()
            })
        );
    }

    #[test]
    fn dimension_block_is_flattened_into_output() {
        let mut drawing = Drawing::new();
        drawing.add_block(Block {
            name: "*D1".to_string(),
            base_point: DVec3::ZERO,
            entities: vec![point_at(1.0, 1.0), point_at(2.0, 2.0)],
        });
        drawing.add_entity(Entity::new(EntityGeometry::Dimension(Dimension {
            block: Some("*D1".to_string()),
        })));

        let (out, diagnostics) = run(&drawing);
        assert!(diagnostics.is_empty());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| matches!(p, Primitive::Point(_))));
    }

    #[test]
    fn dimension_without_or_with_missing_block_is_skipped() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityGeometry::Dimension(Dimension { block: None })));
        drawing.add_entity(Entity::new(EntityGeometry::Dimension(Dimension {
            block: Some("*D9".to_string()),
        })));

        let (out, diagnostics) = run(&drawing);
        assert!(out.is_empty());
        let collected: Vec<_> = diagnostics.iter().cloned().collect();
        assert_eq!(
            collected,
            vec![
                Diagnostic::DimensionWithoutBlock,
                Diagnostic::MissingBlock {
                    name: "*D9".to_string(),
                    referrer: "dimension"
                }
            ]
        );
    }

    #[test]
    fn missing_line_type_falls_back_to_solid() {
        let mut drawing = Drawing::new();
        let line = Polyline {
            vertices: vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)],
            closed: false,
        };
        drawing.add_entity(
            Entity::new(EntityGeometry::Line(line.clone())).with_line_type("HIDDEN2"),
        );
        drawing.add_entity(Entity::new(EntityGeometry::Line(line)).with_line_type("ByLayer"));

        let (out, diagnostics) = run(&drawing);
        assert_eq!(out.len(), 2);
        assert!(
            out.iter()
                .all(|p| matches!(p, Primitive::Line(line) if line.stroke == Stroke::Solid))
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn text_failures_become_diagnostics() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityGeometry::MText(MText {
            position: DVec3::ZERO,
            text: "A very long note".to_string(),
            height: 1.0,
            width: Some(1.0),
            attachment_point: 1,
        })));
        drawing.add_entity(Entity::new(EntityGeometry::Circle(Circle {
            center: DVec3::ZERO,
            radius: 1.0,
            start_angle: None,
        })));

        let (out, diagnostics) = run(&drawing);
        assert_eq!(out.len(), 1);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::LayoutOverflow { .. })
        ));
    }

    #[test]
    fn degenerate_spline_is_reported() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityGeometry::Spline(Spline {
            degree: 2,
            control_points: vec![DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)],
        })));
        drawing.add_entity(point_at(0.0, 0.0));

        let (out, diagnostics) = run(&drawing);
        assert_eq!(out.len(), 1);
        assert_eq!(
            diagnostics.iter().next(),
            Some(&Diagnostic::DegenerateSpline {
                degree: 2,
                control_points: 2,
            })
        );
    }

    #[test]
    fn descend_stops_at_max_depth() {
        let drawing = Drawing::new();
        let settings = TessellationSettings {
            max_block_depth: 1,
            ..TessellationSettings::default()
        };
        let shaper = FixedAdvanceShaper::default();
        let ctx = DispatchContext::new(&drawing, &settings, &shaper);
        let nested = ctx.descend().expect("first level allowed");
        assert_eq!(nested.depth(), 1);
        assert!(nested.descend().is_none());
    }
}
