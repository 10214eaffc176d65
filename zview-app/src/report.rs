use std::io::{self, Write};

use zview_core::geometry::AxisRange;
use zview_engine::Scene;
use zview_engine::viewport::Viewport;

/// 打印场景概览：图元统计、包围盒、视口与诊断。
pub fn write_summary(
    out: &mut impl Write,
    scene: &Scene,
    viewport: Option<&Viewport>,
) -> io::Result<()> {
    writeln!(out, "图元统计：")?;
    let counts = scene.kind_counts();
    if counts.is_empty() {
        writeln!(out, "  (无)")?;
    }
    for (kind, count) in &counts {
        writeln!(out, "  - {kind}: {count}")?;
    }
    writeln!(out, "叶子图元: {}", scene.leaf_count())?;

    let bounds = scene.bounds();
    writeln!(
        out,
        "包围盒: x={} y={} z={}",
        axis(&bounds.x),
        axis(&bounds.y),
        axis(&bounds.z)
    )?;

    match viewport {
        Some(viewport) => {
            let (min, max) = viewport.world_rect();
            writeln!(
                out,
                "视口: 中心=({:.2}, {:.2}), 宽={:.2}, 高={:.2}, 范围=({:.2}, {:.2})-({:.2}, {:.2})",
                viewport.center.x,
                viewport.center.y,
                viewport.width(),
                viewport.height(),
                min.x,
                min.y,
                max.x,
                max.y
            )?;
        }
        None => writeln!(out, "视口: 未适配")?,
    }

    let diagnostics = scene.diagnostics();
    writeln!(out, "诊断 ({}):", diagnostics.len())?;
    for diagnostic in diagnostics {
        writeln!(out, "  - {diagnostic}")?;
    }
    Ok(())
}

fn axis(range: &AxisRange) -> String {
    match (range.min, range.max) {
        (Some(min), Some(max)) => format!("[{min:.2}, {max:.2}]"),
        _ => "未定义".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use zview_core::drawing::{Circle, Drawing, Entity, EntityGeometry};
    use zview_engine::TessellationSettings;
    use zview_engine::text::FixedAdvanceShaper;

    use super::*;

    fn render(scene: &Scene, viewport: Option<&Viewport>) -> String {
        let mut buffer = Vec::new();
        write_summary(&mut buffer, scene, viewport).expect("write summary");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[test]
    fn empty_scene_reports_undefined_bounds() {
        let scene = Scene::build(
            &Drawing::new(),
            &TessellationSettings::default(),
            &FixedAdvanceShaper::default(),
        );
        let text = render(&scene, None);
        assert!(text.contains("(无)"));
        assert!(text.contains("x=未定义"));
        assert!(text.contains("视口: 未适配"));
        assert!(text.contains("诊断 (0):"));
    }

    #[test]
    fn summary_lists_kinds_and_diagnostics() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityGeometry::Circle(Circle {
            center: Default::default(),
            radius: 5.0,
            start_angle: None,
        })));
        drawing.add_entity(Entity::new(EntityGeometry::Unsupported {
            kind: "HATCH".to_string(),
        }));
        let scene = Scene::build(
            &drawing,
            &TessellationSettings::default(),
            &FixedAdvanceShaper::default(),
        );
        let viewport = scene.fit_viewport(100.0, 100.0).expect("viewport");

        let text = render(&scene, Some(&viewport));
        assert!(text.contains("  - line: 1"));
        assert!(text.contains("x=[-5.00, 5.00]"));
        assert!(text.contains("宽=10.00, 高=10.00"));
        assert!(text.contains("unsupported entity type `HATCH`"));
    }
}
