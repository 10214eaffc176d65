use std::io::Write;
use std::path::PathBuf;

use glam::DVec3;
use zview_core::drawing::EntityGeometry;
use zview_io::{DrawingLoader, IoError, JsonDrawingLoader};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

#[test]
fn load_site_plan_fixture() {
    let drawing = JsonDrawingLoader::new()
        .load(&fixture("site_plan.json"))
        .expect("读取 JSON 图纸失败");

    let kinds: Vec<&str> = drawing.entities().map(|entity| entity.kind()).collect();
    assert_eq!(
        kinds,
        vec!["LINE", "CIRCLE", "INSERT", "DIMENSION", "TEXT", "HATCH"]
    );

    let walls = drawing.layer("WALLS").expect("图层 WALLS");
    assert_eq!(walls.color, Some(0xFF0000));
    assert_eq!(drawing.layer("0").and_then(|layer| layer.color), None);

    let names: Vec<&str> = drawing
        .line_types()
        .map(|line_type| line_type.name.as_str())
        .collect();
    assert_eq!(names, vec!["DASHED"]);
    let dashed = drawing.line_type("DASHED").expect("线型 DASHED");
    assert!((dashed.pattern_length() - 0.75).abs() < 1e-12);

    let door = drawing.block("DOOR").expect("块 DOOR");
    assert_eq!(door.base_point, DVec3::new(1.0, 0.0, 0.0));
    assert_eq!(door.entities.len(), 2);
    assert_eq!(
        drawing.block("*D1").map(|block| block.base_point),
        Some(DVec3::ZERO)
    );
}

#[test]
fn polyline_shape_flag_and_bulge_survive() {
    let drawing = JsonDrawingLoader::new()
        .load(&fixture("site_plan.json"))
        .expect("读取 JSON 图纸失败");

    let entity = drawing.entities().next().expect("首个实体");
    assert_eq!(entity.line_type.as_deref(), Some("DASHED"));
    match &entity.geometry {
        EntityGeometry::Line(polyline) => {
            assert!(polyline.closed);
            assert_eq!(polyline.vertices.len(), 4);
            assert!((polyline.vertices[1].bulge - 0.5).abs() < 1e-12);
            assert!(!polyline.vertices[0].has_bulge());
        }
        other => panic!("期望多段线，实际为 {other:?}"),
    }
}

#[test]
fn unknown_entity_becomes_unsupported() {
    let drawing = JsonDrawingLoader::new()
        .load(&fixture("site_plan.json"))
        .expect("读取 JSON 图纸失败");

    let hatch = drawing.entities().last().expect("末尾实体");
    assert!(matches!(
        &hatch.geometry,
        EntityGeometry::Unsupported { kind } if kind == "HATCH"
    ));
    assert_eq!(hatch.layer.as_deref(), Some("WALLS"));
}

#[test]
fn missing_file_reports_path() {
    let path = fixture("does_not_exist.json");
    let err = JsonDrawingLoader::new().load(&path).unwrap_err();
    match err {
        IoError::ReadError { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_object_document_is_invalid() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(file, "[1, 2, 3]").expect("write temp file");

    let err = JsonDrawingLoader::new().load(file.path()).unwrap_err();
    assert!(matches!(err, IoError::InvalidDocument(_)));
}

#[test]
fn malformed_block_entity_names_its_block() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(
        file,
        r#"{{ "blocks": {{ "BAD": {{ "entities": [ {{ "type": "POINT" }} ] }} }} }}"#
    )
    .expect("write temp file");

    let err = JsonDrawingLoader::new().load(file.path()).unwrap_err();
    assert!(matches!(err, IoError::InvalidDocument(message) if message.contains("block `BAD`")));
}
