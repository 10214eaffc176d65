use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use zview_core::drawing::{Block, Drawing, Entity, EntityGeometry, Layer, LineType};

/// 引擎能够识别的实体类型标记，其余类型一律降级为 `Unsupported`。
const KNOWN_TYPES: [&str; 13] = [
    "ARC",
    "CIRCLE",
    "LINE",
    "POLYLINE",
    "LWPOLYLINE",
    "TEXT",
    "MTEXT",
    "SOLID",
    "POINT",
    "INSERT",
    "SPLINE",
    "ELLIPSE",
    "DIMENSION",
];

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DrawingLoader {
    fn load(&self, path: &Path) -> Result<Drawing, IoError>;
}

/// 读取解析器导出的 JSON 图纸。
///
/// 块、图层和线型表以名称为键；未知实体类型保留公共属性并记为 `Unsupported`，
/// 由分发器在转换时报告。
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDrawingLoader;

impl JsonDrawingLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_str(&self, content: &str) -> Result<Drawing, IoError> {
        let raw: RawDrawing = serde_json::from_str(content)
            .map_err(|err| IoError::InvalidDocument(err.to_string()))?;

        let mut drawing = Drawing::new();
        let mut unsupported = 0usize;

        for (name, layer) in raw.layers {
            drawing.add_layer(Layer {
                name,
                color: layer.color,
            });
        }
        for (name, line_type) in raw.line_types {
            drawing.add_line_type(LineType {
                name,
                description: line_type.description,
                pattern: line_type.pattern,
            });
        }
        for (name, block) in raw.blocks {
            let mut entities = Vec::with_capacity(block.entities.len());
            for (index, value) in block.entities.into_iter().enumerate() {
                let entity = decode_entity(value, &format!("block `{name}`"), index)?;
                unsupported += usize::from(is_unsupported(&entity));
                entities.push(entity);
            }
            drawing.add_block(Block {
                name,
                base_point: block.base_point,
                entities,
            });
        }
        for (index, value) in raw.entities.into_iter().enumerate() {
            let entity = decode_entity(value, "drawing", index)?;
            unsupported += usize::from(is_unsupported(&entity));
            drawing.add_entity(entity);
        }

        debug!(
            entities = drawing.entity_count(),
            blocks = drawing.blocks().count(),
            layers = drawing.layers().count(),
            line_types = drawing.line_types().count(),
            unsupported,
            "JSON 图纸解析完成"
        );
        Ok(drawing)
    }
}

impl DrawingLoader for JsonDrawingLoader {
    fn load(&self, path: &Path) -> Result<Drawing, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&data)
    }
}

#[derive(Debug, Deserialize)]
struct RawDrawing {
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    blocks: BTreeMap<String, RawBlock>,
    #[serde(default)]
    layers: BTreeMap<String, RawLayer>,
    #[serde(default)]
    line_types: BTreeMap<String, RawLineType>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    base_point: DVec3,
    #[serde(default)]
    entities: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    #[serde(default)]
    color: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLineType {
    #[serde(default)]
    description: String,
    #[serde(default)]
    pattern: Vec<f64>,
}

/// 未知类型实体只保留公共属性。
#[derive(Debug, Default, Deserialize)]
struct CommonAttributes {
    #[serde(default)]
    color: Option<u32>,
    #[serde(default)]
    layer: Option<String>,
    #[serde(default)]
    line_type: Option<String>,
}

fn decode_entity(value: Value, scope: &str, index: usize) -> Result<Entity, IoError> {
    let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return Err(IoError::InvalidDocument(format!(
            "{scope} entity #{index} has no `type` tag"
        )));
    };

    if !KNOWN_TYPES.contains(&kind.as_str()) {
        let common: CommonAttributes = serde_json::from_value(value).map_err(|err| {
            IoError::InvalidDocument(format!("{scope} entity #{index} ({kind}): {err}"))
        })?;
        return Ok(Entity {
            color: common.color,
            layer: common.layer,
            line_type: common.line_type,
            geometry: EntityGeometry::Unsupported { kind },
        });
    }

    serde_json::from_value(value)
        .map_err(|err| IoError::InvalidDocument(format!("{scope} entity #{index} ({kind}): {err}")))
}

fn is_unsupported(entity: &Entity) -> bool {
    matches!(entity.geometry, EntityGeometry::Unsupported { .. })
}
