use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// 转换过程中可恢复的问题。任何一项都只会跳过相关图元，不会中断整个转换。
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "diagnostic", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("block `{name}` referenced by {referrer} is missing or has no entities")]
    MissingBlock { name: String, referrer: &'static str },
    #[error("dimension entity has no block reference")]
    DimensionWithoutBlock,
    #[error("line type `{name}` is not defined, falling back to a solid stroke")]
    MissingLineType { name: String },
    #[error("unsupported entity type `{kind}`")]
    UnsupportedEntity { kind: String },
    #[error("mtext width {measured:.3} exceeds box width {declared:.3} (no multi-line layout)")]
    LayoutOverflow { measured: f64, declared: f64 },
    #[error("invalid mtext attachment point {code}")]
    InvalidAttachment { code: i16 },
    #[error("text shaper could not lay out `{text}`")]
    TextShapingUnavailable { text: String },
    #[error("block `{name}` exceeds the maximum nesting depth of {limit}")]
    BlockDepthExceeded { name: String, limit: usize },
    #[error("degree {degree} spline with {control_points} control point(s) cannot be sampled")]
    DegenerateSpline { degree: i32, control_points: usize },
}

/// 单次转换累积的诊断列表。
#[derive(Debug, Default, Clone, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录诊断并输出 warn 级日志。
    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "图元已跳过或降级");
        self.items.push(diagnostic);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
