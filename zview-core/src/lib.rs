pub mod geometry {
    use glam::{DAffine3, DQuat, DVec2, DVec3};
    use serde::{Deserialize, Serialize};

    /// 单轴范围。`None` 表示该轴尚未收到任何有限值。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct AxisRange {
        pub min: Option<f64>,
        pub max: Option<f64>,
    }

    impl AxisRange {
        #[inline]
        pub fn is_defined(&self) -> bool {
            self.min.is_some() && self.max.is_some()
        }

        /// 仅接受有限值，NaN/无穷不会影响该轴。
        pub fn include(&mut self, value: f64) {
            if !value.is_finite() {
                return;
            }
            self.min = Some(match self.min {
                Some(current) if current <= value => current,
                _ => value,
            });
            self.max = Some(match self.max {
                Some(current) if current >= value => current,
                _ => value,
            });
        }

        /// 折叠规则：旧值未定义或新值严格更小（更大）时才替换。
        pub fn merge(&mut self, other: &AxisRange) {
            if let Some(min) = other.min {
                if self.min.is_none_or(|current| min < current) {
                    self.min = Some(min);
                }
            }
            if let Some(max) = other.max {
                if self.max.is_none_or(|current| max > current) {
                    self.max = Some(max);
                }
            }
        }

        #[inline]
        pub fn extent(&self) -> Option<f64> {
            Some(self.max? - self.min?)
        }

        #[inline]
        pub fn midpoint(&self) -> Option<f64> {
            Some((self.max? + self.min?) * 0.5)
        }
    }

    /// 三轴独立的轴对齐包围盒，任一轴可单独处于未定义状态。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct BoundingBox {
        pub x: AxisRange,
        pub y: AxisRange,
        pub z: AxisRange,
    }

    impl BoundingBox {
        #[inline]
        pub fn empty() -> Self {
            Self::default()
        }

        pub fn from_points<I>(points: I) -> Self
        where
            I: IntoIterator<Item = DVec3>,
        {
            let mut bounds = Self::empty();
            for point in points {
                bounds.include_point(point);
            }
            bounds
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            !self.x.is_defined() && !self.y.is_defined() && !self.z.is_defined()
        }

        pub fn include_point(&mut self, point: DVec3) {
            self.x.include(point.x);
            self.y.include(point.y);
            self.z.include(point.z);
        }

        pub fn merge(&mut self, other: &BoundingBox) {
            self.x.merge(&other.x);
            self.y.merge(&other.y);
            self.z.merge(&other.z);
        }

        /// 平面最小角点，仅当 x/y 两轴都已定义时返回。
        pub fn min_2d(&self) -> Option<DVec2> {
            Some(DVec2::new(self.x.min?, self.y.min?))
        }

        pub fn max_2d(&self) -> Option<DVec2> {
            Some(DVec2::new(self.x.max?, self.y.max?))
        }

        pub fn center_2d(&self) -> Option<DVec2> {
            Some(DVec2::new(self.x.midpoint()?, self.y.midpoint()?))
        }

        /// 检查包围盒的平面部分是否落在矩形 `[min, max]` 内（含容差）。
        pub fn within_2d(&self, min: DVec2, max: DVec2, tolerance: f64) -> bool {
            match (self.min_2d(), self.max_2d()) {
                (Some(own_min), Some(own_max)) => {
                    own_min.x >= min.x - tolerance
                        && own_min.y >= min.y - tolerance
                        && own_max.x <= max.x + tolerance
                        && own_max.y <= max.y + tolerance
                }
                _ => false,
            }
        }
    }

    /// 块参照变换：缩放、绕 Z 轴旋转、平移，外加块基点偏移。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Transform {
        pub scale: DVec2,
        /// 弧度。
        pub rotation: f64,
        pub translation: DVec3,
        #[serde(default)]
        pub base_point: DVec3,
    }

    impl Transform {
        pub const IDENTITY: Self = Self {
            scale: DVec2::ONE,
            rotation: 0.0,
            translation: DVec3::ZERO,
            base_point: DVec3::ZERO,
        };

        /// 组合顺序：T(translation) · R(rotation) · S(scale) · T(-base_point)。
        pub fn to_affine(&self) -> DAffine3 {
            let local = DAffine3::from_scale_rotation_translation(
                DVec3::new(self.scale.x, self.scale.y, 1.0),
                DQuat::from_rotation_z(self.rotation),
                self.translation,
            );
            local * DAffine3::from_translation(-self.base_point)
        }

        #[inline]
        pub fn apply(&self, point: DVec3) -> DVec3 {
            self.to_affine().transform_point3(point)
        }
    }

    impl Default for Transform {
        fn default() -> Self {
            Self::IDENTITY
        }
    }

}

pub mod drawing {
    use std::collections::HashMap;

    use glam::DVec3;
    use serde::{Deserialize, Serialize};

    /// 图层记录，颜色为解析器给出的 24 位 RGB。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<u32>,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                color: None,
            }
        }

        #[inline]
        pub fn with_color(name: impl Into<String>, color: u32) -> Self {
            Self {
                name: name.into(),
                color: Some(color),
            }
        }
    }

    /// 线型：有符号长度序列，正值为实线段，负值为间隙。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LineType {
        pub name: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub pattern: Vec<f64>,
    }

    impl LineType {
        /// 图案总长度 = 各段绝对值之和。
        pub fn pattern_length(&self) -> f64 {
            self.pattern.iter().map(|segment| segment.abs()).sum()
        }

        #[inline]
        pub fn is_dashed(&self) -> bool {
            !self.pattern.is_empty()
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Block {
        pub name: String,
        #[serde(default)]
        pub base_point: DVec3,
        #[serde(default)]
        pub entities: Vec<Entity>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vertex {
        pub position: DVec3,
        #[serde(default)]
        pub bulge: f64,
    }

    impl Vertex {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self {
                position: DVec3::new(x, y, 0.0),
                bulge: 0.0,
            }
        }

        #[inline]
        pub fn with_bulge(x: f64, y: f64, bulge: f64) -> Self {
            Self {
                position: DVec3::new(x, y, 0.0),
                bulge,
            }
        }

        #[inline]
        pub fn has_bulge(&self) -> bool {
            self.bulge != 0.0
        }
    }

    /// 图元记录：公共属性 + 几何数据。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Entity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub layer: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub line_type: Option<String>,
        #[serde(flatten)]
        pub geometry: EntityGeometry,
    }

    impl Entity {
        #[inline]
        pub fn new(geometry: EntityGeometry) -> Self {
            Self {
                color: None,
                layer: None,
                line_type: None,
                geometry,
            }
        }

        #[inline]
        pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
            self.layer = Some(layer.into());
            self
        }

        #[inline]
        pub fn with_color(mut self, color: u32) -> Self {
            self.color = Some(color);
            self
        }

        #[inline]
        pub fn with_line_type(mut self, line_type: impl Into<String>) -> Self {
            self.line_type = Some(line_type.into());
            self
        }

        #[inline]
        pub fn kind(&self) -> &str {
            self.geometry.kind()
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum EntityGeometry {
        Arc(Arc),
        Circle(Circle),
        #[serde(alias = "POLYLINE", alias = "LWPOLYLINE")]
        Line(Polyline),
        Text(Text),
        #[serde(rename = "MTEXT")]
        MText(MText),
        Solid(Solid),
        Point(Point),
        Insert(Insert),
        Spline(Spline),
        Ellipse(Ellipse),
        Dimension(Dimension),
        /// 解析器产出但引擎不支持的类型，保留原始类型名。
        Unsupported { kind: String },
    }

    impl EntityGeometry {
        pub fn kind(&self) -> &str {
            match self {
                EntityGeometry::Arc(_) => "ARC",
                EntityGeometry::Circle(_) => "CIRCLE",
                EntityGeometry::Line(_) => "LINE",
                EntityGeometry::Text(_) => "TEXT",
                EntityGeometry::MText(_) => "MTEXT",
                EntityGeometry::Solid(_) => "SOLID",
                EntityGeometry::Point(_) => "POINT",
                EntityGeometry::Insert(_) => "INSERT",
                EntityGeometry::Spline(_) => "SPLINE",
                EntityGeometry::Ellipse(_) => "ELLIPSE",
                EntityGeometry::Dimension(_) => "DIMENSION",
                EntityGeometry::Unsupported { kind } => kind,
            }
        }
    }

    /// 圆弧，角度为弧度，逆时针方向。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Arc {
        pub center: DVec3,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Circle {
        pub center: DVec3,
        pub radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub start_angle: Option<f64>,
    }

    /// LINE / POLYLINE / LWPOLYLINE 共用的顶点序列。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<Vertex>,
        /// DXF 中的 "shape" 标记，闭合时首点会被追加到末尾。
        #[serde(default, alias = "shape")]
        pub closed: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Text {
        pub position: DVec3,
        pub text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub height: Option<f64>,
        /// 角度制。
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub rotation: Option<f64>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MText {
        pub position: DVec3,
        pub text: String,
        pub height: f64,
        /// 参考框宽度，缺省时不做溢出检查。
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub width: Option<f64>,
        pub attachment_point: i16,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Solid {
        pub points: [DVec3; 4],
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Point {
        pub position: DVec3,
    }

    /// 块参照（INSERT）。旋转为角度制。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Insert {
        pub name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub position: Option<DVec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub x_scale: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub y_scale: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub rotation: Option<f64>,
    }

    impl Insert {
        #[inline]
        pub fn named(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                position: None,
                x_scale: None,
                y_scale: None,
                rotation: None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Spline {
        pub degree: i32,
        pub control_points: Vec<DVec3>,
    }

    /// 椭圆：主轴端点相对圆心给出，参数范围为弧度。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Ellipse {
        pub center: DVec3,
        pub major_axis_end: DVec3,
        pub axis_ratio: f64,
        pub start_angle: f64,
        pub end_angle: f64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Dimension {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub block: Option<String>,
    }

    /// 解析器交付的完整图纸：实体、块、图层与线型表。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Drawing {
        #[serde(default)]
        entities: Vec<Entity>,
        #[serde(default)]
        blocks: HashMap<String, Block>,
        #[serde(default)]
        layers: HashMap<String, Layer>,
        #[serde(default)]
        line_types: HashMap<String, LineType>,
    }

    impl Drawing {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_entity(&mut self, entity: Entity) {
            self.entities.push(entity);
        }

        pub fn add_block(&mut self, block: Block) {
            self.blocks.insert(block.name.clone(), block);
        }

        pub fn add_layer(&mut self, layer: Layer) {
            self.layers.insert(layer.name.clone(), layer);
        }

        pub fn add_line_type(&mut self, line_type: LineType) {
            self.line_types.insert(line_type.name.clone(), line_type);
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &Entity> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity_count(&self) -> usize {
            self.entities.len()
        }

        #[inline]
        pub fn block(&self, name: &str) -> Option<&Block> {
            self.blocks.get(name)
        }

        #[inline]
        pub fn blocks(&self) -> impl Iterator<Item = &Block> {
            self.blocks.values()
        }

        #[inline]
        pub fn layer(&self, name: &str) -> Option<&Layer> {
            self.layers.get(name)
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.values()
        }

        #[inline]
        pub fn line_type(&self, name: &str) -> Option<&LineType> {
            self.line_types.get(name)
        }

        #[inline]
        pub fn line_types(&self) -> impl Iterator<Item = &LineType> {
            self.line_types.values()
        }
    }

}
