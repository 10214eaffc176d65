use zview_core::geometry::BoundingBox;

use crate::primitive::Primitive;

/// 场景包围盒累加器：逐个折叠图元的世界坐标范围。
///
/// 每轴独立使用“已定义/未定义”哨兵，位于 0 的边界同样有效。
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BoundsAggregator {
    bounds: BoundingBox,
}

impl BoundsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, primitive: &Primitive) {
        self.fold_bounds(&primitive.bounds());
    }

    pub fn fold_bounds(&mut self, bounds: &BoundingBox) {
        self.bounds.merge(bounds);
    }

    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[inline]
    pub fn finish(self) -> BoundingBox {
        self.bounds
    }
}

impl<'a> FromIterator<&'a Primitive> for BoundsAggregator {
    fn from_iter<I: IntoIterator<Item = &'a Primitive>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        for primitive in iter {
            aggregator.fold(primitive);
        }
        aggregator
    }
}
