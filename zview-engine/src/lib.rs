pub mod block;
pub mod bounds;
pub mod bulge;
pub mod color;
pub mod diagnostics;
pub mod dispatch;
pub mod primitive;
pub mod tessellate;
pub mod text;
pub mod viewport;

pub use scene::Scene;
pub use tessellate::TessellationSettings;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum FitError {
        #[error("target size {width}x{height} must be finite and positive")]
        InvalidTarget { width: f64, height: f64 },
        #[error("scene bounds are undefined on the x or y axis")]
        EmptyBounds,
    }
}

pub mod scene {
    use std::collections::BTreeMap;

    use serde::Serialize;
    use tracing::debug;
    use zview_core::drawing::Drawing;
    use zview_core::geometry::BoundingBox;

    use crate::bounds::BoundsAggregator;
    use crate::diagnostics::Diagnostics;
    use crate::dispatch::{DispatchContext, dispatch};
    use crate::errors::FitError;
    use crate::primitive::Primitive;
    use crate::tessellate::TessellationSettings;
    use crate::text::TextShaper;
    use crate::viewport::{Viewport, fit_viewport};

    /// 单次转换的产物：顶层图元、场景包围盒以及累积的诊断。
    #[derive(Debug, Clone, Serialize)]
    pub struct Scene {
        primitives: Vec<Primitive>,
        bounds: BoundingBox,
        diagnostics: Diagnostics,
    }

    impl Scene {
        /// 按实体插入顺序分发整张图纸，并把每个顶层图元折叠进包围盒。
        pub fn build(
            drawing: &Drawing,
            settings: &TessellationSettings,
            shaper: &dyn TextShaper,
        ) -> Self {
            let ctx = DispatchContext::new(drawing, settings, shaper);
            let mut primitives = Vec::with_capacity(drawing.entity_count());
            let mut diagnostics = Diagnostics::new();
            for entity in drawing.entities() {
                dispatch(entity, &ctx, &mut primitives, &mut diagnostics);
            }

            let bounds = primitives.iter().collect::<BoundsAggregator>().finish();
            debug!(
                entities = drawing.entity_count(),
                primitives = primitives.len(),
                diagnostics = diagnostics.len(),
                "场景转换完成"
            );

            Self {
                primitives,
                bounds,
                diagnostics,
            }
        }

        #[inline]
        pub fn primitives(&self) -> &[Primitive] {
            &self.primitives
        }

        #[inline]
        pub fn bounds(&self) -> BoundingBox {
            self.bounds
        }

        #[inline]
        pub fn diagnostics(&self) -> &Diagnostics {
            &self.diagnostics
        }

        /// 按画布像素尺寸适配视口。
        pub fn fit_viewport(&self, width: f64, height: f64) -> Result<Viewport, FitError> {
            fit_viewport(&self.bounds, width, height)
        }

        /// 顶层图元按种类计数，键按名称排序。
        pub fn kind_counts(&self) -> BTreeMap<&'static str, usize> {
            let mut counts = BTreeMap::new();
            for primitive in &self.primitives {
                *counts.entry(primitive.kind_name()).or_insert(0) += 1;
            }
            counts
        }

        /// 展开所有组之后的叶子图元数量。
        pub fn leaf_count(&self) -> usize {
            self.primitives.iter().map(Primitive::leaf_count).sum()
        }
    }

}
