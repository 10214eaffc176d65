use glam::DVec2;
use serde::Serialize;
use zview_core::geometry::BoundingBox;

use crate::errors::FitError;

/// 正交相机视口。四个边界为相对 `center` 的半宽/半高（left、bottom 为负）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center: DVec2,
}

impl Viewport {
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width() / self.height()
    }

    /// 世界坐标下的矩形 `(min, max)`。
    pub fn world_rect(&self) -> (DVec2, DVec2) {
        (
            self.center + DVec2::new(self.left, self.bottom),
            self.center + DVec2::new(self.right, self.top),
        )
    }

    /// 画布尺寸变化后保持中心与像素比例不变，按新旧尺寸之比伸缩半宽/半高。
    pub fn resized(
        &self,
        old_width: f64,
        old_height: f64,
        new_width: f64,
        new_height: f64,
    ) -> Result<Viewport, FitError> {
        validate_target(old_width, old_height)?;
        validate_target(new_width, new_height)?;
        let sx = new_width / old_width;
        let sy = new_height / old_height;
        Ok(Viewport {
            left: self.left * sx,
            right: self.right * sx,
            top: self.top * sy,
            bottom: self.bottom * sy,
            center: self.center,
        })
    }
}

/// 按目标画布宽高比对场景包围盒做信箱式适配：较窄的一侧被扩展，另一侧恰好贴合。
pub fn fit_viewport(bounds: &BoundingBox, width: f64, height: f64) -> Result<Viewport, FitError> {
    validate_target(width, height)?;
    let (Some(min), Some(max), Some(center)) =
        (bounds.min_2d(), bounds.max_2d(), bounds.center_2d())
    else {
        return Err(FitError::EmptyBounds);
    };

    let mut extent = max - min;
    if extent.x == 0.0 && extent.y == 0.0 {
        extent = DVec2::ONE;
    }

    let aspect = width / height;
    let extents_aspect = (extent.x / extent.y).abs();
    let (fit_width, fit_height) = if aspect > extents_aspect {
        (extent.y * aspect, extent.y)
    } else {
        (extent.x, extent.x / aspect)
    };

    Ok(Viewport {
        left: -fit_width / 2.0,
        right: fit_width / 2.0,
        top: fit_height / 2.0,
        bottom: -fit_height / 2.0,
        center,
    })
}

fn validate_target(width: f64, height: f64) -> Result<(), FitError> {
    let valid = |value: f64| value.is_finite() && value > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(FitError::InvalidTarget { width, height })
    }
}
