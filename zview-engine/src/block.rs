use glam::{DVec2, DVec3};
use tracing::trace;
use zview_core::drawing::{Block, Insert};
use zview_core::geometry::Transform;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dispatch::{DispatchContext, dispatch};
use crate::primitive::{GroupPrimitive, Primitive};

/// 展开块参照：查找块定义，构造组变换，并递归分发块内实体作为组的子图元。
///
/// 块缺失或为空时记录诊断并返回 `None`；嵌套 INSERT 的变换在父组的局部坐标系中叠加。
pub fn instantiate(
    insert: &Insert,
    ctx: &DispatchContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<Primitive> {
    let Some(block) = ctx
        .drawing
        .block(&insert.name)
        .filter(|block| !block.entities.is_empty())
    else {
        diagnostics.report(Diagnostic::MissingBlock {
            name: insert.name.clone(),
            referrer: "insert",
        });
        return None;
    };

    let Some(nested) = ctx.descend() else {
        diagnostics.report(Diagnostic::BlockDepthExceeded {
            name: insert.name.clone(),
            limit: ctx.settings.max_block_depth,
        });
        return None;
    };

    let transform = insert_transform(insert, block);
    let mut children = Vec::with_capacity(block.entities.len());
    for entity in &block.entities {
        dispatch(entity, &nested, &mut children, diagnostics);
    }
    trace!(
        block = %insert.name,
        depth = nested.depth(),
        children = children.len(),
        "块参照已展开"
    );

    Some(Primitive::Group(GroupPrimitive {
        transform,
        children,
    }))
}

/// 缺省缩放为 1、旋转为 0（角度制转弧度）、插入点为原点。
pub fn insert_transform(insert: &Insert, block: &Block) -> Transform {
    Transform {
        scale: DVec2::new(insert.x_scale.unwrap_or(1.0), insert.y_scale.unwrap_or(1.0)),
        rotation: insert.rotation.unwrap_or(0.0).to_radians(),
        translation: insert.position.unwrap_or(DVec3::ZERO),
        base_point: block.base_point,
    }
}
