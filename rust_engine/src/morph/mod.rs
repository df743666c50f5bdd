//! Morph 变形系统
//!
//! 稀疏存储：每个 Morph 只保存被影响的顶点偏移。

mod manager;
mod morph;

pub use manager::MorphManager;
pub use morph::MorphTarget;

use glam::Vec3;

/// 顶点 Morph 偏移
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexMorphOffset {
    pub vertex_index: u32,
    pub offset: Vec3,
}
