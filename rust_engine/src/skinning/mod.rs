//! 顶点蒙皮计算（CPU 路径）

mod skinning;

pub use skinning::{compute_skinning, skin_vertex};

use glam::{Mat4, Vec3};
use crate::model::SkinData;

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 顶点位置（通常是 Morph 混合后的结果）
    pub positions: &'a [Vec3],
    /// 顶点法线
    pub normals: &'a [Vec3],
    /// 顶点骨骼索引与权重
    pub skin: &'a SkinData,
    /// 骨骼蒙皮矩阵（已乘以逆绑定矩阵）
    pub bone_matrices: &'a [Mat4],
}

/// 蒙皮输出数据
pub struct SkinningOutput {
    /// 变换后的顶点位置
    pub positions: Vec<Vec3>,
    /// 变换后的顶点法线
    pub normals: Vec<Vec3>,
}

impl SkinningOutput {
    /// 平铺位置缓冲区 [x0, y0, z0, ...]
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn flat_normals(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }
}
