//! 可形变网格（句柄背后的实体）

use glam::Quat;
use std::sync::Arc;

use crate::morph::{MorphManager, MorphTarget};
use crate::skeleton::{Skeleton, SkeletonRig};
use crate::{EngineError, Result};

/// 可形变网格
///
/// 持有基础顶点位置的副本、按整数 id 累积的 Morph 注册表，以及可选的骨骼实例。
pub struct DeformableMesh {
    base_positions: Vec<f32>,
    morphs: MorphManager,
    rig: Option<SkeletonRig>,
}

impl DeformableMesh {
    /// 复制基础顶点 [x0, y0, z0, x1, ...]
    pub fn new(base_vertices: &[f32]) -> Result<Self> {
        if base_vertices.len() % 3 != 0 {
            return Err(EngineError::InvalidMesh(format!(
                "base vertex buffer length {} is not a multiple of 3",
                base_vertices.len()
            )));
        }
        let vertex_count = base_vertices.len() / 3;
        Ok(Self {
            base_positions: base_vertices.to_vec(),
            morphs: MorphManager::new(vertex_count),
            rig: None,
        })
    }

    /// 带骨骼的网格，骨骼实例处于绑定姿态
    pub fn with_skeleton(base_vertices: &[f32], skeleton: Arc<Skeleton>) -> Result<Self> {
        let mut mesh = Self::new(base_vertices)?;
        mesh.rig = Some(SkeletonRig::new(skeleton));
        Ok(mesh)
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.base_positions.len() / 3
    }

    pub fn base_positions(&self) -> &[f32] {
        &self.base_positions
    }

    pub fn morphs(&self) -> &MorphManager {
        &self.morphs
    }

    /// 注册或替换 Morph（平行数组形式）
    pub fn add_morph_target(&mut self, morph_id: i32, indices: &[i32], deltas: &[f32]) -> Result<()> {
        let target = MorphTarget::from_sparse(String::new(), indices, deltas)?;
        self.morphs.add_morph(morph_id, target)?;
        Ok(())
    }

    /// 注册或替换带名称/权重范围的 Morph
    pub fn add_morph(&mut self, morph_id: i32, target: MorphTarget) -> Result<()> {
        self.morphs.add_morph(morph_id, target)?;
        Ok(())
    }

    /// 重新计算顶点位置，写入 `vertex_count * 3` 个 float
    ///
    /// 参数错误时在写入前返回，`out` 保持原样。
    pub fn recompute(&self, morph_ids: &[i32], weights: &[f32], out: &mut [f32]) -> Result<()> {
        if morph_ids.len() != weights.len() {
            return Err(EngineError::LengthMismatch(format!(
                "{} morph ids but {} weights",
                morph_ids.len(),
                weights.len()
            )));
        }
        let active: Vec<(i32, f32)> = morph_ids.iter().copied().zip(weights.iter().copied()).collect();
        self.morphs.blend(&self.base_positions, &active, out)
    }

    pub fn rig(&self) -> Option<&SkeletonRig> {
        self.rig.as_ref()
    }

    pub fn rig_mut(&mut self) -> Option<&mut SkeletonRig> {
        self.rig.as_mut()
    }

    /// 更新骨骼旋转；无骨骼或 id 越界时忽略
    pub fn update_bone(&mut self, bone_id: i32, rotation: Quat) -> bool {
        match self.rig.as_mut() {
            Some(rig) => rig.update_bone(bone_id, rotation),
            None => false,
        }
    }

    /// 获取骨骼数量（无骨骼为 0）
    pub fn bone_count(&self) -> usize {
        self.rig.as_ref().map(|r| r.bone_count()).unwrap_or(0)
    }

    /// 平铺蒙皮矩阵（无骨骼时为空）
    pub fn skinning_buffer(&self) -> &[f32] {
        self.rig.as_ref().map(|r| r.skinning_buffer()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_ragged_base() {
        assert!(matches!(
            DeformableMesh::new(&[0.0; 7]),
            Err(EngineError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_recompute_parallel_arrays() {
        let mut mesh = DeformableMesh::new(&[0.0; 6]).unwrap();
        mesh.add_morph_target(3, &[1], &[0.0, 1.0, 0.0]).unwrap();

        let mut out = vec![9.0; 6];
        let err = mesh.recompute(&[3, 4], &[1.0], &mut out).unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch(_)));
        assert_eq!(out, vec![9.0; 6]);

        mesh.recompute(&[3], &[0.25], &mut out).unwrap();
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 0.25, 0.0]);
    }

    #[test]
    fn test_morph_index_out_of_range() {
        let mut mesh = DeformableMesh::new(&[0.0; 6]).unwrap();
        assert!(mesh.add_morph_target(0, &[2], &[1.0, 0.0, 0.0]).is_err());
        assert_eq!(mesh.morphs().morph_count(), 0);
    }

    #[test]
    fn test_unskinned_mesh_ignores_bones() {
        let mut mesh = DeformableMesh::new(&[0.0; 3]).unwrap();
        assert!(!mesh.update_bone(0, Quat::IDENTITY));
        assert_eq!(mesh.bone_count(), 0);
        assert!(mesh.skinning_buffer().is_empty());
    }
}
