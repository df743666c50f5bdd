//! 顶点蒙皮属性（骨骼索引 + 权重）

use super::MAX_INFLUENCES;
use crate::config::get_config;
use crate::{EngineError, Result};

/// 每顶点 4 槽位的骨骼索引与权重
///
/// 权重和为 1（容差见 `EngineConfig::skin_weight_tolerance`），或全为 0 表示不受蒙皮影响。
/// 权重为 0 的槽位不检查索引。
#[derive(Clone, Debug, PartialEq)]
pub struct SkinData {
    joints: Vec<[i32; MAX_INFLUENCES]>,
    weights: Vec<[f32; MAX_INFLUENCES]>,
}

impl SkinData {
    /// 创建并校验蒙皮数据
    pub fn new(
        joints: Vec<[i32; MAX_INFLUENCES]>,
        weights: Vec<[f32; MAX_INFLUENCES]>,
        bone_count: usize,
    ) -> Result<Self> {
        if joints.len() != weights.len() {
            return Err(EngineError::InvalidSkin(format!(
                "joint count {} does not match weight count {}",
                joints.len(),
                weights.len()
            )));
        }

        let tolerance = get_config().skin_weight_tolerance;
        for (vertex, (slots, w)) in joints.iter().zip(weights.iter()).enumerate() {
            if w.iter().any(|x| !x.is_finite() || *x < 0.0) {
                return Err(EngineError::InvalidSkin(format!(
                    "vertex {} has invalid weight {:?}",
                    vertex, w
                )));
            }

            let sum: f32 = w.iter().sum();
            if sum != 0.0 && (sum - 1.0).abs() > tolerance {
                return Err(EngineError::InvalidSkin(format!(
                    "vertex {} weights sum to {} (expected 1.0)",
                    vertex, sum
                )));
            }

            for (joint, weight) in slots.iter().zip(w.iter()) {
                if *weight != 0.0 && (*joint < 0 || *joint as usize >= bone_count) {
                    return Err(EngineError::InvalidSkin(format!(
                        "vertex {} references bone {} (bone count {})",
                        vertex, joint, bone_count
                    )));
                }
            }
        }

        Ok(Self { joints, weights })
    }

    /// 所有顶点绑定到同一根骨骼
    pub fn rigid(vertex_count: usize, bone: i32, bone_count: usize) -> Result<Self> {
        Self::new(
            vec![[bone, 0, 0, 0]; vertex_count],
            vec![[1.0, 0.0, 0.0, 0.0]; vertex_count],
            bone_count,
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.joints.len()
    }

    /// 校验顶点数与网格一致
    pub fn check_vertex_count(&self, vertex_count: usize) -> Result<()> {
        if self.joints.len() != vertex_count {
            return Err(EngineError::InvalidSkin(format!(
                "skin covers {} vertices, mesh has {}",
                self.joints.len(),
                vertex_count
            )));
        }
        Ok(())
    }

    pub fn joints(&self) -> &[[i32; MAX_INFLUENCES]] {
        &self.joints
    }

    pub fn weights(&self) -> &[[f32; MAX_INFLUENCES]] {
        &self.weights
    }

    /// 是否有任一权重槽引用指定骨骼
    pub fn references_bone(&self, vertex: usize, bone: i32) -> bool {
        match (self.joints.get(vertex), self.weights.get(vertex)) {
            (Some(j), Some(w)) => j.iter().zip(w.iter()).any(|(b, x)| *b == bone && *x != 0.0),
            _ => false,
        }
    }

    /// GPU 用骨骼索引缓冲区（ivec4，原生字节序）
    pub fn joint_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.joints)
    }

    /// GPU 用权重缓冲区（vec4，原生字节序）
    pub fn weight_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.weights)
    }
}
