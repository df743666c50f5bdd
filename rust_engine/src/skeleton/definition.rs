//! 骨骼定义（不可变，可共享）

use glam::Mat4;
use std::collections::HashMap;

use super::Bone;
use crate::math::{invert, multiply};
use crate::{EngineError, Result};

/// 骨骼定义
///
/// 构造时校验拓扑顺序（父 id 小于自身 id），因此层级传播只需按 id 升序遍历一次。
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    bind_globals: Vec<Mat4>,
    inverse_binds: Vec<Mat4>,
    name_to_index: HashMap<String, usize>,
}

impl Skeleton {
    /// 校验骨骼列表并计算绑定姿态
    pub fn new(bones: Vec<Bone>) -> Result<Self> {
        for (index, bone) in bones.iter().enumerate() {
            if bone.id != index as i32 {
                return Err(EngineError::InvalidSkeleton(format!(
                    "bone '{}' has id {} at position {} (ids must be dense)",
                    bone.name, bone.id, index
                )));
            }
            if bone.parent_id < -1 || bone.parent_id >= bone.id {
                return Err(EngineError::InvalidSkeleton(format!(
                    "bone '{}' (id {}) has parent {}, bones must be topologically ordered",
                    bone.name, bone.id, bone.parent_id
                )));
            }
        }

        // 绑定姿态全局变换
        let mut bind_globals: Vec<Mat4> = Vec::with_capacity(bones.len());
        for bone in &bones {
            let local = bone.local.to_matrix();
            let global = if bone.is_root() {
                local
            } else {
                multiply(&bind_globals[bone.parent_id as usize], &local)
            };
            bind_globals.push(global);
        }

        let inverse_binds = bones
            .iter()
            .zip(bind_globals.iter())
            .map(|(bone, global)| match bone.inverse_bind_matrix {
                Some(matrix) => matrix,
                None => invert(global).unwrap_or_else(|e| {
                    log::warn!("骨骼 '{}' 绑定矩阵不可逆 ({}), 使用单位矩阵", bone.name, e);
                    Mat4::IDENTITY
                }),
            })
            .collect();

        let name_to_index = bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();

        Ok(Self {
            bones,
            bind_globals,
            inverse_binds,
            name_to_index,
        })
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// 获取骨骼
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 绑定姿态全局变换
    pub fn bind_global(&self, index: usize) -> Option<Mat4> {
        self.bind_globals.get(index).copied()
    }

    /// 逆绑定矩阵
    pub fn inverse_bind(&self, index: usize) -> Option<Mat4> {
        self.inverse_binds.get(index).copied()
    }

    pub(crate) fn inverse_binds(&self) -> &[Mat4] {
        &self.inverse_binds
    }

    /// 根骨骼 id 列表
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones.iter().filter(|b| b.is_root()).map(|b| b.id as usize)
    }
}
