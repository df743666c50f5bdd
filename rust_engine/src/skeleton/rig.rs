//! 骨骼实例：每个角色独立的姿态状态

use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

use super::{BoneTransform, Skeleton};
use crate::config::get_config;
use crate::math::{flatten_matrices, multiply};

/// 骨骼实例
///
/// 初始为绑定姿态；每次姿态修改后按 id 升序做一次完整的层级传播：
/// `global = parent_global * local`，`skinning = global * inverse_bind`，
/// 并把 16 个 float 写入平铺缓冲区的 `bone_id * 16` 处。
pub struct SkeletonRig {
    skeleton: Arc<Skeleton>,
    locals: Vec<BoneTransform>,
    global_matrices: Vec<Mat4>,
    skinning_matrices: Vec<Mat4>,
    skinning_buffer: Vec<f32>,
}

impl SkeletonRig {
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let bone_count = skeleton.bone_count();
        let locals = skeleton.bones().iter().map(|b| b.local).collect();
        let mut rig = Self {
            skeleton,
            locals,
            global_matrices: vec![Mat4::IDENTITY; bone_count],
            skinning_matrices: vec![Mat4::IDENTITY; bone_count],
            skinning_buffer: vec![0.0; bone_count * 16],
        };
        rig.update_transforms();
        rig
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.locals.len()
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.skeleton.find_bone_by_name(name)
    }

    fn bone_index(&self, bone_id: i32) -> Option<usize> {
        if bone_id >= 0 && (bone_id as usize) < self.locals.len() {
            Some(bone_id as usize)
        } else {
            log::debug!("忽略越界骨骼 id {} (骨骼数 {})", bone_id, self.locals.len());
            None
        }
    }

    /// 替换骨骼局部旋转并重新计算所有矩阵
    ///
    /// 越界 id 直接忽略（骨骼切换后 UI 可能仍发送旧 id），返回是否生效。
    pub fn update_bone(&mut self, bone_id: i32, rotation: Quat) -> bool {
        match self.bone_index(bone_id) {
            Some(index) => {
                if get_config().debug_log {
                    log::debug!("骨骼 {} 旋转 -> {:?}", bone_id, rotation);
                }
                self.locals[index].rotation = rotation;
                self.update_transforms();
                true
            }
            None => false,
        }
    }

    /// 设置骨骼局部平移
    pub fn set_bone_translation(&mut self, bone_id: i32, translation: Vec3) -> bool {
        match self.bone_index(bone_id) {
            Some(index) => {
                self.locals[index].translation = translation;
                self.update_transforms();
                true
            }
            None => false,
        }
    }

    /// 设置骨骼局部缩放
    pub fn set_bone_scale(&mut self, bone_id: i32, scale: Vec3) -> bool {
        match self.bone_index(bone_id) {
            Some(index) => {
                self.locals[index].scale = scale;
                self.update_transforms();
                true
            }
            None => false,
        }
    }

    /// 整体替换骨骼局部变换
    pub fn set_bone_transform(&mut self, bone_id: i32, transform: BoneTransform) -> bool {
        match self.bone_index(bone_id) {
            Some(index) => {
                self.locals[index] = transform;
                self.update_transforms();
                true
            }
            None => false,
        }
    }

    /// 回到绑定姿态
    pub fn reset_pose(&mut self) {
        for (local, bone) in self.locals.iter_mut().zip(self.skeleton.bones()) {
            *local = bone.local;
        }
        self.update_transforms();
    }

    /// 完整层级传播（拓扑顺序保证父骨骼先于子骨骼）
    fn update_transforms(&mut self) {
        let inverse_binds = self.skeleton.inverse_binds();
        for (index, bone) in self.skeleton.bones().iter().enumerate() {
            let local = self.locals[index].to_matrix();
            let global = if bone.is_root() {
                local
            } else {
                multiply(&self.global_matrices[bone.parent_id as usize], &local)
            };
            self.global_matrices[index] = global;
            self.skinning_matrices[index] = multiply(&global, &inverse_binds[index]);
        }
        flatten_matrices(&self.skinning_matrices, &mut self.skinning_buffer);
    }

    /// 获取局部变换
    pub fn local_transform(&self, index: usize) -> Option<&BoneTransform> {
        self.locals.get(index)
    }

    /// 获取全局变换
    pub fn global_transform(&self, index: usize) -> Mat4 {
        self.global_matrices.get(index).copied().unwrap_or(Mat4::IDENTITY)
    }

    /// 获取蒙皮矩阵数组
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    /// 平铺蒙皮矩阵缓冲区（骨骼数 × 16，列主序）
    pub fn skinning_buffer(&self) -> &[f32] {
        &self.skinning_buffer
    }
}
