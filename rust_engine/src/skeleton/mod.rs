//! 骨骼定义与骨骼实例（姿态状态）
//!
//! `Skeleton` 是不可变定义，可被多个 `SkeletonRig` 共享；每个角色的姿态只保存在 rig 中。

mod bone;
mod definition;
mod rig;

pub use bone::Bone;
pub use definition::Skeleton;
pub use rig::SkeletonRig;

use glam::{Mat4, Quat, Vec3};

use crate::math::compose_matrix;

/// 骨骼局部变换
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BoneTransform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn to_matrix(&self) -> Mat4 {
        compose_matrix(self.translation, self.rotation, self.scale)
    }
}
