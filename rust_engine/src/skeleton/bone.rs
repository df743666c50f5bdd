//! 骨骼节点

use glam::{Mat4, Quat, Vec3};

use super::BoneTransform;

/// 骨骼节点（绑定姿态定义）
#[derive(Clone, Debug)]
pub struct Bone {
    /// 稠密 id，必须等于在骨骼列表中的下标
    pub id: i32,
    pub name: String,
    /// 父骨骼 id，根骨骼为 -1
    pub parent_id: i32,
    /// 绑定姿态下的局部变换
    pub local: BoneTransform,
    /// 逆绑定矩阵；为 None 时在 `Skeleton::new` 中由绑定姿态全局变换求逆得到
    pub inverse_bind_matrix: Option<Mat4>,
}

impl Bone {
    pub fn new(id: i32, name: impl Into<String>, parent_id: i32) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            local: BoneTransform::default(),
            inverse_bind_matrix: None,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.local.translation = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.local.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.local.scale = scale;
        self
    }

    pub fn with_inverse_bind(mut self, matrix: Mat4) -> Self {
        self.inverse_bind_matrix = Some(matrix);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id < 0
    }
}
