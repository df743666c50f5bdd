//! CharMorph 形变引擎 - 角色定制的网格形变核心
//!
//! 提供：
//! - 数学内核（四元数/矩阵组合、求逆、欧拉角转换）
//! - 骨骼层级与蒙皮矩阵计算
//! - 稀疏 Morph 混合
//! - 网格 / 蒙皮数据模型与校验
//! - 形变桥接接口（句柄竞技场）与 JNI 接口

pub mod bridge;
pub mod config;
pub mod jni_bridge;
pub mod math;
pub mod model;
pub mod morph;
pub mod skeleton;
pub mod skinning;

pub use bridge::{DeformEngine, DeformableMesh, MeshHandle};
pub use config::EngineConfig;
pub use model::{Mesh, MeshGroup, SkinData};
pub use morph::{MorphManager, MorphTarget, VertexMorphOffset};
pub use skeleton::{Bone, BoneTransform, Skeleton, SkeletonRig};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid skin data: {0}")]
    InvalidSkin(String),

    #[error("invalid skeleton: {0}")]
    InvalidSkeleton(String),

    #[error("invalid morph target: {0}")]
    InvalidMorph(String),

    #[error("degenerate matrix (determinant {0})")]
    DegenerateMatrix(f32),

    #[error("output buffer size mismatch: expected {expected} floats, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("parallel array length mismatch: {0}")]
    LengthMismatch(String),

    #[error("unknown mesh handle: {0}")]
    UnknownHandle(i64),
}

pub type Result<T> = std::result::Result<T, EngineError>;
