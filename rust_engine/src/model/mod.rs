//! 网格与蒙皮数据模型
//!
//! 纯数据记录，构造时校验不变量，之后不再变更（分组可见性除外）。

mod group;
mod mesh;
mod skin;

pub use group::MeshGroup;
pub use mesh::Mesh;
pub use skin::SkinData;

/// 每个顶点最多受影响的骨骼数
pub const MAX_INFLUENCES: usize = 4;
