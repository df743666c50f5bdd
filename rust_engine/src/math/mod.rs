//! 数学内核
//!
//! 所有矩阵均为列主序（与 glam / OpenGL 一致），四元数分量顺序为 x, y, z, w。

mod matrix;
mod rotation;

pub use matrix::{compose_matrix, flatten_matrices, invert, multiply};
pub use rotation::{euler_to_quaternion, matrix_to_quaternion, quaternion_to_matrix};
