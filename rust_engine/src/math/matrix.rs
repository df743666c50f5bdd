//! 4x4 仿射矩阵运算

use glam::{Mat4, Quat, Vec3, Vec4};

use super::quaternion_to_matrix;
use crate::config::get_config;
use crate::{EngineError, Result};

/// 组合变换矩阵 = 平移 * 旋转 * 缩放
pub fn compose_matrix(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    let r = quaternion_to_matrix(rotation);
    Mat4::from_cols(
        r.x_axis * scale.x,
        r.y_axis * scale.y,
        r.z_axis * scale.z,
        Vec4::new(position.x, position.y, position.z, 1.0),
    )
}

/// 矩阵乘法 a * b
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    a.mul_mat4(b)
}

/// 通用 4x4 求逆
///
/// 行列式接近 0（或非有限值）时返回 `DegenerateMatrix`，不会输出 NaN。
pub fn invert(m: &Mat4) -> Result<Mat4> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() <= get_config().degenerate_epsilon {
        return Err(EngineError::DegenerateMatrix(det));
    }
    Ok(m.inverse())
}

/// 将矩阵数组按列主序平铺到 f32 缓冲区（每个矩阵 16 个 float）
///
/// 返回写入的矩阵数；缓冲区不足时只写入能容纳的完整矩阵。
pub fn flatten_matrices(matrices: &[Mat4], out: &mut [f32]) -> usize {
    let mut written = 0;
    for (matrix, chunk) in matrices.iter().zip(out.chunks_exact_mut(16)) {
        matrix.write_cols_to_slice(chunk);
        written += 1;
    }
    written
}
