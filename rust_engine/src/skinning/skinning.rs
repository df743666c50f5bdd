//! 线性混合蒙皮

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use super::{SkinningInput, SkinningOutput};
use crate::config::get_config;
use crate::model::MAX_INFLUENCES;
use crate::{EngineError, Result};

/// 计算蒙皮
///
/// 顶点数达到 `parallel_skinning_threshold` 时使用 rayon 并行，结果与串行路径一致。
pub fn compute_skinning(input: &SkinningInput) -> Result<SkinningOutput> {
    let vertex_count = input.positions.len();
    if input.normals.len() != vertex_count {
        return Err(EngineError::LengthMismatch(format!(
            "{} positions but {} normals",
            vertex_count,
            input.normals.len()
        )));
    }
    input.skin.check_vertex_count(vertex_count)?;

    let joints = input.skin.joints();
    let weights = input.skin.weights();
    let matrices = input.bone_matrices;

    let results: Vec<(Vec3, Vec3)> = if vertex_count >= get_config().parallel_skinning_threshold {
        (0..vertex_count)
            .into_par_iter()
            .map(|i| {
                skin_vertex(input.positions[i], input.normals[i], &joints[i], &weights[i], matrices)
            })
            .collect()
    } else {
        (0..vertex_count)
            .map(|i| {
                skin_vertex(input.positions[i], input.normals[i], &joints[i], &weights[i], matrices)
            })
            .collect()
    };

    let (positions, normals) = results.into_iter().unzip();
    Ok(SkinningOutput { positions, normals })
}

/// 计算单个顶点的蒙皮
///
/// 权重全为 0 的顶点不受骨骼影响，保持原位。
pub fn skin_vertex(
    position: Vec3,
    normal: Vec3,
    joints: &[i32; MAX_INFLUENCES],
    weights: &[f32; MAX_INFLUENCES],
    matrices: &[Mat4],
) -> (Vec3, Vec3) {
    if weights.iter().all(|&w| w == 0.0) {
        return (position, normal);
    }

    let mut pos = Vec3::ZERO;
    let mut norm = Vec3::ZERO;
    for (&joint, &w) in joints.iter().zip(weights.iter()) {
        if w == 0.0 {
            continue;
        }
        let m = get_matrix(matrices, joint);
        pos += m.transform_point3(position) * w;
        norm += m.transform_vector3(normal) * w;
    }

    (pos, norm.normalize_or_zero())
}

fn get_matrix(matrices: &[Mat4], index: i32) -> Mat4 {
    if index < 0 {
        return Mat4::IDENTITY;
    }
    matrices.get(index as usize).copied().unwrap_or(Mat4::IDENTITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SkinData;

    #[test]
    fn test_blend_between_two_bones() {
        let matrices = [Mat4::IDENTITY, Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0))];
        let (pos, norm) = skin_vertex(Vec3::ONE, Vec3::Y, &[0, 1, 0, 0], &[0.5, 0.5, 0.0, 0.0], &matrices);
        assert!(pos.abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-6));
        assert!(norm.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_unskinned_vertex_stays() {
        let matrices = [Mat4::from_translation(Vec3::X)];
        let (pos, _) = skin_vertex(Vec3::ONE, Vec3::Z, &[0; 4], &[0.0; 4], &matrices);
        assert_eq!(pos, Vec3::ONE);
    }

    #[test]
    fn test_compute_skinning_checks_lengths() {
        let skin = SkinData::rigid(2, 0, 1).unwrap();
        let positions = [Vec3::ZERO, Vec3::X];
        let input = SkinningInput {
            positions: &positions,
            normals: &[Vec3::Z],
            skin: &skin,
            bone_matrices: &[Mat4::IDENTITY],
        };
        assert!(compute_skinning(&input).is_err());

        let normals = [Vec3::Z, Vec3::Z];
        let moved = [Mat4::from_translation(Vec3::Y)];
        let input = SkinningInput {
            positions: &positions,
            normals: &normals,
            skin: &skin,
            bone_matrices: &moved,
        };
        let out = compute_skinning(&input).unwrap();
        assert_eq!(out.flat_positions(), &[0.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
    }
}
