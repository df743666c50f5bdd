//! JNI 绑定层 - 与 Kotlin `NativeLib` 交互

mod native_func;

pub use native_func::*;

use once_cell::sync::Lazy;

use crate::bridge::DeformEngine;
use crate::{EngineError, Result};

/// 全局形变引擎（JNI 句柄即引擎内的网格 id）
pub static ENGINE: Lazy<DeformEngine> = Lazy::new(DeformEngine::new);

/// 每根骨骼在平铺数组中的 float 数：位置 3 + 旋转 4 + 缩放 3
pub const BONE_STRIDE: usize = 10;

/// 把直接缓冲区的字节视作 `expected_floats` 个 f32 交给 `f` 写入
///
/// 字节数必须正好是 `expected_floats * 4`，否则在调用 `f` 前返回 `BufferSizeMismatch`。
/// 对齐时原地写入；未对齐时先写入临时缓冲区再按字节复制（原生字节序）。
/// `f` 失败时不会修改 `bytes`。
pub fn with_float_view<R>(
    bytes: &mut [u8],
    expected_floats: usize,
    f: impl FnOnce(&mut [f32]) -> Result<R>,
) -> Result<R> {
    if bytes.len() != expected_floats * 4 {
        return Err(EngineError::BufferSizeMismatch {
            expected: expected_floats,
            actual: bytes.len().div_ceil(4),
        });
    }
    match bytemuck::try_cast_slice_mut::<u8, f32>(bytes) {
        Ok(floats) => f(floats),
        Err(_) => {
            let mut scratch = vec![0.0f32; expected_floats];
            let result = f(&mut scratch)?;
            bytes.copy_from_slice(bytemuck::cast_slice(&scratch));
            Ok(result)
        }
    }
}

/// 解析 JNI 传入的平铺骨骼数据
pub fn parse_bones(parent_ids: &[i32], transforms: &[f32]) -> Result<Vec<crate::skeleton::Bone>> {
    use crate::skeleton::{Bone, BoneTransform};
    use glam::{Quat, Vec3};

    if transforms.len() != parent_ids.len() * BONE_STRIDE {
        return Err(EngineError::LengthMismatch(format!(
            "{} bones need {} transform floats, got {}",
            parent_ids.len(),
            parent_ids.len() * BONE_STRIDE,
            transforms.len()
        )));
    }

    Ok(parent_ids
        .iter()
        .zip(transforms.chunks_exact(BONE_STRIDE))
        .enumerate()
        .map(|(i, (&parent, t))| {
            let mut bone = Bone::new(i as i32, format!("bone_{}", i), parent);
            bone.local = BoneTransform::new(
                Vec3::new(t[0], t[1], t[2]),
                Quat::from_xyzw(t[3], t[4], t[5], t[6]),
                Vec3::new(t[7], t[8], t[9]),
            );
            bone
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_view_aligned_and_unaligned() {
        let mut storage = vec![0u32; 4];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut storage);

        // 对齐
        with_float_view(&mut bytes[..12], 3, |f| {
            f.copy_from_slice(&[1.0, 2.0, 3.0]);
            Ok(())
        })
        .unwrap();
        assert_eq!(bytemuck::cast_slice::<u8, f32>(&bytes[..12]), &[1.0, 2.0, 3.0]);

        // 未对齐
        with_float_view(&mut bytes[1..13], 3, |f| {
            assert_eq!(f.len(), 3);
            f.copy_from_slice(&[4.0, 5.0, 6.0]);
            Ok(())
        })
        .unwrap();
        let mut copy = [0u8; 12];
        copy.copy_from_slice(&bytes[1..13]);
        assert_eq!(bytemuck::cast_slice::<u8, f32>(&copy), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_float_view_failure_leaves_bytes() {
        let mut storage = vec![0xffu8; 13];
        let err = with_float_view(&mut storage[1..], 3, |_| -> Result<()> {
            Err(EngineError::BufferSizeMismatch { expected: 6, actual: 3 })
        });
        assert!(err.is_err());
        assert!(storage.iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_float_view_rejects_partial_float() {
        let engine = DeformEngine::new();
        let handle = engine.create_mesh(&[0.0; 6]).unwrap();
        let expected = engine.vertex_count(handle).unwrap() * 3;

        let mut storage = vec![0u32; 8];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut storage);
        bytes.fill(0xab);

        // 2 个顶点需要 24 字节，26 字节（对齐与未对齐）都应拒绝
        for range in [0..26, 1..27] {
            let err = with_float_view(&mut bytes[range], expected, |out| {
                engine.recompute(handle, &[], &[], out)
            })
            .unwrap_err();
            assert_eq!(err, EngineError::BufferSizeMismatch { expected: 6, actual: 7 });
        }
        assert!(bytes.iter().all(|&b| b == 0xab));

        with_float_view(&mut bytes[..24], expected, |out| engine.recompute(handle, &[], &[], out)).unwrap();
        assert!(bytes[..24].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_bones() {
        let transforms = [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, //
            0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0,
        ];
        let bones = parse_bones(&[-1, 0], &transforms).unwrap();
        assert_eq!(bones.len(), 2);
        assert_eq!(bones[1].parent_id, 0);
        assert_eq!(bones[1].local.translation.y, 2.0);
        assert!(parse_bones(&[-1], &transforms).is_err());
    }
}
