//! JNI 原生函数实现
//!
//! 对应 Kotlin 端 `com.charmorph.nativebridge.NativeLib` 的 external 方法。
//! 句柄以 jlong 传递，0 表示失败；错误只记录日志，不向 Java 抛异常。

use glam::Quat;
use jni::objects::{JByteBuffer, JFloatArray, JIntArray, JObject};
use jni::sys::{jboolean, jfloat, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::ptr;
use std::sync::Arc;

use super::{parse_bones, with_float_view, ENGINE};
use crate::bridge::MeshHandle;
use crate::skeleton::Skeleton;

const VERSION: &str = "CharMorph-Rust-20261019";

// ============================================================================
// 数组 / 缓冲区辅助
// ============================================================================

fn read_float_array(env: &mut JNIEnv, array: &JFloatArray) -> Option<Vec<f32>> {
    let len = env.get_array_length(array).ok()? as usize;
    let mut buf = vec![0.0f32; len];
    env.get_float_array_region(array, 0, &mut buf).ok()?;
    Some(buf)
}

fn read_int_array(env: &mut JNIEnv, array: &JIntArray) -> Option<Vec<i32>> {
    let len = env.get_array_length(array).ok()? as usize;
    let mut buf = vec![0i32; len];
    env.get_int_array_region(array, 0, &mut buf).ok()?;
    Some(buf)
}

fn direct_buffer<'b>(env: &JNIEnv, buffer: &'b JByteBuffer) -> Option<&'b mut [u8]> {
    let dst = env.get_direct_buffer_address(buffer).ok()?;
    let capacity = env.get_direct_buffer_capacity(buffer).ok()?;
    if dst.is_null() {
        return None;
    }
    // 直接缓冲区由 Java 端持有，调用期间有效
    Some(unsafe { std::slice::from_raw_parts_mut(dst, capacity) })
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

// ============================================================================
// 基础函数
// ============================================================================

/// 获取版本号
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_stringFromJNI(
    env: JNIEnv,
    _this: JObject,
) -> jstring {
    match env.new_string(VERSION) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// 网格句柄
// ============================================================================

/// 创建网格，返回句柄（失败返回 0）
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_createMesh(
    mut env: JNIEnv,
    _this: JObject,
    base_vertices: JFloatArray,
) -> jlong {
    let Some(base) = read_float_array(&mut env, &base_vertices) else {
        log::error!("createMesh: 无法读取顶点数组");
        return 0;
    };
    match ENGINE.create_mesh(&base) {
        Ok(handle) => handle.raw(),
        Err(e) => {
            log::error!("createMesh 失败: {}", e);
            0
        }
    }
}

/// 创建带骨骼的网格
///
/// `transforms` 每根骨骼 10 个 float：位置 xyz、旋转 xyzw、缩放 xyz。
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_createSkinnedMesh(
    mut env: JNIEnv,
    _this: JObject,
    base_vertices: JFloatArray,
    parent_ids: JIntArray,
    transforms: JFloatArray,
) -> jlong {
    let (Some(base), Some(parents), Some(locals)) = (
        read_float_array(&mut env, &base_vertices),
        read_int_array(&mut env, &parent_ids),
        read_float_array(&mut env, &transforms),
    ) else {
        log::error!("createSkinnedMesh: 无法读取参数数组");
        return 0;
    };

    let result = parse_bones(&parents, &locals)
        .and_then(Skeleton::new)
        .and_then(|skeleton| ENGINE.create_skinned_mesh(&base, Arc::new(skeleton)));
    match result {
        Ok(handle) => handle.raw(),
        Err(e) => {
            log::error!("createSkinnedMesh 失败: {}", e);
            0
        }
    }
}

/// 销毁网格
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_destroyMesh(
    _env: JNIEnv,
    _this: JObject,
    handle: jlong,
) {
    if !ENGINE.destroy_mesh(MeshHandle::from_raw(handle)) {
        log::warn!("destroyMesh: 未知句柄 {}", handle);
    }
}

/// 获取顶点数量
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_getVertexCount(
    _env: JNIEnv,
    _this: JObject,
    handle: jlong,
) -> jint {
    ENGINE
        .vertex_count(MeshHandle::from_raw(handle))
        .map(|n| n as jint)
        .unwrap_or(0)
}

// ============================================================================
// Morph
// ============================================================================

/// 注册或替换 Morph
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_addMorphTarget(
    mut env: JNIEnv,
    _this: JObject,
    handle: jlong,
    morph_id: jint,
    sparse_indices: JIntArray,
    sparse_deltas: JFloatArray,
) -> jboolean {
    let (Some(indices), Some(deltas)) = (
        read_int_array(&mut env, &sparse_indices),
        read_float_array(&mut env, &sparse_deltas),
    ) else {
        log::error!("addMorphTarget: 无法读取参数数组");
        return JNI_FALSE;
    };

    match ENGINE.add_morph_target(MeshHandle::from_raw(handle), morph_id, &indices, &deltas) {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            log::error!("addMorphTarget({}) 失败: {}", morph_id, e);
            JNI_FALSE
        }
    }
}

/// 按权重重新计算顶点位置，写入直接 ByteBuffer（顶点数 * 3 * 4 字节，原生字节序）
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_updateMorphs(
    mut env: JNIEnv,
    _this: JObject,
    handle: jlong,
    morph_ids: JIntArray,
    weights: JFloatArray,
    output: JByteBuffer,
) -> jboolean {
    let (Some(ids), Some(values)) = (
        read_int_array(&mut env, &morph_ids),
        read_float_array(&mut env, &weights),
    ) else {
        log::error!("updateMorphs: 无法读取参数数组");
        return JNI_FALSE;
    };
    let Some(bytes) = direct_buffer(&env, &output) else {
        log::error!("updateMorphs: 输出必须是直接缓冲区");
        return JNI_FALSE;
    };

    let mesh = MeshHandle::from_raw(handle);
    let result = ENGINE.vertex_count(mesh).and_then(|vertex_count| {
        with_float_view(bytes, vertex_count * 3, |out| ENGINE.recompute(mesh, &ids, &values, out))
    });
    match result {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            log::warn!("updateMorphs 失败: {}", e);
            JNI_FALSE
        }
    }
}

// ============================================================================
// 骨骼
// ============================================================================

/// 更新骨骼旋转（四元数 x, y, z, w），越界骨骼 id 忽略
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_updateBone(
    _env: JNIEnv,
    _this: JObject,
    handle: jlong,
    bone_id: jint,
    x: jfloat,
    y: jfloat,
    z: jfloat,
    w: jfloat,
) -> jboolean {
    match ENGINE.update_bone(MeshHandle::from_raw(handle), bone_id, Quat::from_xyzw(x, y, z, w)) {
        Ok(applied) => to_jboolean(applied),
        Err(e) => {
            log::warn!("updateBone 失败: {}", e);
            JNI_FALSE
        }
    }
}

/// 获取骨骼数量
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_getBoneCount(
    _env: JNIEnv,
    _this: JObject,
    handle: jlong,
) -> jint {
    ENGINE
        .bone_count(MeshHandle::from_raw(handle))
        .map(|n| n as jint)
        .unwrap_or(0)
}

/// 复制蒙皮矩阵到直接 ByteBuffer（骨骼数 * 64 字节），返回骨骼数，失败返回 0
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_copySkinningMatrices(
    env: JNIEnv,
    _this: JObject,
    handle: jlong,
    output: JByteBuffer,
) -> jint {
    let Some(bytes) = direct_buffer(&env, &output) else {
        log::error!("copySkinningMatrices: 输出必须是直接缓冲区");
        return 0;
    };
    let mesh = MeshHandle::from_raw(handle);
    let result = ENGINE.bone_count(mesh).and_then(|bone_count| {
        with_float_view(bytes, bone_count * 16, |out| ENGINE.copy_skinning_matrices(mesh, out))
    });
    match result {
        Ok(count) => count as jint,
        Err(e) => {
            log::warn!("蒙皮矩阵复制失败: {}", e);
            0
        }
    }
}
