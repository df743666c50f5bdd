//! 形变桥接接口
//!
//! 调用方（渲染器 / JNI 层）只持有不透明句柄；网格实体存放在引擎持有的竞技场中，
//! 通过显式的 create / destroy 管理生命周期。句柄 id 单调递增、永不复用，
//! 销毁后的句柄只会得到 `UnknownHandle`，不会指向新网格。

mod deformable_mesh;

pub use deformable_mesh::DeformableMesh;

use glam::Quat;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::morph::MorphTarget;
use crate::skeleton::Skeleton;
use crate::{EngineError, Result};

/// 不透明网格句柄（0 保留为无效值）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(i64);

impl MeshHandle {
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

/// 形变引擎：网格竞技场
///
/// 不同句柄之间完全独立，可在不同线程并发使用；同一句柄上的调用由其互斥锁串行化。
pub struct DeformEngine {
    meshes: RwLock<HashMap<i64, Arc<Mutex<DeformableMesh>>>>,
    next_id: AtomicI64,
}

impl DeformEngine {
    pub fn new() -> Self {
        Self {
            meshes: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn register(&self, mesh: DeformableMesh) -> MeshHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let vertex_count = mesh.vertex_count();
        let bone_count = mesh.bone_count();
        self.meshes.write().insert(id, Arc::new(Mutex::new(mesh)));
        log::info!("创建网格句柄 {}: {} 个顶点, {} 根骨骼", id, vertex_count, bone_count);
        MeshHandle(id)
    }

    fn get(&self, handle: MeshHandle) -> Result<Arc<Mutex<DeformableMesh>>> {
        self.meshes
            .read()
            .get(&handle.0)
            .cloned()
            .ok_or(EngineError::UnknownHandle(handle.0))
    }

    /// 在持有该网格锁的情况下执行闭包
    pub fn with_mesh<R>(&self, handle: MeshHandle, f: impl FnOnce(&mut DeformableMesh) -> R) -> Result<R> {
        let mesh = self.get(handle)?;
        let mut guard = mesh.lock();
        Ok(f(&mut guard))
    }

    /// 创建网格（复制基础顶点）
    pub fn create_mesh(&self, base_vertices: &[f32]) -> Result<MeshHandle> {
        Ok(self.register(DeformableMesh::new(base_vertices)?))
    }

    /// 创建带骨骼的网格
    pub fn create_skinned_mesh(&self, base_vertices: &[f32], skeleton: Arc<Skeleton>) -> Result<MeshHandle> {
        Ok(self.register(DeformableMesh::with_skeleton(base_vertices, skeleton)?))
    }

    /// 注册或替换 Morph：`sparse_indices.len() == sparse_deltas.len() / 3`
    pub fn add_morph_target(
        &self,
        handle: MeshHandle,
        morph_id: i32,
        sparse_indices: &[i32],
        sparse_deltas: &[f32],
    ) -> Result<()> {
        self.with_mesh(handle, |mesh| mesh.add_morph_target(morph_id, sparse_indices, sparse_deltas))?
    }

    /// 注册带名称/权重范围的 Morph
    pub fn add_named_morph(&self, handle: MeshHandle, morph_id: i32, target: MorphTarget) -> Result<()> {
        self.with_mesh(handle, |mesh| mesh.add_morph(morph_id, target))?
    }

    /// 重新计算顶点位置到调用方分配的缓冲区（`vertex_count * 3` 个 float）
    ///
    /// 未注册的 Morph id 贡献为零；缓冲区尺寸不符时不写入任何数据。
    pub fn recompute(&self, handle: MeshHandle, morph_ids: &[i32], weights: &[f32], out: &mut [f32]) -> Result<()> {
        self.with_mesh(handle, |mesh| mesh.recompute(morph_ids, weights, out))?
    }

    /// 更新骨骼旋转，返回是否生效（越界骨骼 id 被忽略）
    pub fn update_bone(&self, handle: MeshHandle, bone_id: i32, rotation: Quat) -> Result<bool> {
        self.with_mesh(handle, |mesh| mesh.update_bone(bone_id, rotation))
    }

    /// 复制蒙皮矩阵到调用方缓冲区（`bone_count * 16` 个 float），返回骨骼数
    pub fn copy_skinning_matrices(&self, handle: MeshHandle, out: &mut [f32]) -> Result<usize> {
        self.with_mesh(handle, |mesh| {
            let src = mesh.skinning_buffer();
            if out.len() != src.len() {
                return Err(EngineError::BufferSizeMismatch {
                    expected: src.len(),
                    actual: out.len(),
                });
            }
            out.copy_from_slice(src);
            Ok(mesh.bone_count())
        })?
    }

    /// 获取顶点数量
    pub fn vertex_count(&self, handle: MeshHandle) -> Result<usize> {
        self.with_mesh(handle, |mesh| mesh.vertex_count())
    }

    /// 获取骨骼数量
    pub fn bone_count(&self, handle: MeshHandle) -> Result<usize> {
        self.with_mesh(handle, |mesh| mesh.bone_count())
    }

    /// 销毁网格，返回句柄是否存在
    pub fn destroy_mesh(&self, handle: MeshHandle) -> bool {
        let removed = self.meshes.write().remove(&handle.0).is_some();
        if removed {
            log::info!("销毁网格句柄 {}", handle.0);
        }
        removed
    }

    /// 当前存活的网格数
    pub fn mesh_count(&self) -> usize {
        self.meshes.read().len()
    }
}

impl Default for DeformEngine {
    fn default() -> Self {
        Self::new()
    }
}
