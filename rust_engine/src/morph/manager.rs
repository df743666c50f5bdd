//! Morph 管理器

use std::collections::{BTreeMap, HashMap};

use super::MorphTarget;
use crate::{EngineError, Result};

/// Morph 管理器
///
/// 以整数 id 为键；混合时总是按 id 升序累加，结果与传入顺序无关、逐位可复现。
pub struct MorphManager {
    vertex_count: usize,
    morphs: BTreeMap<i32, MorphTarget>,
    name_to_id: HashMap<String, i32>,
}

impl MorphManager {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            morphs: BTreeMap::new(),
            name_to_id: HashMap::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// 注册或替换 Morph，返回被替换的旧 Morph
    pub fn add_morph(&mut self, id: i32, morph: MorphTarget) -> Result<Option<MorphTarget>> {
        morph.validate(self.vertex_count)?;

        let previous = self.morphs.insert(id, morph);
        if let Some(old) = &previous {
            if self.name_to_id.get(&old.name) == Some(&id) {
                self.name_to_id.remove(&old.name);
            }
        }
        if let Some(name) = self.morphs.get(&id).map(|m| m.name.clone()) {
            if !name.is_empty() {
                self.name_to_id.insert(name, id);
            }
        }
        Ok(previous)
    }

    /// 移除 Morph
    pub fn remove_morph(&mut self, id: i32) -> Option<MorphTarget> {
        let removed = self.morphs.remove(&id)?;
        if self.name_to_id.get(&removed.name) == Some(&id) {
            self.name_to_id.remove(&removed.name);
        }
        Some(removed)
    }

    /// 通过名称查找 Morph id
    pub fn find_morph_by_name(&self, name: &str) -> Option<i32> {
        self.name_to_id.get(name).copied()
    }

    /// 获取 Morph 数量
    pub fn morph_count(&self) -> usize {
        self.morphs.len()
    }

    /// 获取 Morph
    pub fn get_morph(&self, id: i32) -> Option<&MorphTarget> {
        self.morphs.get(&id)
    }

    /// 已注册的 id（升序）
    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.morphs.keys().copied()
    }

    /// 在 `positions`（已含基础位置，平铺 xyz）上叠加激活的 Morph
    ///
    /// - 权重不钳制：超出 [min, max] 时线性外推
    /// - 未注册的 id 贡献为零
    /// - 重复 id 线性累加
    pub fn apply_weights(&self, active: &[(i32, f32)], positions: &mut [f32]) -> Result<()> {
        let expected = self.vertex_count * 3;
        if positions.len() != expected {
            return Err(EngineError::BufferSizeMismatch {
                expected,
                actual: positions.len(),
            });
        }

        let mut ordered = active.to_vec();
        ordered.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        for (id, weight) in ordered {
            if weight == 0.0 {
                continue;
            }
            let Some(morph) = self.morphs.get(&id) else {
                log::debug!("忽略未注册的 Morph id {}", id);
                continue;
            };
            for offset in morph.offsets() {
                let base = offset.vertex_index as usize * 3;
                positions[base] += weight * offset.offset.x;
                positions[base + 1] += weight * offset.offset.y;
                positions[base + 2] += weight * offset.offset.z;
            }
        }
        Ok(())
    }

    /// 基础位置 + 激活 Morph → 输出缓冲区
    ///
    /// 尺寸不匹配时在写入前返回错误，输出缓冲区保持不变。
    pub fn blend(&self, base: &[f32], active: &[(i32, f32)], out: &mut [f32]) -> Result<()> {
        let expected = self.vertex_count * 3;
        if base.len() != expected {
            return Err(EngineError::BufferSizeMismatch {
                expected,
                actual: base.len(),
            });
        }
        if out.len() != expected {
            return Err(EngineError::BufferSizeMismatch {
                expected,
                actual: out.len(),
            });
        }
        out.copy_from_slice(base);
        self.apply_weights(active, out)
    }
}
