//! Morph 定义

use glam::Vec3;
use std::collections::BTreeMap;

use super::VertexMorphOffset;
use crate::{EngineError, Result};

/// Morph 目标
///
/// `min_weight` / `max_weight` 只是给 UI 的提示范围，混合时引擎不会钳制权重。
#[derive(Clone, Debug, PartialEq)]
pub struct MorphTarget {
    pub name: String,
    /// 按顶点索引升序、无重复
    offsets: Vec<VertexMorphOffset>,
    pub min_weight: f32,
    pub max_weight: f32,
}

impl MorphTarget {
    /// 由 (顶点索引, 偏移) 构造；同一顶点出现多次时以最后一次为准
    pub fn new<I>(name: impl Into<String>, deltas: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vec3)>,
    {
        let unique: BTreeMap<u32, Vec3> = deltas.into_iter().collect();
        let offsets = unique
            .into_iter()
            .map(|(vertex_index, offset)| VertexMorphOffset { vertex_index, offset })
            .collect();
        Self {
            name: name.into(),
            offsets,
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }

    /// 由平行数组构造：`deltas.len() == indices.len() * 3`
    pub fn from_sparse(name: impl Into<String>, indices: &[i32], deltas: &[f32]) -> Result<Self> {
        if deltas.len() != indices.len() * 3 {
            return Err(EngineError::LengthMismatch(format!(
                "{} sparse indices need {} delta floats, got {}",
                indices.len(),
                indices.len() * 3,
                deltas.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i < 0) {
            return Err(EngineError::InvalidMorph(format!("negative vertex index {}", bad)));
        }

        let pairs = indices
            .iter()
            .zip(deltas.chunks_exact(3))
            .map(|(&i, d)| (i as u32, Vec3::new(d[0], d[1], d[2])));
        Ok(Self::new(name, pairs))
    }

    /// 设置权重范围（部分 Morph 使用 0..2）
    pub fn with_range(mut self, min_weight: f32, max_weight: f32) -> Result<Self> {
        if !(min_weight <= max_weight) {
            return Err(EngineError::InvalidMorph(format!(
                "'{}': min weight {} exceeds max weight {}",
                self.name, min_weight, max_weight
            )));
        }
        self.min_weight = min_weight;
        self.max_weight = max_weight;
        Ok(self)
    }

    /// 获取名称
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// 把 UI 权重钳制到声明范围（供 UI 层使用，引擎内部不调用）
    pub fn clamp_weight(&self, weight: f32) -> f32 {
        weight.clamp(self.min_weight, self.max_weight)
    }

    pub fn offsets(&self) -> &[VertexMorphOffset] {
        &self.offsets
    }

    /// 被影响的顶点数
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// 查询单个顶点的偏移，未记录的顶点为零向量
    pub fn delta(&self, vertex_index: u32) -> Vec3 {
        self.offsets
            .binary_search_by_key(&vertex_index, |o| o.vertex_index)
            .map(|i| self.offsets[i].offset)
            .unwrap_or(Vec3::ZERO)
    }

    /// 最大顶点索引
    pub fn max_vertex_index(&self) -> Option<u32> {
        self.offsets.last().map(|o| o.vertex_index)
    }

    /// 校验所有索引都落在网格内
    pub fn validate(&self, vertex_count: usize) -> Result<()> {
        match self.max_vertex_index() {
            Some(max) if max as usize >= vertex_count => Err(EngineError::InvalidMorph(format!(
                "'{}': vertex index {} out of range (vertex count {})",
                self.name, max, vertex_count
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for MorphTarget {
    fn default() -> Self {
        Self::new(String::new(), std::iter::empty())
    }
}
