//! 网格定义

use glam::{Vec2, Vec3};

use super::MeshGroup;
use crate::{EngineError, Result};

/// 基础网格（导入层产出）
#[derive(Clone, Debug)]
pub struct Mesh {
    pub id: String,
    pub name: String,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    groups: Vec<MeshGroup>,
}

impl Mesh {
    /// 创建网格并校验不变量
    ///
    /// - 法线、UV 数量必须与顶点数一致
    /// - 三角形索引数量必须是 3 的倍数
    /// - 所有索引必须小于顶点数
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        let vertex_count = positions.len();
        if normals.len() != vertex_count {
            return Err(EngineError::InvalidMesh(format!(
                "normal count {} does not match vertex count {}",
                normals.len(),
                vertex_count
            )));
        }
        if uvs.len() != vertex_count {
            return Err(EngineError::InvalidMesh(format!(
                "uv count {} does not match vertex count {}",
                uvs.len(),
                vertex_count
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(EngineError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        check_indices("mesh", &indices, vertex_count)?;

        Ok(Self {
            id: id.into(),
            name: name.into(),
            positions,
            normals,
            uvs,
            indices,
            groups: Vec::new(),
        })
    }

    /// 添加分组
    ///
    /// 分组索引必须小于顶点数，且必须是网格索引序列中的一段连续子区间。
    pub fn add_group(&mut self, group: MeshGroup) -> Result<()> {
        check_indices(&group.name, &group.indices, self.positions.len())?;
        let is_sub_range = group.indices.is_empty()
            || self
                .indices
                .windows(group.indices.len())
                .any(|w| w == group.indices.as_slice());
        if !is_sub_range {
            return Err(EngineError::InvalidMesh(format!(
                "{}: {} indices are not a sub-range of the mesh index sequence",
                group.name,
                group.indices.len()
            )));
        }
        self.groups.push(group);
        Ok(())
    }

    pub fn with_groups(mut self, groups: Vec<MeshGroup>) -> Result<Self> {
        for group in groups {
            self.add_group(group)?;
        }
        Ok(self)
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// 获取索引数量
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn groups(&self) -> &[MeshGroup] {
        &self.groups
    }

    /// 平铺顶点位置 [x0, y0, z0, x1, ...]，用于创建形变句柄
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    pub fn flat_normals(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.to_array()).collect()
    }

    pub fn flat_uvs(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|uv| uv.to_array()).collect()
    }

    // ========== 分组可见性（透传给渲染器） ==========

    /// 按名称查找分组
    pub fn group(&self, name: &str) -> Option<&MeshGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// 带有指定标签的分组
    pub fn groups_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a MeshGroup> + 'a {
        self.groups.iter().filter(move |g| g.has_tag(tag))
    }

    /// 设置分组可见性，分组不存在时返回 false
    pub fn set_group_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(group) => {
                group.visible = visible;
                true
            }
            None => false,
        }
    }

    /// 按标签设置可见性，返回受影响的分组数
    pub fn set_tag_visible(&mut self, tag: &str, visible: bool) -> usize {
        let mut count = 0;
        for group in self.groups.iter_mut().filter(|g| g.has_tag(tag)) {
            group.visible = visible;
            count += 1;
        }
        count
    }

    /// 当前可见的分组
    pub fn visible_groups(&self) -> impl Iterator<Item = &MeshGroup> {
        self.groups.iter().filter(|g| g.visible)
    }
}

fn check_indices(owner: &str, indices: &[u32], vertex_count: usize) -> Result<()> {
    if let Some(pos) = indices.iter().position(|&i| i as usize >= vertex_count) {
        return Err(EngineError::InvalidMesh(format!(
            "{}: index {} at position {} out of range (vertex count {})",
            owner, indices[pos], pos, vertex_count
        )));
    }
    Ok(())
}
