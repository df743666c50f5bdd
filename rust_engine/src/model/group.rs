//! 网格分组定义

/// 网格分组
///
/// 网格三角形索引序列中的一段连续子区间 + 标签（例如 "anatomical"），
/// 只用于可见性切换，不参与形变。分组之间可以重叠。
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGroup {
    pub name: String,
    pub indices: Vec<u32>,
    pub tags: Vec<String>,
    /// 透传给渲染器的可见性标记，引擎不读取
    pub visible: bool,
}

impl MeshGroup {
    pub fn new(name: impl Into<String>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            indices,
            tags: Vec::new(),
            visible: true,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// 是否带有指定标签
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
