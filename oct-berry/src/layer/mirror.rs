//! 边界线镜像. 用于在一次编辑开始前保存原数据.

use super::LayerBoundaryStore;
use crate::data::BoundaryType;
use crate::{MarkerResult, ScanIdx};
use std::ops::Range;

/// 一条边界线的拥有所有权的不透明镜像.
/// 用于临时保存一条边界线的值, 随后恢复, 或者截取其中一段作为撤销补丁的旧数据.
///
/// 注意该结构是被设计来 **快速** 回填原数据的,
/// 因此并不压缩原数据.
#[derive(Clone, Debug, PartialEq)]
pub struct LineMirror(pub(crate) Vec<f64>);

impl From<&[f64]> for LineMirror {
    fn from(value: &[f64]) -> Self {
        Self(value.to_vec())
    }
}

impl LineMirror {
    /// 保存第 `scan` 个 B-scan 上的 `kind` 边界线.
    pub fn capture(store: &LayerBoundaryStore, scan: ScanIdx, kind: BoundaryType) -> MarkerResult<Self> {
        store.samples(scan, kind).map(Self::from)
    }

    /// 镜像长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 镜像是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 截取一段. 越界时返回 `None`.
    #[inline]
    pub fn range(&self, range: Range<usize>) -> Option<&[f64]> {
        self.0.get(range)
    }

    /// 将整条镜像写回存储. 会标记为已修改.
    pub fn restore(&self, store: &mut LayerBoundaryStore, scan: ScanIdx, kind: BoundaryType) -> MarkerResult<()> {
        store.set_range(scan, kind, 0, &self.0)
    }
}
