//! 参考图像像素与 B-scan 列之间的空间对应表.

use crate::{Pixel, ScanIdx};

/// 一条对应关系: 参考图像上的 `pixel` 对应第 `scan` 个 B-scan 的第 `column` 列.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Correspondence {
    /// 参考图像像素 `(x, y)`.
    pub pixel: Pixel,

    /// B-scan 索引.
    pub scan: ScanIdx,

    /// 列索引.
    pub column: usize,
}

/// 空间对应表. 由外部针对当前 series 计算并缓存, series 改变时作废.
pub trait CorrespondenceMap: Send + Sync {
    /// 参考图像尺寸 `(宽, 高)`.
    fn size(&self) -> (u32, u32);

    /// 所有对应关系. 每次调用都从头开始迭代.
    fn entries(&self) -> Box<dyn Iterator<Item = Correspondence> + '_>;
}

/// 以 `Vec` 保存的对应表.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecCorrespondenceMap {
    size: (u32, u32),
    entries: Vec<Correspondence>,
}

impl VecCorrespondenceMap {
    /// 空表.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            entries: Vec::new(),
        }
    }

    /// 追加一条对应关系.
    #[inline]
    pub fn push(&mut self, pixel: Pixel, scan: ScanIdx, column: usize) {
        self.entries.push(Correspondence { pixel, scan, column });
    }

    /// 对应关系条数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Correspondence> for VecCorrespondenceMap {
    fn extend<T: IntoIterator<Item = Correspondence>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl CorrespondenceMap for VecCorrespondenceMap {
    #[inline]
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Correspondence> + '_> {
        Box::new(self.entries.iter().copied())
    }
}
