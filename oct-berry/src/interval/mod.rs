//! B-scan 区间标记.
//!
//! 每个标记集合在每个 B-scan 上维护一组互不重叠的 `[start, end) -> label` 映射.
//! 赋值时只覆盖被重叠的部分, 随后合并相邻的同标签区间.

mod collection;
mod map;
mod store;

pub use collection::{CollectionRegistry, LabelDef, MarkerCollection};
pub use map::{IntervalMap, Iter};
pub use store::IntervalLabelStore;

use serde::{Deserialize, Serialize};
use std::fmt;

/// 半开整数区间 `[start, end)`. 构造时保证 `start < end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteInterval {
    start: usize,
    end: usize,
}

impl DiscreteInterval {
    /// 构建区间. 空区间或反向区间 (`start >= end`) 返回 `None`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// 起点 (含).
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// 终点 (不含).
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// 区间长度, 总是大于 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// 区间非空, 总是返回 `false`. 仅为满足 clippy 约定.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `index` 是否落在区间内.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// 两个区间是否有公共点.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for DiscreteInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// 区间标签. 内部是所属标记集合中的标签序号, 或者 "未定义".
///
/// 标签本身不记录所属集合, 其含义由 [`MarkerCollection`] 解释.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalLabel(Option<u16>);

impl IntervalLabel {
    /// 未定义标签. 对区间赋未定义标签等价于擦除该区间.
    pub const UNDEFINED: IntervalLabel = IntervalLabel(None);

    /// 集合中第 `index` 个标签.
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(Some(index))
    }

    /// 是否已定义.
    #[inline]
    pub const fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    /// 标签序号. 未定义时返回 `None`.
    #[inline]
    pub const fn index(&self) -> Option<u16> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{DiscreteInterval, IntervalLabel};

    #[test]
    fn test_interval_rejects_degenerate() {
        assert!(DiscreteInterval::new(100, 100).is_none());
        assert!(DiscreteInterval::new(5, 3).is_none());
        let iv = DiscreteInterval::new(3, 8).unwrap();
        assert_eq!(iv.len(), 5);
        assert!(iv.contains(3));
        assert!(!iv.contains(8));
    }

    #[test]
    fn test_interval_overlap() {
        let a = DiscreteInterval::new(0, 5).unwrap();
        let b = DiscreteInterval::new(5, 9).unwrap();
        let c = DiscreteInterval::new(4, 6).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_label_default_is_undefined() {
        assert_eq!(IntervalLabel::default(), IntervalLabel::UNDEFINED);
        assert!(IntervalLabel::new(0).is_defined());
        assert_eq!(IntervalLabel::new(2).index(), Some(2));
    }
}
