//! 有序、互不重叠的区间映射.

use super::{DiscreteInterval, IntervalLabel};
use itertools::Itertools;
use std::slice;

/// 单个 B-scan 上的区间映射.
///
/// 以起点升序存储. 不变式:
///
/// 1. 任意两个区间不重叠;
/// 2. 首尾相接的两个区间标签不同;
/// 3. 只存储已定义的标签.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntervalMap {
    entries: Vec<(DiscreteInterval, IntervalLabel)>,
}

impl IntervalMap {
    /// 空映射.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 将 `interval` 覆盖为 `label`.
    ///
    /// 与 `interval` 重叠的旧区间被裁剪或拆分, 只有重叠部分被覆盖.
    /// 随后合并相邻的同标签区间. `label` 未定义时只擦除, 不插入.
    pub fn assign(&mut self, interval: DiscreteInterval, label: IntervalLabel) {
        let mut pieces = Vec::with_capacity(self.entries.len() + 2);
        for &(cur, cur_label) in self.entries.iter() {
            if !cur.overlaps(&interval) {
                pieces.push((cur, cur_label));
                continue;
            }
            // 左右两侧的残余部分.
            if let Some(left) = DiscreteInterval::new(cur.start(), interval.start()) {
                pieces.push((left, cur_label));
            }
            if let Some(right) = DiscreteInterval::new(interval.end(), cur.end()) {
                pieces.push((right, cur_label));
            }
        }
        if label.is_defined() {
            pieces.push((interval, label));
        }
        pieces.sort_unstable_by_key(|(iv, _)| iv.start());

        self.entries = pieces
            .into_iter()
            .coalesce(|(a, la), (b, lb)| {
                if a.end() == b.start() && la == lb {
                    // 已保证 a.start < b.end.
                    Ok((DiscreteInterval { start: a.start(), end: b.end() }, la))
                } else {
                    Err(((a, la), (b, lb)))
                }
            })
            .collect();
        debug_assert!(self.is_canonical());
    }

    /// 覆盖 `index` 的标签. 没有区间覆盖时返回未定义.
    pub fn query(&self, index: usize) -> IntervalLabel {
        let pos = self.entries.partition_point(|(iv, _)| iv.end() <= index);
        match self.entries.get(pos) {
            Some((iv, label)) if iv.contains(index) => *label,
            _ => IntervalLabel::UNDEFINED,
        }
    }

    /// 按起点升序迭代所有 `(区间, 标签)`. 迭代器可克隆, 因此可以重新开始.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// 区间个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有任何已定义区间.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 检查不变式是否成立.
    pub fn is_canonical(&self) -> bool {
        self.entries.iter().all(|(_, l)| l.is_defined())
            && self.entries.windows(2).all(|w| {
                let ((a, la), (b, lb)) = (w[0], w[1]);
                a.end() <= b.start() && !(a.end() == b.start() && la == lb)
            })
    }
}

/// [`IntervalMap`] 的迭代器.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, (DiscreteInterval, IntervalLabel)>,
}

impl Iterator for Iter<'_> {
    type Item = (DiscreteInterval, IntervalLabel);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a IntervalMap {
    type Item = (DiscreteInterval, IntervalLabel);
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::IntervalMap;
    use crate::interval::{DiscreteInterval, IntervalLabel};
    use proptest::prelude::*;

    const A: IntervalLabel = IntervalLabel::new(0);
    const B: IntervalLabel = IntervalLabel::new(1);

    fn iv(start: usize, end: usize) -> DiscreteInterval {
        DiscreteInterval::new(start, end).unwrap()
    }

    fn collect(map: &IntervalMap) -> Vec<(usize, usize, IntervalLabel)> {
        map.iter().map(|(i, l)| (i.start(), i.end(), l)).collect()
    }

    #[test]
    fn test_overwrite_tail() {
        let mut m = IntervalMap::new();
        m.assign(iv(0, 5), A);
        m.assign(iv(3, 8), B);
        assert_eq!(collect(&m), vec![(0, 3, A), (3, 8, B)]);
    }

    #[test]
    fn test_split_middle() {
        let mut m = IntervalMap::new();
        m.assign(iv(0, 10), A);
        m.assign(iv(4, 6), B);
        assert_eq!(collect(&m), vec![(0, 4, A), (4, 6, B), (6, 10, A)]);

        // 再覆盖回去, 三段合并成一段.
        m.assign(iv(4, 6), A);
        assert_eq!(collect(&m), vec![(0, 10, A)]);
    }

    #[test]
    fn test_coalesce_adjacent() {
        let mut m = IntervalMap::new();
        m.assign(iv(0, 5), A);
        m.assign(iv(5, 9), A);
        m.assign(iv(12, 15), A);
        assert_eq!(collect(&m), vec![(0, 9, A), (12, 15, A)]);
        m.assign(iv(9, 12), A);
        assert_eq!(collect(&m), vec![(0, 15, A)]);
    }

    #[test]
    fn test_undefined_erases() {
        let mut m = IntervalMap::new();
        m.assign(iv(0, 10), A);
        m.assign(iv(2, 4), IntervalLabel::UNDEFINED);
        assert_eq!(collect(&m), vec![(0, 2, A), (4, 10, A)]);
        m.assign(iv(0, 10), IntervalLabel::UNDEFINED);
        assert!(m.is_empty());
    }

    #[test]
    fn test_query() {
        let mut m = IntervalMap::new();
        m.assign(iv(0, 5), A);
        m.assign(iv(10, 20), B);
        assert_eq!(m.query(0), A);
        assert_eq!(m.query(4), A);
        assert_eq!(m.query(5), IntervalLabel::UNDEFINED);
        assert_eq!(m.query(10), B);
        assert_eq!(m.query(19), B);
        assert_eq!(m.query(20), IntervalLabel::UNDEFINED);
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut m = IntervalMap::new();
        m.assign(iv(10, 20), B);
        m.assign(iv(0, 5), A);
        let it = m.iter();
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(first[0].0, iv(0, 5));
    }

    proptest! {
        #[test]
        fn prop_assign_keeps_canonical_form(
            ops in prop::collection::vec((0usize..60, 1usize..20, 0u16..4), 0..64)
        ) {
            let mut m = IntervalMap::new();
            // 参照实现: 逐点标签.
            let mut naive = vec![IntervalLabel::UNDEFINED; 80];
            for (start, len, raw) in ops {
                let label = if raw == 3 { IntervalLabel::UNDEFINED } else { IntervalLabel::new(raw) };
                m.assign(iv(start, start + len), label);
                naive[start..start + len].iter_mut().for_each(|l| *l = label);
            }
            prop_assert!(m.is_canonical());
            for (i, expected) in naive.iter().enumerate() {
                prop_assert_eq!(m.query(i), *expected);
            }
        }
    }
}
