//! 所有集合、所有 B-scan 的区间标记.

use super::{CollectionRegistry, DiscreteInterval, IntervalLabel, IntervalMap, MarkerCollection};
use crate::{MarkerError, MarkerResult, ScanIdx};
use either::Either;
use std::iter;

/// 区间标记存储. 第一维为集合 (注册顺序), 第二维为 B-scan.
#[derive(Clone, Debug)]
pub struct IntervalLabelStore {
    registry: CollectionRegistry,
    maps: Vec<Vec<IntervalMap>>,
    num_scans: usize,
    changed: bool,
}

impl IntervalLabelStore {
    /// 为 `num_scans` 个 B-scan 创建空存储.
    pub fn new(registry: CollectionRegistry, num_scans: usize) -> Self {
        let maps = vec![vec![IntervalMap::new(); num_scans]; registry.len()];
        Self {
            registry,
            maps,
            num_scans,
            changed: false,
        }
    }

    /// 集合注册表.
    #[inline]
    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// 按名字查找集合.
    #[inline]
    pub fn collection(&self, name: &str) -> Option<&MarkerCollection> {
        self.registry.get(name)
    }

    /// B-scan 个数.
    #[inline]
    pub fn num_scans(&self) -> usize {
        self.num_scans
    }

    fn map(&self, collection: &str, scan: ScanIdx) -> MarkerResult<&IntervalMap> {
        let c = self
            .registry
            .position(collection)
            .ok_or_else(|| MarkerError::UnknownCollection(collection.to_owned()))?;
        self.maps[c].get(scan).ok_or(MarkerError::IndexOutOfRange {
            what: "B-scan",
            index: scan,
            len: self.num_scans,
        })
    }

    fn map_mut(&mut self, collection: &str, scan: ScanIdx) -> MarkerResult<&mut IntervalMap> {
        let c = self
            .registry
            .position(collection)
            .ok_or_else(|| MarkerError::UnknownCollection(collection.to_owned()))?;
        let len = self.num_scans;
        self.maps[c].get_mut(scan).ok_or(MarkerError::IndexOutOfRange {
            what: "B-scan",
            index: scan,
            len,
        })
    }

    /// 在 `collection` 的第 `scan` 个 B-scan 上将 `interval` 覆盖为 `label`.
    ///
    /// 已定义的 `label` 必须属于该集合, 否则返回 [`MarkerError::UnknownLabel`].
    pub fn assign(
        &mut self,
        collection: &str,
        scan: ScanIdx,
        interval: DiscreteInterval,
        label: IntervalLabel,
    ) -> MarkerResult<()> {
        if let (Some(index), Some(c)) = (label.index(), self.collection(collection)) {
            if c.label_def(label).is_none() {
                log::warn!("拒绝未知标签 {index} ({collection}, B-scan {scan})");
                return Err(MarkerError::UnknownLabel {
                    collection: collection.to_owned(),
                    index,
                });
            }
        }
        self.map_mut(collection, scan)?.assign(interval, label);
        self.changed = true;
        Ok(())
    }

    /// 同 [`Self::assign`], 但区间以原始端点给出. `start >= end` 时拒绝, 存储不变.
    pub fn assign_range(
        &mut self,
        collection: &str,
        scan: ScanIdx,
        start: usize,
        end: usize,
        label: IntervalLabel,
    ) -> MarkerResult<()> {
        let Some(interval) = DiscreteInterval::new(start, end) else {
            log::warn!("拒绝非法区间 [{start}, {end}) ({collection}, B-scan {scan})");
            return Err(MarkerError::InvalidInterval { start, end });
        };
        self.assign(collection, scan, interval, label)
    }

    /// 覆盖 `index` 的标签. 集合未知或越界时返回未定义.
    pub fn query(&self, collection: &str, scan: ScanIdx, index: usize) -> IntervalLabel {
        self.map(collection, scan)
            .map(|m| m.query(index))
            .unwrap_or(IntervalLabel::UNDEFINED)
    }

    /// 按起点升序迭代 `(区间, 标签)`. 集合未知或越界时为空.
    ///
    /// 返回的迭代器可以克隆, 从而重新开始.
    pub fn iterate(
        &self,
        collection: &str,
        scan: ScanIdx,
    ) -> impl Iterator<Item = (DiscreteInterval, IntervalLabel)> + Clone + '_ {
        match self.map(collection, scan) {
            Ok(m) => Either::Left(m.iter()),
            Err(_) => Either::Right(iter::empty()),
        }
    }

    /// 该 B-scan 上是否存在已定义区间.
    #[inline]
    pub fn has_defined(&self, collection: &str, scan: ScanIdx) -> bool {
        self.map(collection, scan).is_ok_and(|m| !m.is_empty())
    }

    /// 清空单个 B-scan.
    pub fn clear(&mut self, collection: &str, scan: ScanIdx) -> MarkerResult<()> {
        let m = self.map_mut(collection, scan)?;
        if !m.is_empty() {
            m.clear();
            self.changed = true;
        }
        Ok(())
    }

    /// 清空一个集合的所有 B-scan.
    pub fn clear_collection(&mut self, collection: &str) -> MarkerResult<()> {
        let c = self
            .registry
            .position(collection)
            .ok_or_else(|| MarkerError::UnknownCollection(collection.to_owned()))?;
        self.maps[c].iter_mut().for_each(IntervalMap::clear);
        self.changed = true;
        Ok(())
    }

    /// 清空所有集合.
    pub fn clear_all(&mut self) {
        self.maps.iter_mut().flatten().for_each(IntervalMap::clear);
        self.changed = true;
    }

    /// 自上次保存以来是否有修改.
    #[inline]
    pub fn has_changed_since_last_save(&self) -> bool {
        self.changed
    }

    /// 清除修改标记, 一般在保存后调用.
    #[inline]
    pub fn reset_changed(&mut self) {
        self.changed = false;
    }
}
