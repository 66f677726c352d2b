//! 边界线编辑的撤销与重做.

use super::LayerBoundaryStore;
use crate::data::BoundaryType;
use crate::{MarkerError, MarkerResult, ScanIdx};
use std::ops::Range;

/// 一次对边界线连续区段的修改. 同时保存新旧数据, 因此可以双向应用.
#[derive(Clone, Debug, PartialEq)]
pub struct RangePatch {
    scan: ScanIdx,
    kind: BoundaryType,
    start: usize,
    old: Vec<f64>,
    new: Vec<f64>,
}

impl RangePatch {
    /// 构建补丁. 新旧数据长度必须相同.
    pub fn new(scan: ScanIdx, kind: BoundaryType, start: usize, old: Vec<f64>, new: Vec<f64>) -> MarkerResult<Self> {
        if old.len() != new.len() {
            return Err(MarkerError::PatchLengthMismatch {
                old: old.len(),
                new: new.len(),
            });
        }
        Ok(Self { scan, kind, start, old, new })
    }

    /// 所在 B-scan.
    #[inline]
    pub fn scan(&self) -> ScanIdx {
        self.scan
    }

    /// 边界线类型.
    #[inline]
    pub fn kind(&self) -> BoundaryType {
        self.kind
    }

    /// 影响的列.
    #[inline]
    pub fn columns(&self) -> Range<usize> {
        self.start..self.start + self.new.len()
    }

    /// 写入新数据.
    #[inline]
    pub fn apply(&self, store: &mut LayerBoundaryStore) -> MarkerResult<()> {
        store.set_range(self.scan, self.kind, self.start, &self.new)
    }

    /// 写回旧数据.
    #[inline]
    pub fn revert(&self, store: &mut LayerBoundaryStore) -> MarkerResult<()> {
        store.set_range(self.scan, self.kind, self.start, &self.old)
    }
}

/// 撤销栈与重做栈. 压入新命令会清空重做栈.
#[derive(Clone, Debug, Default)]
pub struct EditCommandStack {
    undo: Vec<RangePatch>,
    redo: Vec<RangePatch>,
}

impl EditCommandStack {
    /// 空栈.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 立即应用 `new`, 并压入一条同时记录 `old` 的命令.
    pub fn push(
        &mut self,
        store: &mut LayerBoundaryStore,
        scan: ScanIdx,
        kind: BoundaryType,
        start: usize,
        old: Vec<f64>,
        new: Vec<f64>,
    ) -> MarkerResult<()> {
        let patch = RangePatch::new(scan, kind, start, old, new)?;
        patch.apply(store)?;
        self.push_applied(patch);
        Ok(())
    }

    /// 从存储中截取旧数据后, 同 [`Self::push`].
    pub fn patch(
        &mut self,
        store: &mut LayerBoundaryStore,
        scan: ScanIdx,
        kind: BoundaryType,
        start: usize,
        new: Vec<f64>,
    ) -> MarkerResult<()> {
        let line = store.samples(scan, kind)?;
        let end = start + new.len();
        let old = line
            .get(start..end)
            .ok_or(MarkerError::IndexOutOfRange {
                what: "列",
                index: end.saturating_sub(1),
                len: line.len(),
            })?
            .to_vec();
        self.push(store, scan, kind, start, old, new)
    }

    /// 压入一条已经写入存储的命令. 用于边拖动边绘制的编辑.
    pub fn push_applied(&mut self, patch: RangePatch) {
        log::debug!(
            "压入撤销命令: B-scan {}, {}, 列 {:?}",
            patch.scan,
            patch.kind,
            patch.columns()
        );
        self.undo.push(patch);
        self.redo.clear();
    }

    /// 撤销最近一条命令, 返回被撤销的命令. 栈空时返回 `None`.
    ///
    /// 写回失败时命令留在撤销栈中.
    pub fn undo(&mut self, store: &mut LayerBoundaryStore) -> MarkerResult<Option<&RangePatch>> {
        let Some(patch) = self.undo.pop() else {
            return Ok(None);
        };
        if let Err(e) = patch.revert(store) {
            self.undo.push(patch);
            return Err(e);
        }
        self.redo.push(patch);
        Ok(self.redo.last())
    }

    /// 重做最近一条被撤销的命令, 返回该命令. 栈空时返回 `None`.
    pub fn redo(&mut self, store: &mut LayerBoundaryStore) -> MarkerResult<Option<&RangePatch>> {
        let Some(patch) = self.redo.pop() else {
            return Ok(None);
        };
        if let Err(e) = patch.apply(store) {
            self.redo.push(patch);
            return Err(e);
        }
        self.undo.push(patch);
        Ok(self.undo.last())
    }

    /// 清空两个栈.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// 可撤销的步数.
    #[inline]
    pub fn num_undo_steps(&self) -> usize {
        self.undo.len()
    }

    /// 可重做的步数.
    #[inline]
    pub fn num_redo_steps(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::EditCommandStack;
    use crate::data::{BoundaryType, SeriesInfo};
    use crate::layer::LayerBoundaryStore;
    use crate::MarkerError;

    fn bits(store: &LayerBoundaryStore) -> Vec<u64> {
        store
            .iter()
            .flat_map(|d| BoundaryType::ALL.into_iter().flat_map(move |t| d.line(t).to_vec()))
            .map(f64::to_bits)
            .collect()
    }

    #[test]
    fn test_undo_redo_restores_bits() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(2, 6, 0.0039));
        let mut stack = EditCommandStack::new();
        let mut states = vec![bits(&s)];

        stack.patch(&mut s, 0, BoundaryType::Ilm, 1, vec![1.0, 2.0, 3.0]).unwrap();
        states.push(bits(&s));
        stack.patch(&mut s, 0, BoundaryType::Ilm, 2, vec![f64::NAN, 7.5]).unwrap();
        states.push(bits(&s));
        stack.patch(&mut s, 1, BoundaryType::Bm, 0, vec![0.25; 6]).unwrap();
        states.push(bits(&s));

        for k in 1..=3 {
            for _ in 0..k {
                assert!(stack.undo(&mut s).unwrap().is_some());
            }
            assert_eq!(bits(&s), states[3 - k]);
            for _ in 0..k {
                assert!(stack.redo(&mut s).unwrap().is_some());
            }
            assert_eq!(bits(&s), states[3]);
        }
    }

    #[test]
    fn test_push_clears_redo() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 4, 0.0039));
        let mut stack = EditCommandStack::new();
        stack.patch(&mut s, 0, BoundaryType::Ilm, 0, vec![1.0]).unwrap();
        stack.undo(&mut s).unwrap();
        assert_eq!(stack.num_redo_steps(), 1);
        stack.patch(&mut s, 0, BoundaryType::Ilm, 1, vec![2.0]).unwrap();
        assert_eq!(stack.num_redo_steps(), 0);
        assert_eq!(stack.num_undo_steps(), 1);
        assert!(stack.redo(&mut s).unwrap().is_none());
    }

    #[test]
    fn test_empty_undo_is_noop() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 4, 0.0039));
        let mut stack = EditCommandStack::new();
        assert!(stack.undo(&mut s).unwrap().is_none());
        assert!(!s.has_unsaved_changes());
    }

    #[test]
    fn test_rejects_bad_patch() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 4, 0.0039));
        let mut stack = EditCommandStack::new();
        assert_eq!(
            stack.push(&mut s, 0, BoundaryType::Ilm, 0, vec![1.0], vec![1.0, 2.0]),
            Err(MarkerError::PatchLengthMismatch { old: 1, new: 2 })
        );
        assert!(stack.patch(&mut s, 0, BoundaryType::Ilm, 3, vec![1.0, 2.0]).is_err());
        assert_eq!(stack.num_undo_steps(), 0);
    }
}
