//! B-scan 分层边界线.
//!
//! 每个 B-scan 对每种 [`BoundaryType`] 保存一条逐列采样的边界线, 长度等于该 B-scan 的宽度.
//! 边界线在首次访问某个 B-scan 时才从外部默认数据源填充.

pub mod edit;
mod io;
mod mirror;
mod undo;

pub(crate) use io::{compress, decompress};
pub use io::{load_segmentation_bin, save_segmentation_bin};
pub use mirror::LineMirror;
pub use undo::{EditCommandStack, RangePatch};

use crate::data::{BoundaryType, SeriesInfo, UNDEFINED};
use crate::{MarkerError, MarkerResult, ScanIdx};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 默认边界线数据源, 一般来自扫描文件自带的自动分割结果.
pub trait DefaultBoundarySource: Send + Sync {
    /// 第 `scan` 个 B-scan 的默认边界线. 缺失的类型视为全部未定义.
    fn default_boundaries(&self, scan: ScanIdx) -> HashMap<BoundaryType, Vec<f64>>;
}

/// 不提供任何默认边界线.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoDefaults;

impl DefaultBoundarySource for NoDefaults {
    #[inline]
    fn default_boundaries(&self, _scan: ScanIdx) -> HashMap<BoundaryType, Vec<f64>> {
        HashMap::new()
    }
}

impl<F> DefaultBoundarySource for F
where
    F: Fn(ScanIdx) -> HashMap<BoundaryType, Vec<f64>> + Send + Sync,
{
    #[inline]
    fn default_boundaries(&self, scan: ScanIdx) -> HashMap<BoundaryType, Vec<f64>> {
        self(scan)
    }
}

/// 将 `line` 调整到 `width`, 保留已有索引, 新位置填充未定义.
#[inline]
fn fit_width(line: &mut Vec<f64>, width: usize) {
    line.resize(width, UNDEFINED);
}

/// 单个 B-scan 的全部边界线及其状态.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSegData {
    lines: Vec<Vec<f64>>,
    modified: Vec<bool>,
    loaded: Vec<bool>,
    filled: bool,
}

impl LayerSegData {
    /// 所有边界线均为未定义、尚未填充的数据.
    pub fn new(width: usize) -> Self {
        Self {
            lines: vec![vec![UNDEFINED; width]; BoundaryType::COUNT],
            modified: vec![false; BoundaryType::COUNT],
            loaded: vec![false; BoundaryType::COUNT],
            filled: false,
        }
    }

    /// 列数.
    #[inline]
    pub fn width(&self) -> usize {
        self.lines[0].len()
    }

    /// 边界线采样.
    #[inline]
    pub fn line(&self, kind: BoundaryType) -> &[f64] {
        &self.lines[kind.index()]
    }

    /// 是否被编辑过.
    #[inline]
    pub fn is_modified(&self, kind: BoundaryType) -> bool {
        self.modified[kind.index()]
    }

    /// 是否从标注文件中读取过.
    #[inline]
    pub fn is_loaded(&self, kind: BoundaryType) -> bool {
        self.loaded[kind.index()]
    }

    /// 是否已经从默认数据源填充.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    fn fill(&mut self, mut defaults: HashMap<BoundaryType, Vec<f64>>) {
        let width = self.width();
        for kind in BoundaryType::ALL {
            let mut line = defaults.remove(&kind).unwrap_or_default();
            fit_width(&mut line, width);
            self.lines[kind.index()] = line;
        }
        self.modified.fill(false);
        self.loaded.fill(false);
        self.filled = true;
    }

    fn resize(&mut self, width: usize) {
        self.lines.iter_mut().for_each(|l| fit_width(l, width));
    }
}

/// 整个 series 的边界线存储.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerBoundaryStore {
    scans: Vec<LayerSegData>,
}

impl LayerBoundaryStore {
    /// 按 series 几何信息初始化, 所有边界线为未定义.
    pub fn new(series: &SeriesInfo) -> Self {
        Self {
            scans: series.widths().iter().map(|&w| LayerSegData::new(w)).collect(),
        }
    }

    /// B-scan 个数.
    #[inline]
    pub fn num_scans(&self) -> usize {
        self.scans.len()
    }

    #[inline]
    fn check_scan(&self, scan: ScanIdx) -> MarkerResult<()> {
        if scan < self.scans.len() {
            Ok(())
        } else {
            Err(MarkerError::IndexOutOfRange {
                what: "B-scan",
                index: scan,
                len: self.scans.len(),
            })
        }
    }

    /// 单个 B-scan 的数据.
    pub fn scan(&self, scan: ScanIdx) -> MarkerResult<&LayerSegData> {
        self.check_scan(scan)?;
        Ok(&self.scans[scan])
    }

    /// 按 B-scan 顺序迭代所有数据.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, LayerSegData> {
        self.scans.iter()
    }

    /// 若尚未填充, 从 `source` 填充第 `scan` 个 B-scan. 返回本次是否实际填充.
    pub fn ensure_filled(&mut self, scan: ScanIdx, source: &dyn DefaultBoundarySource) -> MarkerResult<bool> {
        self.check_scan(scan)?;
        let data = &mut self.scans[scan];
        if data.filled {
            return Ok(false);
        }
        log::debug!("从默认数据源填充 B-scan {scan}");
        data.fill(source.default_boundaries(scan));
        Ok(true)
    }

    /// 无条件从 `source` 重新填充, 丢弃该 B-scan 的全部编辑.
    pub fn refill(&mut self, scan: ScanIdx, source: &dyn DefaultBoundarySource) -> MarkerResult<()> {
        self.check_scan(scan)?;
        self.scans[scan].fill(source.default_boundaries(scan));
        Ok(())
    }

    /// 填充所有尚未填充的 B-scan.
    pub fn fill_all(&mut self, source: &dyn DefaultBoundarySource) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                self.par_fill_all(source);
            } else {
                for (i, data) in self.scans.iter_mut().enumerate().filter(|(_, d)| !d.filled) {
                    data.fill(source.default_boundaries(i));
                }
            }
        }
    }

    /// 第 `scan` 个 B-scan 上 `kind` 的全部采样.
    pub fn samples(&self, scan: ScanIdx, kind: BoundaryType) -> MarkerResult<&[f64]> {
        Ok(self.scan(scan)?.line(kind))
    }

    /// 单个采样. 越界时返回 `None`.
    #[inline]
    pub fn sample(&self, scan: ScanIdx, kind: BoundaryType, column: usize) -> Option<f64> {
        self.scans.get(scan)?.line(kind).get(column).copied()
    }

    /// 从 `start` 开始写入 `values`, 不经过撤销栈, 并标记为已修改.
    ///
    /// 写入范围超出宽度时拒绝, 数据保持不变.
    pub fn set_range(&mut self, scan: ScanIdx, kind: BoundaryType, start: usize, values: &[f64]) -> MarkerResult<()> {
        self.check_scan(scan)?;
        let data = &mut self.scans[scan];
        let width = data.width();
        let end = start + values.len();
        if end > width {
            return Err(MarkerError::IndexOutOfRange {
                what: "列",
                index: end.saturating_sub(1).max(start),
                len: width,
            });
        }
        data.lines[kind.index()][start..end].copy_from_slice(values);
        data.modified[kind.index()] = true;
        Ok(())
    }

    /// 改变第 `scan` 个 B-scan 的宽度. 保留 `0..min(旧, 新)` 的采样, 新增位置为未定义.
    pub fn resize(&mut self, scan: ScanIdx, width: usize) -> MarkerResult<()> {
        self.check_scan(scan)?;
        self.scans[scan].resize(width);
        Ok(())
    }

    /// 写入从标注文件读取的整条边界线, 并标记为已读取.
    ///
    /// 长度与宽度不符时截断或以未定义补齐.
    pub fn load_line(&mut self, scan: ScanIdx, kind: BoundaryType, mut values: Vec<f64>) -> MarkerResult<()> {
        self.check_scan(scan)?;
        let data = &mut self.scans[scan];
        fit_width(&mut values, data.width());
        data.lines[kind.index()] = values;
        data.loaded[kind.index()] = true;
        Ok(())
    }

    /// 是否存在未保存的编辑.
    pub fn has_unsaved_changes(&self) -> bool {
        self.scans.iter().any(|d| d.modified.iter().any(|&m| m))
    }

    /// 清除所有修改标记, 一般在保存后调用. 被修改过的边界线此后视为已读取, 下次保存时仍会写出.
    pub fn reset_changes(&mut self) {
        for d in self.scans.iter_mut() {
            for (m, l) in d.modified.iter_mut().zip(d.loaded.iter_mut()) {
                *l |= *m;
                *m = false;
            }
        }
    }

    /// `kind` 边界线是否需要写入标注文件: 被编辑过, 或者读取自标注文件.
    #[inline]
    pub fn is_persistent(&self, scan: ScanIdx, kind: BoundaryType) -> bool {
        self.scans
            .get(scan)
            .is_some_and(|d| d.is_modified(kind) || d.is_loaded(kind))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl LayerBoundaryStore {
    /// 借助 `rayon`, 并行地填充所有尚未填充的 B-scan.
    pub fn par_fill_all(&mut self, source: &dyn DefaultBoundarySource) {
        self.scans
            .par_iter_mut()
            .enumerate()
            .filter(|(_, d)| !d.filled)
            .for_each(|(i, d)| d.fill(source.default_boundaries(i)));
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerBoundaryStore, NoDefaults};
    use crate::data::{BoundaryType, SeriesInfo};
    use crate::MarkerError;
    use std::collections::HashMap;

    fn defaults(scan: usize) -> HashMap<BoundaryType, Vec<f64>> {
        let mut m = HashMap::new();
        m.insert(BoundaryType::Ilm, vec![scan as f64; 3]);
        m
    }

    #[test]
    fn test_ensure_filled_pads_and_clears_flags() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(2, 5, 0.0039));
        assert!(s.ensure_filled(1, &defaults).unwrap());
        assert!(!s.ensure_filled(1, &defaults).unwrap());
        let ilm = s.samples(1, BoundaryType::Ilm).unwrap();
        assert_eq!(&ilm[..3], &[1.0, 1.0, 1.0]);
        assert!(ilm[3].is_nan() && ilm[4].is_nan());
        assert!(s.samples(1, BoundaryType::Bm).unwrap().iter().all(|v| v.is_nan()));
        assert!(!s.has_unsaved_changes());
    }

    #[test]
    fn test_set_range_marks_modified() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 4, 0.0039));
        s.ensure_filled(0, &NoDefaults).unwrap();
        s.set_range(0, BoundaryType::Bm, 1, &[2.0, 3.0]).unwrap();
        assert!(s.scan(0).unwrap().is_modified(BoundaryType::Bm));
        assert!(s.has_unsaved_changes());
        s.reset_changes();
        assert!(!s.has_unsaved_changes());
        assert!(s.is_persistent(0, BoundaryType::Bm));
        assert!(!s.is_persistent(0, BoundaryType::Ilm));
    }

    #[test]
    fn test_set_range_rejects_overflow() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 4, 0.0039));
        let err = s.set_range(0, BoundaryType::Bm, 3, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, MarkerError::IndexOutOfRange { len: 4, .. }));
        assert!(s.samples(0, BoundaryType::Bm).unwrap().iter().all(|v| v.is_nan()));
        assert!(!s.has_unsaved_changes());
        assert!(s.set_range(1, BoundaryType::Bm, 0, &[1.0]).is_err());
    }

    #[test]
    fn test_resize_preserves_prefix() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 4, 0.0039));
        s.set_range(0, BoundaryType::Ilm, 0, &[1.0, 2.0, 3.0, 4.0]).unwrap();

        s.resize(0, 6).unwrap();
        let once = s.samples(0, BoundaryType::Ilm).unwrap().to_vec();
        s.resize(0, 6).unwrap();
        let twice = s.samples(0, BoundaryType::Ilm).unwrap().to_vec();
        assert_eq!(once.len(), twice.len());
        assert!(once.iter().zip(&twice).all(|(a, b)| a.to_bits() == b.to_bits()));

        s.resize(0, 2).unwrap();
        s.resize(0, 4).unwrap();
        let v = s.samples(0, BoundaryType::Ilm).unwrap();
        assert_eq!(&v[..2], &[1.0, 2.0]);
        assert!(v[2].is_nan() && v[3].is_nan());
    }

    #[test]
    fn test_fill_all() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(3, 3, 0.0039));
        s.fill_all(&defaults);
        assert!(s.iter().all(|d| d.is_filled()));
        assert_eq!(s.sample(2, BoundaryType::Ilm, 0), Some(2.0));
        assert_eq!(s.sample(3, BoundaryType::Ilm, 0), None);
    }
}
