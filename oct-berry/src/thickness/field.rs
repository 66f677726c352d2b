//! 厚度标量场及其投影算法.

use super::{Colormap, CorrespondenceMap};
use crate::consts::color::TRANSPARENT;
use crate::data::{is_undefined, BoundaryType};
use crate::layer::LayerBoundaryStore;
use crate::Pixel;
use image::{Rgba, RgbaImage};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// 多条对应关系落在同一参考像素上时的处理方式.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelPolicy {
    /// 取算术平均.
    #[default]
    Average,

    /// 按对应表迭代顺序, 保留最后一次写入.
    LastWrite,
}

/// 一次投影的参数.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// 上边界.
    pub upper: BoundaryType,

    /// 下边界.
    pub lower: BoundaryType,

    /// 像素差到显示单位的比例, 一般为深度分辨率 (毫米) 乘以 1000.
    pub scale: f64,

    /// 像素冲突处理方式.
    pub policy: PixelPolicy,
}

/// 投影过程的统计.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    /// 访问过的对应关系条数.
    pub entries: usize,

    /// 因上/下边界未定义而跳过的条数.
    pub skipped_undefined: usize,

    /// 因 B-scan, 列或像素越界而跳过的条数.
    pub skipped_out_of_range: usize,

    /// 获得厚度值的像素个数.
    pub pixels_written: usize,

    /// 写入已有值像素的次数.
    pub collisions: usize,
}

/// 与参考图像同尺寸的厚度场. 未计算的像素为未定义.
#[derive(Clone, Debug, PartialEq)]
pub struct ThicknessField {
    /// 以 `[y, x]` 索引.
    values: Array2<f64>,
    hits: Array2<u32>,
}

impl ThicknessField {
    /// 宽 `width`, 高 `height`, 全部未定义.
    pub fn new(width: u32, height: u32) -> Self {
        let sh = (height as usize, width as usize);
        Self {
            values: Array2::from_elem(sh, f64::NAN),
            hits: Array2::zeros(sh),
        }
    }

    /// 尺寸 `(宽, 高)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        let (h, w) = self.values.dim();
        (w as u32, h as u32)
    }

    /// 像素处的厚度. 未定义或越界时返回 `None`.
    #[inline]
    pub fn get(&self, (x, y): Pixel) -> Option<f64> {
        self.values
            .get((y as usize, x as usize))
            .copied()
            .filter(|v| !is_undefined(*v))
    }

    /// 像素被写入的次数.
    #[inline]
    pub fn hits(&self, (x, y): Pixel) -> u32 {
        self.hits.get((y as usize, x as usize)).copied().unwrap_or(0)
    }

    /// 底层数据, 以 `[y, x]` 索引.
    #[inline]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// 有厚度值的像素个数.
    pub fn num_defined(&self) -> usize {
        self.hits.iter().filter(|&&n| n > 0).count()
    }

    /// 最大厚度. 没有任何值时返回 `None`.
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !is_undefined(*v))
            .max_by(f64::total_cmp)
    }

    /// 写入一个厚度值. 返回该像素此前是否已有值.
    fn accumulate(&mut self, (x, y): Pixel, thickness: f64, policy: PixelPolicy) -> Option<bool> {
        let idx = (y as usize, x as usize);
        let n = self.hits.get_mut(idx)?;
        *n += 1;
        let n = *n;
        let v = &mut self.values[idx];
        match (policy, n) {
            (_, 1) | (PixelPolicy::LastWrite, _) => *v = thickness,
            // 增量均值, 与迭代顺序一致即可保证确定性.
            (PixelPolicy::Average, _) => *v += (thickness - *v) / f64::from(n),
        }
        Some(n > 1)
    }

    /// 通过色表着色. 未定义的像素完全透明.
    pub fn colorize(&self, colormap: &dyn Colormap) -> RgbaImage {
        let (w, h) = self.size();
        let mut buf = RgbaImage::from_pixel(w, h, Rgba(TRANSPARENT));
        for ((y, x), &v) in self.values.indexed_iter() {
            if !is_undefined(v) {
                buf.put_pixel(x as u32, y as u32, colormap.color_for(v));
            }
        }
        buf
    }
}

/// 把 `store` 中每个 B-scan 的上下边界之差投影到参考图像上.
///
/// 任一边界未定义的对应关系被跳过, 对应像素保持未定义. `cancel` 在每条对应关系之间检查,
/// 被置位时放弃本次投影并返回 `None`.
pub fn project(
    store: &LayerBoundaryStore,
    map: &dyn CorrespondenceMap,
    params: &ProjectionParams,
    cancel: Option<&AtomicBool>,
) -> Option<(ThicknessField, ProjectionStats)> {
    let (w, h) = map.size();
    let mut field = ThicknessField::new(w, h);
    let mut stats = ProjectionStats::default();

    for c in map.entries() {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            log::debug!("厚度图投影在第 {} 条对应关系处被取消", stats.entries);
            return None;
        }
        stats.entries += 1;

        let (Some(upper), Some(lower)) = (
            store.sample(c.scan, params.upper, c.column),
            store.sample(c.scan, params.lower, c.column),
        ) else {
            stats.skipped_out_of_range += 1;
            continue;
        };
        if is_undefined(upper) || is_undefined(lower) {
            stats.skipped_undefined += 1;
            continue;
        }

        match field.accumulate(c.pixel, (lower - upper) * params.scale, params.policy) {
            Some(true) => stats.collisions += 1,
            Some(false) => stats.pixels_written += 1,
            None => stats.skipped_out_of_range += 1,
        }
    }

    log::debug!("厚度图投影完成: {stats:?}");
    Some((field, stats))
}

#[cfg(test)]
mod tests {
    use super::{project, PixelPolicy, ProjectionParams};
    use crate::data::{BoundaryType, SeriesInfo};
    use crate::layer::LayerBoundaryStore;
    use crate::thickness::{ColormapHsv, VecCorrespondenceMap};
    use std::sync::atomic::AtomicBool;

    fn params(policy: PixelPolicy) -> ProjectionParams {
        ProjectionParams {
            upper: BoundaryType::Ilm,
            lower: BoundaryType::Bm,
            scale: 1.0,
            policy,
        }
    }

    fn two_column_store() -> LayerBoundaryStore {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 2, 0.0039));
        s.set_range(0, BoundaryType::Ilm, 0, &[1.0, f64::NAN]).unwrap();
        s.set_range(0, BoundaryType::Bm, 0, &[3.0, 4.0]).unwrap();
        s
    }

    #[test]
    fn test_undefined_sample_is_excluded() {
        let store = two_column_store();
        let mut map = VecCorrespondenceMap::new(4, 4);
        map.push((1, 1), 0, 0);
        map.push((2, 3), 0, 1);

        let (field, stats) = project(&store, &map, &params(PixelPolicy::Average), None).unwrap();
        assert_eq!(field.get((1, 1)), Some(2.0));
        assert_eq!(field.get((2, 3)), None);
        assert_eq!(stats.skipped_undefined, 1);
        assert_eq!(stats.pixels_written, 1);

        let img = field.colorize(&ColormapHsv::new(10.0));
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(1, 1)[3], 255);
        assert_eq!(img.get_pixel(2, 3)[3], 0);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_collision_policies() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 2, 0.0039));
        store.set_range(0, BoundaryType::Ilm, 0, &[0.0, 0.0]).unwrap();
        store.set_range(0, BoundaryType::Bm, 0, &[2.0, 6.0]).unwrap();
        let mut map = VecCorrespondenceMap::new(1, 1);
        map.push((0, 0), 0, 0);
        map.push((0, 0), 0, 1);

        let (avg, stats) = project(&store, &map, &params(PixelPolicy::Average), None).unwrap();
        assert_eq!(avg.get((0, 0)), Some(4.0));
        assert_eq!(stats.collisions, 1);
        let (last, _) = project(&store, &map, &params(PixelPolicy::LastWrite), None).unwrap();
        assert_eq!(last.get((0, 0)), Some(6.0));
    }

    #[test]
    fn test_out_of_range_and_cancel() {
        let store = two_column_store();
        let mut map = VecCorrespondenceMap::new(2, 2);
        map.push((0, 0), 5, 0);
        map.push((0, 0), 0, 9);
        map.push((7, 7), 0, 0);
        let (field, stats) = project(&store, &map, &params(PixelPolicy::Average), None).unwrap();
        assert_eq!(stats.skipped_out_of_range, 3);
        assert_eq!(field.num_defined(), 0);

        let cancel = AtomicBool::new(true);
        assert!(project(&store, &map, &params(PixelPolicy::Average), Some(&cancel)).is_none());
    }
}
