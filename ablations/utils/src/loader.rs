//! 合成数据加载器. 生成 series 几何信息、默认边界线以及空间对应表.

use oct_berry::prelude::*;
use std::collections::HashMap;
use std::env;

/// 合成 series 的规模.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scale {
    /// B-scan 个数.
    pub scans: usize,

    /// 每个 B-scan 的列数.
    pub width: usize,

    /// 参考图像边长.
    pub image: u32,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            scans: 49,
            width: 512,
            image: 768,
        }
    }
}

/// 获取合成数据规模.
///
/// 1. 若环境变量 `$OCT_ABLATION_SCANS`, `$OCT_ABLATION_WIDTH`, `$OCT_ABLATION_IMAGE` 可解析, 则使用其值;
/// 2. 否则, 使用 [`Scale::default`].
pub fn scale_from_env_or_default() -> Scale {
    fn var<T: std::str::FromStr>(key: &str) -> Option<T> {
        env::var(key).ok()?.parse().ok()
    }

    let d = Scale::default();
    Scale {
        scans: var("OCT_ABLATION_SCANS").unwrap_or(d.scans),
        width: var("OCT_ABLATION_WIDTH").unwrap_or(d.width),
        image: var("OCT_ABLATION_IMAGE").unwrap_or(d.image),
    }
}

/// 深度分辨率 3.9 微米.
pub const DEPTH_MM: f64 = 0.0039;

/// 所有 B-scan 等宽的 series.
#[inline]
pub fn series(scale: Scale) -> SeriesInfo {
    SeriesInfo::uniform(scale.scans, scale.width, DEPTH_MM)
}

/// 正弦起伏的 ILM 与 BM. 每隔 `hole_every` 列留一个未定义采样, 为 0 时不留.
#[derive(Copy, Clone, Debug)]
pub struct WavyDefaults {
    width: usize,
    hole_every: usize,
}

impl WavyDefaults {
    /// 初始化.
    #[inline]
    pub fn new(width: usize, hole_every: usize) -> Self {
        Self { width, hole_every }
    }
}

impl DefaultBoundarySource for WavyDefaults {
    fn default_boundaries(&self, scan: ScanIdx) -> HashMap<BoundaryType, Vec<f64>> {
        let phase = scan as f64 * 0.1;
        let line = |base: f64, amp: f64| -> Vec<f64> {
            (0..self.width)
                .map(|c| {
                    if self.hole_every != 0 && c % self.hole_every == 0 {
                        UNDEFINED
                    } else {
                        base + amp * (c as f64 * 0.02 + phase).sin()
                    }
                })
                .collect()
        };
        HashMap::from([(BoundaryType::Ilm, line(120.0, 15.0)), (BoundaryType::Bm, line(190.0, 5.0))])
    }
}

/// 光栅扫描式的对应表: 参考图像的每一行对应一个 B-scan, 每个像素对应最近的列.
///
/// `overlap` 为相邻 B-scan 在参考图像上重叠的行数, 用来制造同一像素的多次写入.
pub fn raster_map(scale: Scale, overlap: u32) -> VecCorrespondenceMap {
    let mut map = VecCorrespondenceMap::new(scale.image, scale.image);
    if scale.scans == 0 || scale.width == 0 || scale.image == 0 {
        return map;
    }
    let rows_per_scan = (scale.image as usize).div_ceil(scale.scans);
    for scan in 0..scale.scans {
        let first = (scan * rows_per_scan) as u32;
        let last = ((scan + 1) * rows_per_scan) as u32 + overlap;
        for y in first..last.min(scale.image) {
            for x in 0..scale.image {
                let column = x as usize * scale.width / scale.image as usize;
                map.push((x, y), scan, column);
            }
        }
    }
    map
}
