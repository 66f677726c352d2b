//! 色表: 把厚度值映射为颜色.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// 可替换的色表.
pub trait Colormap: Send + Sync {
    /// `value` 对应的颜色. 无意义的值 (如 NaN) 返回透明.
    fn color_for(&self, value: f64) -> Rgba<u8>;

    /// 设置色表上限. 不小于上限的值映射为色表末端颜色.
    fn set_max_value(&mut self, max: f64);

    /// 色表上限.
    fn max_value(&self) -> f64;
}

/// 把 `value` 规范化到 `[0.0, 1.0]`.
///
/// 如果 `value` 无意义 (如 inf, NaN), 则返回 `None`.
fn normalize(value: f64, max: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    if value <= 0.0 || max <= 0.0 {
        Some(0.0)
    } else if value >= max {
        Some(1.0)
    } else {
        Some(value / max)
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    // 255, not 256.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// HSV 色环: 0 为蓝色, 上限为红色.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColormapHsv {
    max: f64,
}

impl ColormapHsv {
    /// 构建色表.
    pub fn new(max: f64) -> Self {
        Self { max }
    }

    /// 色相 `hue` (度), 饱和度与明度均为 1 时的 RGB.
    fn hue_to_rgb(hue: f64) -> [u8; 3] {
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        [channel(r), channel(g), channel(b)]
    }
}

impl Colormap for ColormapHsv {
    fn color_for(&self, value: f64) -> Rgba<u8> {
        match normalize(value, self.max) {
            Some(t) => {
                let [r, g, b] = Self::hue_to_rgb(240.0 * (1.0 - t));
                Rgba([r, g, b, u8::MAX])
            }
            None => Rgba(crate::consts::color::TRANSPARENT),
        }
    }

    #[inline]
    fn set_max_value(&mut self, max: f64) {
        self.max = max;
    }

    #[inline]
    fn max_value(&self) -> f64 {
        self.max
    }
}

/// 黑色到黄色的线性色表.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColormapYellow {
    max: f64,
}

impl ColormapYellow {
    /// 构建色表.
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl Colormap for ColormapYellow {
    fn color_for(&self, value: f64) -> Rgba<u8> {
        match normalize(value, self.max) {
            Some(t) => {
                let c = channel(t);
                Rgba([c, c, 0, u8::MAX])
            }
            None => Rgba(crate::consts::color::TRANSPARENT),
        }
    }

    #[inline]
    fn set_max_value(&mut self, max: f64) {
        self.max = max;
    }

    #[inline]
    fn max_value(&self) -> f64 {
        self.max
    }
}

/// 内置色表种类, 用于配置文件.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapKind {
    /// [`ColormapHsv`].
    #[default]
    Hsv,

    /// [`ColormapYellow`].
    Yellow,
}

impl ColormapKind {
    /// 以上限 `max` 构建色表.
    pub fn build(self, max: f64) -> Box<dyn Colormap> {
        match self {
            Self::Hsv => Box::new(ColormapHsv::new(max)),
            Self::Yellow => Box::new(ColormapYellow::new(max)),
        }
    }
}
