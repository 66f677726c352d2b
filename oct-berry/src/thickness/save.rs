//! 叠加层的持久化存储与合成.

use super::{ColormapHsv, ThicknessField};
use image::{ImageResult, Rgba, RgbaImage};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于 [`ThicknessField`], 保存时以 HSV 色表着色, 色表上限为场中的最大厚度;
/// 对于 [`RgbaImage`] 叠加层, 按原样保存.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save_vis<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

impl ImgWriteVis for ThicknessField {
    fn save_vis<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let max = self.max().unwrap_or(1.0);
        self.colorize(&ColormapHsv::new(max)).save(path)
    }
}

impl ImgWriteVis for RgbaImage {
    #[inline]
    fn save_vis<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.save(path)
    }
}

/// 以 `alpha` 不透明度把叠加层合成到参考图像上. 叠加层的透明像素不改变参考图像.
///
/// 两者尺寸不一致时返回 `None`.
pub fn compose_overlay(reference: &RgbaImage, overlay: &RgbaImage, alpha: f64) -> Option<RgbaImage> {
    if reference.dimensions() != overlay.dimensions() {
        return None;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = reference.clone();
    for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
        let a = alpha * f64::from(src[3]) / 255.0;
        if a <= 0.0 {
            continue;
        }
        let mix = |d: u8, s: u8| (f64::from(d) * (1.0 - a) + f64::from(s) * a).round() as u8;
        *dst = Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), dst[3]]);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::compose_overlay;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_compose_skips_transparent() {
        let reference = RgbaImage::from_pixel(2, 1, Rgba([100, 100, 100, 255]));
        let mut overlay = RgbaImage::new(2, 1);
        overlay.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
        let out = compose_overlay(&reference, &overlay, 0.5).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgba([150, 50, 50, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgba([100, 100, 100, 255]));
        assert!(compose_overlay(&reference, &RgbaImage::new(1, 1), 0.5).is_none());
    }
}
