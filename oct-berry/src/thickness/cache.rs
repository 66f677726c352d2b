//! 厚度图叠加层缓存.

use super::{ProjectionStats, ThicknessField};
use crate::data::BoundaryType;
use image::RgbaImage;

/// 最近一次生成的厚度图叠加层.
///
/// 输入改变 (series 改变, 或编辑触及了生成时的边界线对) 时需调用 [`Self::invalidate`].
/// 作废后旧图仍可显示, 直到重新生成.
#[derive(Clone, Debug, Default)]
pub struct ThicknessCache {
    image: Option<RgbaImage>,
    field: Option<ThicknessField>,
    stats: ProjectionStats,
    pair: Option<(BoundaryType, BoundaryType)>,
    stale: bool,
}

impl ThicknessCache {
    /// 空缓存.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 存入新生成的结果.
    pub fn store(&mut self, image: RgbaImage, field: ThicknessField, stats: ProjectionStats, pair: (BoundaryType, BoundaryType)) {
        self.image = Some(image);
        self.field = Some(field);
        self.stats = stats;
        self.pair = Some(pair);
        self.stale = false;
    }

    /// 叠加层图像.
    #[inline]
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// 叠加层对应的厚度场.
    #[inline]
    pub fn field(&self) -> Option<&ThicknessField> {
        self.field.as_ref()
    }

    /// 生成时的统计.
    #[inline]
    pub fn stats(&self) -> ProjectionStats {
        self.stats
    }

    /// 生成时使用的 `(上边界, 下边界)`.
    #[inline]
    pub fn pair(&self) -> Option<(BoundaryType, BoundaryType)> {
        self.pair
    }

    /// 是否已作废.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// 编辑 `kind` 是否影响缓存的结果.
    #[inline]
    pub fn depends_on(&self, kind: BoundaryType) -> bool {
        self.pair.is_some_and(|(u, l)| u == kind || l == kind)
    }

    /// 标记为作废.
    #[inline]
    pub fn invalidate(&mut self) {
        if self.image.is_some() {
            self.stale = true;
        }
    }

    /// 丢弃全部内容. 用于 series 改变.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::ThicknessCache;
    use crate::data::BoundaryType;
    use crate::thickness::{ProjectionStats, ThicknessField};
    use image::RgbaImage;

    #[test]
    fn test_invalidate_keeps_image() {
        let mut c = ThicknessCache::new();
        c.invalidate();
        assert!(!c.is_stale());
        c.store(
            RgbaImage::new(2, 2),
            ThicknessField::new(2, 2),
            ProjectionStats::default(),
            (BoundaryType::Ilm, BoundaryType::Bm),
        );
        assert!(c.depends_on(BoundaryType::Bm));
        assert!(!c.depends_on(BoundaryType::Nfl));
        c.invalidate();
        assert!(c.is_stale());
        assert!(c.image().is_some());
        c.clear();
        assert!(c.image().is_none());
    }
}
