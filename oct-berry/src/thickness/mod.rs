//! 厚度图.
//!
//! 对当前 series 每个 B-scan 的一对边界线求差, 借助外部提供的空间对应表投影到参考 (眼底) 图像上,
//! 再通过色表着色成叠加层.

mod cache;
mod colormap;
mod correspondence;
mod field;
mod save;

pub use cache::ThicknessCache;
pub use colormap::{Colormap, ColormapHsv, ColormapKind, ColormapYellow};
pub use correspondence::{Correspondence, CorrespondenceMap, VecCorrespondenceMap};
pub use field::{project, PixelPolicy, ProjectionParams, ProjectionStats, ThicknessField};
pub use save::{compose_overlay, ImgWriteVis};
