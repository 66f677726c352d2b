//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Pixel, ScanIdx};

pub use crate::{BoundaryType, SeriesInfo, UNDEFINED};
pub use crate::{DocumentError, MarkerError, MarkerResult, MissingCollaborator};

pub use crate::interval::{CollectionRegistry, DiscreteInterval, IntervalLabel, IntervalLabelStore};

pub use crate::layer::edit::{Button, PointerEvent, Redraw, SegMethod};
pub use crate::layer::{DefaultBoundarySource, EditCommandStack, LayerBoundaryStore, NoDefaults};

pub use crate::thickness::{
    Colormap, ColormapKind, CorrespondenceMap, ImgWriteVis, PixelPolicy, ProjectionParams, ThicknessField,
    VecCorrespondenceMap,
};

pub use crate::codec::{MarkerFileFormat, SeriesIds};
pub use crate::ptree::PTree;

pub use crate::options::Options;
pub use crate::session::{Key, MarkerEvent, MarkerSession};
