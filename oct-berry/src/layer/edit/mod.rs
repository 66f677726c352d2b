//! 交互式边界线编辑方法.
//!
//! 编辑方法是一个封闭的枚举 [`EditTool`], 通过 [`EditHandler`] 的四个入口分发鼠标与键盘事件.
//! 每次编辑完成后, 修改以 [`RangePatch`](super::RangePatch) 的形式压入撤销栈.

mod pen;
mod spline;

pub use pen::PenTool;
pub use spline::SplineTool;

use super::{EditCommandStack, LayerBoundaryStore};
use crate::data::BoundaryType;
use crate::options::EditOptions;
use crate::session::Key;
use crate::{MarkerResult, ScanIdx};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 编辑方法.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegMethod {
    /// 不编辑.
    None,

    /// 自由绘制.
    #[default]
    Pen,

    /// 控制点样条.
    Spline,
}

/// 鼠标按键.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// 左键.
    Primary,

    /// 右键.
    Secondary,
}

/// B-scan 坐标系中的鼠标事件. `column` 为列, `depth` 为深度方向像素坐标.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// 列坐标.
    pub column: f64,

    /// 深度坐标.
    pub depth: f64,

    /// 按下的按键.
    pub button: Button,
}

impl PointerEvent {
    /// 构建事件.
    #[inline]
    pub fn new(column: f64, depth: f64, button: Button) -> Self {
        Self { column, depth, button }
    }

    /// 将列坐标取整并限制在 `[0, width)`. 宽度为 0 时返回 `None`.
    #[inline]
    pub(crate) fn clamped_column(&self, width: usize) -> Option<usize> {
        if width == 0 || !self.column.is_finite() {
            return None;
        }
        Some(self.column.round().clamp(0.0, (width - 1) as f64) as usize)
    }
}

/// 事件处理后的重绘请求.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Redraw {
    /// 是否需要重绘.
    pub needed: bool,

    /// 被修改的列. `None` 表示整幅重绘.
    pub columns: Option<Range<usize>>,
}

impl Redraw {
    /// 不需要重绘.
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// 整幅重绘.
    #[inline]
    pub fn full() -> Self {
        Self {
            needed: true,
            columns: None,
        }
    }

    /// 只重绘部分列.
    #[inline]
    pub fn columns(columns: Range<usize>) -> Self {
        Self {
            needed: true,
            columns: Some(columns),
        }
    }
}

/// 编辑时可访问的状态: 当前 B-scan 的当前边界线, 以及撤销栈.
pub struct EditContext<'a> {
    /// 边界线存储.
    pub store: &'a mut LayerBoundaryStore,

    /// 撤销栈.
    pub undo: &'a mut EditCommandStack,

    /// 当前 B-scan.
    pub scan: ScanIdx,

    /// 当前边界线类型.
    pub kind: BoundaryType,
}

impl EditContext<'_> {
    /// 当前 B-scan 的宽度.
    pub(crate) fn width(&self) -> MarkerResult<usize> {
        Ok(self.store.scan(self.scan)?.width())
    }
}

/// 编辑方法的事件入口.
pub trait EditHandler {
    /// 鼠标按下.
    fn mouse_press(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw>;

    /// 鼠标移动.
    fn mouse_move(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw>;

    /// 鼠标松开.
    fn mouse_release(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw>;

    /// 按键. 返回该按键是否被消费.
    fn key_press(&mut self, ctx: &mut EditContext<'_>, key: Key) -> MarkerResult<bool>;

    /// 当前 B-scan 或边界线类型改变, 或撤销栈改变了边界线. 丢弃未完成的编辑状态.
    fn reset(&mut self);
}

/// 当前编辑方法及其状态.
#[derive(Clone, Debug)]
pub enum EditTool {
    /// 不编辑.
    None,

    /// 自由绘制.
    Pen(PenTool),

    /// 控制点样条.
    Spline(SplineTool),
}

impl EditTool {
    /// 按 `method` 构建编辑方法.
    pub fn new(method: SegMethod, options: &EditOptions) -> Self {
        match method {
            SegMethod::None => Self::None,
            SegMethod::Pen => Self::Pen(PenTool::new(options.pen_erase_on_secondary)),
            SegMethod::Spline => Self::Spline(SplineTool::new(options.spline_pick_radius)),
        }
    }

    /// 当前编辑方法.
    #[inline]
    pub fn method(&self) -> SegMethod {
        match self {
            Self::None => SegMethod::None,
            Self::Pen(_) => SegMethod::Pen,
            Self::Spline(_) => SegMethod::Spline,
        }
    }
}

impl EditHandler for EditTool {
    fn mouse_press(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        match self {
            Self::None => Ok(Redraw::none()),
            Self::Pen(t) => t.mouse_press(ctx, event),
            Self::Spline(t) => t.mouse_press(ctx, event),
        }
    }

    fn mouse_move(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        match self {
            Self::None => Ok(Redraw::none()),
            Self::Pen(t) => t.mouse_move(ctx, event),
            Self::Spline(t) => t.mouse_move(ctx, event),
        }
    }

    fn mouse_release(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        match self {
            Self::None => Ok(Redraw::none()),
            Self::Pen(t) => t.mouse_release(ctx, event),
            Self::Spline(t) => t.mouse_release(ctx, event),
        }
    }

    fn key_press(&mut self, ctx: &mut EditContext<'_>, key: Key) -> MarkerResult<bool> {
        match self {
            Self::None => Ok(false),
            Self::Pen(t) => t.key_press(ctx, key),
            Self::Spline(t) => t.key_press(ctx, key),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::None => {}
            Self::Pen(t) => t.reset(),
            Self::Spline(t) => t.reset(),
        }
    }
}
