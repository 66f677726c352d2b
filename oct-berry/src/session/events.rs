//! 会话向表现层发出的通知.

use crate::data::BoundaryType;
use crate::layer::edit::SegMethod;

/// 会话事件. 由表现层通过 [`MarkerSession::drain_events`](super::MarkerSession::drain_events) 取走.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkerEvent {
    /// 需要整幅重绘.
    FullRedrawRequested,

    /// 厚度图叠加层改变 (重新生成, 作废, 或显示状态改变).
    OverlayChanged,

    /// 撤销/重做的可用步数改变.
    UndoRedoChanged,

    /// 当前边界线类型改变.
    SegLineIdChanged(BoundaryType),

    /// 编辑方法改变.
    SegMethodChanged(SegMethod),

    /// 边界线显示状态改变.
    SegLineVisibleChanged(bool),
}
