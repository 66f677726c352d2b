//! 自由绘制.

use super::{Button, EditContext, EditHandler, PointerEvent, Redraw};
use crate::data::UNDEFINED;
use crate::layer::{LineMirror, RangePatch};
use crate::session::Key;
use crate::MarkerResult;
use std::ops::Range;

/// 一笔绘制的中间状态.
#[derive(Clone, Debug)]
struct Stroke {
    mirror: LineMirror,
    last: (usize, f64),
    touched: Range<usize>,
    erase: bool,
}

/// 自由绘制工具.
///
/// 左键按下后沿鼠标轨迹写入深度值, 相邻两个事件之间线性插值; 右键 (若允许) 把经过的列擦除为未定义.
/// 松开鼠标时整笔作为一条撤销命令.
#[derive(Clone, Debug)]
pub struct PenTool {
    erase_on_secondary: bool,
    stroke: Option<Stroke>,
}

impl PenTool {
    /// 构建工具.
    pub fn new(erase_on_secondary: bool) -> Self {
        Self {
            erase_on_secondary,
            stroke: None,
        }
    }

    /// 是否正在绘制.
    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// 从 `from` 到 `to` (均含) 写入插值后的深度, 返回写入的列.
    fn paint(ctx: &mut EditContext<'_>, from: (usize, f64), to: (usize, f64), erase: bool) -> MarkerResult<Range<usize>> {
        let ((c0, d0), (c1, d1)) = if from.0 <= to.0 { (from, to) } else { (to, from) };
        let values: Vec<f64> = if erase {
            vec![UNDEFINED; c1 - c0 + 1]
        } else if c0 == c1 {
            vec![d1]
        } else {
            let span = (c1 - c0) as f64;
            (c0..=c1).map(|c| d0 + (d1 - d0) * (c - c0) as f64 / span).collect()
        };
        ctx.store.set_range(ctx.scan, ctx.kind, c0, &values)?;
        Ok(c0..c1 + 1)
    }
}

impl EditHandler for PenTool {
    fn mouse_press(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        let erase = match event.button {
            Button::Primary => false,
            Button::Secondary if self.erase_on_secondary => true,
            Button::Secondary => return Ok(Redraw::none()),
        };
        let Some(column) = event.clamped_column(ctx.width()?) else {
            return Ok(Redraw::none());
        };
        let mirror = LineMirror::capture(ctx.store, ctx.scan, ctx.kind)?;
        let point = (column, event.depth);
        let touched = Self::paint(ctx, point, point, erase)?;
        self.stroke = Some(Stroke {
            mirror,
            last: point,
            touched: touched.clone(),
            erase,
        });
        Ok(Redraw::columns(touched))
    }

    fn mouse_move(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        let Some(stroke) = self.stroke.as_mut() else {
            return Ok(Redraw::none());
        };
        let Some(column) = event.clamped_column(ctx.width()?) else {
            return Ok(Redraw::none());
        };
        let point = (column, event.depth);
        let written = Self::paint(ctx, stroke.last, point, stroke.erase)?;
        stroke.last = point;
        stroke.touched = stroke.touched.start.min(written.start)..stroke.touched.end.max(written.end);
        Ok(Redraw::columns(written))
    }

    fn mouse_release(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        if self.stroke.is_none() {
            return Ok(Redraw::none());
        }
        let mut redraw = self.mouse_move(ctx, event)?;
        let Some(stroke) = self.stroke.take() else {
            return Ok(redraw);
        };

        let range = stroke.touched;
        let old = stroke.mirror.range(range.clone()).unwrap_or_default().to_vec();
        let new = ctx.store.samples(ctx.scan, ctx.kind)?[range.clone()].to_vec();
        let changed = old.iter().zip(&new).any(|(a, b)| a.to_bits() != b.to_bits());
        if changed {
            ctx.undo.push_applied(RangePatch::new(ctx.scan, ctx.kind, range.start, old, new)?);
            redraw.needed = true;
        }
        Ok(redraw)
    }

    fn key_press(&mut self, ctx: &mut EditContext<'_>, key: Key) -> MarkerResult<bool> {
        // 绘制途中按 Esc 放弃这一笔.
        if key != Key::Escape {
            return Ok(false);
        }
        match self.stroke.take() {
            Some(stroke) => {
                stroke.mirror.restore(ctx.store, ctx.scan, ctx.kind)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn reset(&mut self) {
        self.stroke = None;
    }
}

#[cfg(test)]
mod tests {
    use super::PenTool;
    use crate::data::{BoundaryType, SeriesInfo};
    use crate::layer::edit::{Button, EditContext, EditHandler, PointerEvent};
    use crate::layer::{EditCommandStack, LayerBoundaryStore};

    fn ev(column: f64, depth: f64, button: Button) -> PointerEvent {
        PointerEvent::new(column, depth, button)
    }

    #[test]
    fn test_stroke_interpolates_and_records_one_command() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 10, 0.0039));
        let mut undo = EditCommandStack::new();
        let mut pen = PenTool::new(true);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Ilm,
        };
        pen.mouse_press(&mut ctx, ev(2.0, 10.0, Button::Primary)).unwrap();
        pen.mouse_move(&mut ctx, ev(4.0, 14.0, Button::Primary)).unwrap();
        pen.mouse_release(&mut ctx, ev(6.0, 14.0, Button::Primary)).unwrap();

        let line = store.samples(0, BoundaryType::Ilm).unwrap();
        assert_eq!(&line[2..7], &[10.0, 12.0, 14.0, 14.0, 14.0]);
        assert!(line[1].is_nan() && line[7].is_nan());
        assert_eq!(undo.num_undo_steps(), 1);

        undo.undo(&mut store).unwrap();
        assert!(store.samples(0, BoundaryType::Ilm).unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_secondary_erases() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 5, 0.0039));
        store.set_range(0, BoundaryType::Bm, 0, &[1.0; 5]).unwrap();
        let mut undo = EditCommandStack::new();
        let mut pen = PenTool::new(true);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Bm,
        };
        pen.mouse_press(&mut ctx, ev(1.0, 0.0, Button::Secondary)).unwrap();
        pen.mouse_release(&mut ctx, ev(3.0, 0.0, Button::Secondary)).unwrap();
        let line = store.samples(0, BoundaryType::Bm).unwrap();
        assert_eq!(line[0], 1.0);
        assert!(line[1..4].iter().all(|v| v.is_nan()));
        assert_eq!(line[4], 1.0);
    }

    #[test]
    fn test_pointer_outside_is_clamped() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 3, 0.0039));
        let mut undo = EditCommandStack::new();
        let mut pen = PenTool::new(false);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Ilm,
        };
        pen.mouse_press(&mut ctx, ev(-5.0, 1.0, Button::Primary)).unwrap();
        pen.mouse_release(&mut ctx, ev(50.0, 1.0, Button::Primary)).unwrap();
        assert_eq!(store.samples(0, BoundaryType::Ilm).unwrap(), &[1.0, 1.0, 1.0]);
    }
}
