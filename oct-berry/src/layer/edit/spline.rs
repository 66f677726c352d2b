//! 控制点样条.

use super::{Button, EditContext, EditHandler, PointerEvent, Redraw};
use crate::fitting::cubic_spline_eval_f64;
use crate::layer::LineMirror;
use crate::session::Key;
use crate::MarkerResult;
use ndarray::Array1;
use std::collections::BTreeMap;
use std::ops::Range;

/// 控制点样条工具.
///
/// 左键单击空白处添加控制点, 单击已有控制点则选中并可拖动; 右键单击或按 Delete 删除控制点;
/// Esc 丢弃所有控制点. 控制点每次变化都会把曲线重新渲染进边界线, 作为一条撤销命令.
///
/// 两个控制点之间用直线, 三个及以上用自然三次样条. 曲线只覆盖首末控制点之间的列,
/// 范围缩小时让出的列恢复为第一个控制点放下前的原值.
#[derive(Clone, Debug)]
pub struct SplineTool {
    pick_radius: f64,
    points: BTreeMap<usize, f64>,
    selected: Option<usize>,
    dragging: bool,
    base: Option<LineMirror>,
    rendered: Option<Range<usize>>,
}

impl SplineTool {
    /// 构建工具. `pick_radius` 为选中控制点的像素半径.
    pub fn new(pick_radius: f64) -> Self {
        Self {
            pick_radius,
            points: BTreeMap::new(),
            selected: None,
            dragging: false,
            base: None,
            rendered: None,
        }
    }

    /// 当前所有控制点 `(列, 深度)`, 按列升序.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.points.iter().map(|(&c, &d)| (c, d))
    }

    /// 当前选中的控制点所在列.
    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// 离 `event` 最近且在选取半径内的控制点.
    fn pick(&self, event: &PointerEvent) -> Option<usize> {
        self.points
            .iter()
            .map(|(&c, &d)| (c, (c as f64 - event.column).hypot(d - event.depth)))
            .filter(|&(_, dist)| dist <= self.pick_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    /// 按当前控制点计算首末控制点之间每一列的深度.
    fn curve(&self) -> Option<(Range<usize>, Vec<f64>)> {
        let (&first, _) = self.points.first_key_value()?;
        let (&last, _) = self.points.last_key_value()?;
        let range = first..last + 1;
        let values = match self.points.len() {
            1 | 2 => {
                let (d0, d1) = (self.points[&first], self.points[&last]);
                let span = (last - first).max(1) as f64;
                range.clone().map(|c| d0 + (d1 - d0) * (c - first) as f64 / span).collect()
            }
            _ => {
                let x: Array1<f64> = self.points.keys().map(|&c| c as f64).collect();
                let y: Array1<f64> = self.points.values().copied().collect();
                cubic_spline_eval_f64(x.view(), y.view(), range.clone().map(|c| c as f64))?
            }
        };
        Some((range, values))
    }

    /// 把曲线渲染进边界线并压入撤销栈, 返回改动的列.
    fn commit(&mut self, ctx: &mut EditContext<'_>) -> MarkerResult<Redraw> {
        if self.base.is_none() {
            self.base = Some(LineMirror::capture(ctx.store, ctx.scan, ctx.kind)?);
        }
        let Some(base) = self.base.as_ref() else {
            return Ok(Redraw::none());
        };
        let curve = self.curve();

        let new_range = curve.as_ref().map(|(r, _)| r.clone());
        let union = match (self.rendered.clone(), new_range.clone()) {
            (None, None) => return Ok(Redraw::full()),
            (Some(r), None) | (None, Some(r)) => r,
            (Some(a), Some(b)) => a.start.min(b.start)..a.end.max(b.end),
        };
        let values: Vec<f64> = union
            .clone()
            .map(|c| match &curve {
                Some((r, v)) if r.contains(&c) => v[c - r.start],
                _ => base.0.get(c).copied().unwrap_or(f64::NAN),
            })
            .collect();

        ctx.undo.patch(ctx.store, ctx.scan, ctx.kind, union.start, values)?;
        self.rendered = new_range;
        Ok(Redraw::columns(union))
    }

    fn remove(&mut self, ctx: &mut EditContext<'_>, column: usize) -> MarkerResult<Redraw> {
        self.points.remove(&column);
        if self.selected == Some(column) {
            self.selected = None;
        }
        self.commit(ctx)
    }
}

impl EditHandler for SplineTool {
    fn mouse_press(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        let Some(column) = event.clamped_column(ctx.width()?) else {
            return Ok(Redraw::none());
        };
        match (event.button, self.pick(&event)) {
            (Button::Primary, Some(picked)) => {
                self.selected = Some(picked);
                self.dragging = true;
                Ok(Redraw::full())
            }
            (Button::Primary, None) => {
                self.points.insert(column, event.depth);
                self.selected = Some(column);
                self.commit(ctx)
            }
            (Button::Secondary, Some(picked)) => self.remove(ctx, picked),
            (Button::Secondary, None) => Ok(Redraw::none()),
        }
    }

    fn mouse_move(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        if !self.dragging {
            return Ok(Redraw::none());
        }
        let (Some(from), Some(to)) = (self.selected, event.clamped_column(ctx.width()?)) else {
            return Ok(Redraw::none());
        };
        // 目标列已有其他控制点时不移动.
        if to != from && self.points.contains_key(&to) {
            return Ok(Redraw::none());
        }
        // 拖动过程中只移动控制点, 松开时才写入边界线.
        self.points.remove(&from);
        self.points.insert(to, event.depth);
        self.selected = Some(to);
        Ok(Redraw::full())
    }

    fn mouse_release(&mut self, ctx: &mut EditContext<'_>, event: PointerEvent) -> MarkerResult<Redraw> {
        if !self.dragging {
            return Ok(Redraw::none());
        }
        self.mouse_move(ctx, event)?;
        self.dragging = false;
        self.commit(ctx)
    }

    fn key_press(&mut self, ctx: &mut EditContext<'_>, key: Key) -> MarkerResult<bool> {
        match key {
            Key::Delete => match self.selected {
                Some(column) => {
                    self.remove(ctx, column)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            Key::Escape => {
                let had_points = !self.points.is_empty();
                self.reset();
                Ok(had_points)
            }
            _ => Ok(false),
        }
    }

    fn reset(&mut self) {
        self.points.clear();
        self.selected = None;
        self.dragging = false;
        self.base = None;
        self.rendered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::SplineTool;
    use crate::data::{BoundaryType, SeriesInfo};
    use crate::layer::edit::{Button, EditContext, EditHandler, PointerEvent};
    use crate::layer::{EditCommandStack, LayerBoundaryStore};
    use crate::session::Key;

    fn click(tool: &mut SplineTool, ctx: &mut EditContext<'_>, column: f64, depth: f64, button: Button) {
        let ev = PointerEvent::new(column, depth, button);
        tool.mouse_press(ctx, ev).unwrap();
        tool.mouse_release(ctx, ev).unwrap();
    }

    #[test]
    fn test_two_points_render_line() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 10, 0.0039));
        let mut undo = EditCommandStack::new();
        let mut tool = SplineTool::new(2.0);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Ilm,
        };
        click(&mut tool, &mut ctx, 2.0, 10.0, Button::Primary);
        click(&mut tool, &mut ctx, 6.0, 18.0, Button::Primary);
        let line = store.samples(0, BoundaryType::Ilm).unwrap();
        assert_eq!(&line[2..7], &[10.0, 12.0, 14.0, 16.0, 18.0]);
        assert!(line[7].is_nan());
        assert_eq!(undo.num_undo_steps(), 2);
    }

    #[test]
    fn test_three_points_pass_through_knots() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 20, 0.0039));
        let mut undo = EditCommandStack::new();
        let mut tool = SplineTool::new(1.0);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Bm,
        };
        click(&mut tool, &mut ctx, 0.0, 5.0, Button::Primary);
        click(&mut tool, &mut ctx, 10.0, 9.0, Button::Primary);
        click(&mut tool, &mut ctx, 19.0, 4.0, Button::Primary);
        let line = store.samples(0, BoundaryType::Bm).unwrap();
        assert!((line[0] - 5.0).abs() < 1e-9);
        assert!((line[10] - 9.0).abs() < 1e-9);
        assert!((line[19] - 4.0).abs() < 1e-9);
        assert!(line.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_remove_restores_base() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 8, 0.0039));
        store.set_range(0, BoundaryType::Ilm, 0, &[1.0; 8]).unwrap();
        let mut undo = EditCommandStack::new();
        let mut tool = SplineTool::new(1.0);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Ilm,
        };
        click(&mut tool, &mut ctx, 1.0, 3.0, Button::Primary);
        click(&mut tool, &mut ctx, 5.0, 3.0, Button::Primary);
        click(&mut tool, &mut ctx, 5.0, 3.0, Button::Secondary);
        assert_eq!(tool.selected(), None);
        // 选中剩下的控制点后删除.
        click(&mut tool, &mut ctx, 1.0, 3.0, Button::Primary);
        assert_eq!(tool.selected(), Some(1));
        assert!(tool.key_press(&mut ctx, Key::Delete).unwrap());
        assert_eq!(tool.points().count(), 0);
        assert_eq!(store.samples(0, BoundaryType::Ilm).unwrap(), &[1.0; 8]);
    }

    #[test]
    fn test_drag_moves_point() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 8, 0.0039));
        let mut undo = EditCommandStack::new();
        let mut tool = SplineTool::new(1.5);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Ilm,
        };
        click(&mut tool, &mut ctx, 3.0, 4.0, Button::Primary);
        tool.mouse_press(&mut ctx, PointerEvent::new(3.0, 4.0, Button::Primary)).unwrap();
        tool.mouse_move(&mut ctx, PointerEvent::new(4.0, 6.0, Button::Primary)).unwrap();
        tool.mouse_release(&mut ctx, PointerEvent::new(5.0, 7.0, Button::Primary)).unwrap();
        assert_eq!(tool.points().collect::<Vec<_>>(), vec![(5, 7.0)]);
        let line = store.samples(0, BoundaryType::Ilm).unwrap();
        assert!(line[3].is_nan());
        assert_eq!(line[5], 7.0);
    }

    #[test]
    fn test_drag_onto_other_point_keeps_both() {
        let mut store = LayerBoundaryStore::new(&SeriesInfo::uniform(1, 8, 0.0039));
        let mut undo = EditCommandStack::new();
        let mut tool = SplineTool::new(1.5);
        let mut ctx = EditContext {
            store: &mut store,
            undo: &mut undo,
            scan: 0,
            kind: BoundaryType::Ilm,
        };
        click(&mut tool, &mut ctx, 2.0, 4.0, Button::Primary);
        click(&mut tool, &mut ctx, 6.0, 10.0, Button::Primary);
        tool.mouse_press(&mut ctx, PointerEvent::new(2.0, 4.0, Button::Primary)).unwrap();
        tool.mouse_move(&mut ctx, PointerEvent::new(4.0, 5.0, Button::Primary)).unwrap();
        tool.mouse_move(&mut ctx, PointerEvent::new(6.0, 20.0, Button::Primary)).unwrap();
        tool.mouse_release(&mut ctx, PointerEvent::new(6.0, 20.0, Button::Primary)).unwrap();
        assert_eq!(tool.points().collect::<Vec<_>>(), vec![(4, 5.0), (6, 10.0)]);
        let line = store.samples(0, BoundaryType::Ilm).unwrap();
        assert_eq!(line[6], 10.0);
    }
}
