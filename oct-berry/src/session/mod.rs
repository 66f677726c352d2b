//! 标注会话.
//!
//! 每加载一个 series 就对应一个 [`MarkerSession`], 它拥有全部标注存储、撤销栈、
//! 当前编辑方法以及厚度图缓存. 表现层把鼠标与键盘事件交给会话,
//! 再通过 [`MarkerSession::drain_events`] 取走需要处理的通知.

mod events;
mod keys;

pub use events::MarkerEvent;
pub use keys::{Key, KeyAction};

use crate::codec::{self, LoadReport, MarkerFileFormat, SeriesIds};
use crate::consts::keys as doc_keys;
use crate::data::{BoundaryType, SeriesInfo};
use crate::interval::{CollectionRegistry, IntervalLabel, IntervalLabelStore};
use crate::layer::edit::{EditContext, EditHandler, EditTool, PointerEvent, Redraw, SegMethod};
use crate::layer::{DefaultBoundarySource, EditCommandStack, LayerBoundaryStore};
use crate::ptree::PTree;
use crate::thickness::{project, Colormap, CorrespondenceMap, ProjectionParams, ThicknessCache};
use crate::{DocumentError, MarkerResult, MissingCollaborator, Options, ScanIdx};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

/// 一个 series 的标注会话.
pub struct MarkerSession {
    series: SeriesInfo,
    options: Options,
    intervals: IntervalLabelStore,
    layers: LayerBoundaryStore,
    undo: EditCommandStack,
    defaults: Box<dyn DefaultBoundarySource>,
    correspondence: Option<Box<dyn CorrespondenceMap>>,
    colormap: Option<Box<dyn Colormap>>,
    thickness: ThicknessCache,
    act_scan: ScanIdx,
    act_type: BoundaryType,
    tool: EditTool,
    lines_visible: bool,
    overlay_visible: bool,
    marker_file: Option<(PathBuf, SeriesIds)>,
    events: VecDeque<MarkerEvent>,
}

impl MarkerSession {
    /// 为 `series` 新建会话. 色表按 `options` 构建, 空间对应表需另行设置.
    pub fn new(
        series: SeriesInfo,
        options: Options,
        registry: CollectionRegistry,
        defaults: Box<dyn DefaultBoundarySource>,
    ) -> Self {
        let t = &options.thickness;
        let colormap = Some(t.colormap.build(t.max_value));
        Self {
            intervals: IntervalLabelStore::new(registry, series.num_scans()),
            layers: LayerBoundaryStore::new(&series),
            undo: EditCommandStack::new(),
            defaults,
            correspondence: None,
            colormap,
            thickness: ThicknessCache::new(),
            act_scan: 0,
            act_type: BoundaryType::Ilm,
            tool: EditTool::new(options.edit.default_method, &options.edit),
            lines_visible: true,
            overlay_visible: false,
            marker_file: None,
            events: VecDeque::new(),
            series,
            options,
        }
    }

    /// 切换到新的 series. 丢弃全部标注、撤销历史、空间对应表与厚度图.
    ///
    /// 开启 [`Options::autosave`] 时, 未保存的修改先写回最近一次读写的标注文件.
    /// 写入失败时返回错误, 会话保持不变.
    pub fn new_series_loaded(
        &mut self,
        series: SeriesInfo,
        defaults: Box<dyn DefaultBoundarySource>,
    ) -> Result<(), DocumentError> {
        if self.options.autosave && self.has_changed_since_last_save() {
            match self.marker_file.take() {
                Some((path, ids)) => {
                    let saved = self.save_file(&path, &ids, None);
                    self.marker_file = Some((path, ids));
                    saved?;
                }
                None => log::warn!("没有关联的标注文件, 未保存的修改被丢弃"),
            }
        }
        log::debug!("新 series: {} 个 B-scan", series.num_scans());
        let registry = self.intervals.registry().clone();
        self.intervals = IntervalLabelStore::new(registry, series.num_scans());
        self.layers = LayerBoundaryStore::new(&series);
        self.undo.clear();
        self.defaults = defaults;
        self.correspondence = None;
        self.thickness.clear();
        self.act_scan = 0;
        self.tool.reset();
        self.series = series;
        self.marker_file = None;
        self.events.push_back(MarkerEvent::OverlayChanged);
        self.events.push_back(MarkerEvent::UndoRedoChanged);
        self.events.push_back(MarkerEvent::FullRedrawRequested);
        Ok(())
    }

    /// 当前 series.
    #[inline]
    pub fn series(&self) -> &SeriesInfo {
        &self.series
    }

    /// 运行选项.
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// 区间标记.
    #[inline]
    pub fn intervals(&self) -> &IntervalLabelStore {
        &self.intervals
    }

    /// 分层边界线.
    #[inline]
    pub fn layers(&self) -> &LayerBoundaryStore {
        &self.layers
    }

    /// 撤销栈.
    #[inline]
    pub fn undo_stack(&self) -> &EditCommandStack {
        &self.undo
    }

    /// 厚度图缓存.
    #[inline]
    pub fn thickness(&self) -> &ThicknessCache {
        &self.thickness
    }

    /// 需要显示的厚度图叠加层.
    #[inline]
    pub fn overlay(&self) -> Option<&image::RgbaImage> {
        self.thickness.image().filter(|_| self.overlay_visible)
    }

    /// 当前 B-scan.
    #[inline]
    pub fn act_scan(&self) -> ScanIdx {
        self.act_scan
    }

    /// 当前边界线类型.
    #[inline]
    pub fn act_boundary_type(&self) -> BoundaryType {
        self.act_type
    }

    /// 当前编辑方法.
    #[inline]
    pub fn seg_method(&self) -> SegMethod {
        self.tool.method()
    }

    /// 边界线是否显示.
    #[inline]
    pub fn lines_visible(&self) -> bool {
        self.lines_visible
    }

    /// 设置空间对应表. 旧的厚度图作废.
    pub fn set_correspondence_map(&mut self, map: Option<Box<dyn CorrespondenceMap>>) {
        self.correspondence = map;
        self.invalidate_thickness();
    }

    /// 设置色表. `None` 表示不生成厚度图.
    pub fn set_colormap(&mut self, colormap: Option<Box<dyn Colormap>>) {
        self.colormap = colormap;
    }

    /// 设置色表上限. 上限改变时旧的厚度图作废. 没有色表时只记录到选项中.
    pub fn set_colormap_max(&mut self, max: f64) {
        self.options.thickness.max_value = max;
        let Some(colormap) = self.colormap.as_deref_mut() else {
            return;
        };
        if colormap.max_value() != max {
            colormap.set_max_value(max);
            self.invalidate_thickness();
        }
    }

    /// 取走所有待处理的事件.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MarkerEvent> + '_ {
        self.events.drain(..)
    }

    /// 切换当前 B-scan, 必要时从默认数据源填充.
    pub fn choose_scan(&mut self, scan: ScanIdx) -> MarkerResult<()> {
        self.layers.ensure_filled(scan, &*self.defaults)?;
        if scan != self.act_scan {
            self.act_scan = scan;
            self.tool.reset();
        }
        self.events.push_back(MarkerEvent::FullRedrawRequested);
        Ok(())
    }

    /// 切换当前边界线类型.
    pub fn set_act_boundary_type(&mut self, kind: BoundaryType) {
        if kind == self.act_type {
            return;
        }
        self.act_type = kind;
        self.tool.reset();
        self.events.push_back(MarkerEvent::SegLineIdChanged(kind));
        self.events.push_back(MarkerEvent::FullRedrawRequested);
    }

    /// 按 [`BoundaryType::ALL`] 中的位置切换当前边界线类型.
    pub fn change_seg_line_id(&mut self, index: usize) -> bool {
        match BoundaryType::from_index(index) {
            Some(kind) => {
                self.set_act_boundary_type(kind);
                true
            }
            None => false,
        }
    }

    /// 切换编辑方法. 未完成的编辑被丢弃.
    pub fn set_seg_method(&mut self, method: SegMethod) {
        if method == self.tool.method() {
            return;
        }
        self.tool = EditTool::new(method, &self.options.edit);
        self.events.push_back(MarkerEvent::SegMethodChanged(method));
    }

    /// 显示/隐藏边界线.
    pub fn set_lines_visible(&mut self, visible: bool) {
        if visible == self.lines_visible {
            return;
        }
        self.lines_visible = visible;
        self.events.push_back(MarkerEvent::SegLineVisibleChanged(visible));
        self.events.push_back(MarkerEvent::FullRedrawRequested);
    }

    /// 显示/隐藏厚度图叠加层.
    pub fn set_overlay_visible(&mut self, visible: bool) {
        if visible == self.overlay_visible {
            return;
        }
        self.overlay_visible = visible;
        self.events.push_back(MarkerEvent::OverlayChanged);
    }

    fn invalidate_thickness(&mut self) {
        if self.thickness.image().is_some() {
            self.thickness.invalidate();
            self.events.push_back(MarkerEvent::OverlayChanged);
        }
    }

    /// 把事件交给当前编辑方法. 撤销栈改变时发出通知, 并在必要时作废厚度图.
    fn dispatch<R>(&mut self, f: impl FnOnce(&mut EditTool, &mut EditContext<'_>) -> MarkerResult<R>) -> MarkerResult<R> {
        self.layers.ensure_filled(self.act_scan, &*self.defaults)?;
        let before = (self.undo.num_undo_steps(), self.undo.num_redo_steps());
        let mut ctx = EditContext {
            store: &mut self.layers,
            undo: &mut self.undo,
            scan: self.act_scan,
            kind: self.act_type,
        };
        let ans = f(&mut self.tool, &mut ctx)?;

        if before != (self.undo.num_undo_steps(), self.undo.num_redo_steps()) {
            self.events.push_back(MarkerEvent::UndoRedoChanged);
            if self.thickness.depends_on(self.act_type) {
                self.invalidate_thickness();
            }
        }
        Ok(ans)
    }

    /// 鼠标按下. 边界线隐藏时不编辑.
    pub fn mouse_press(&mut self, event: PointerEvent) -> MarkerResult<Redraw> {
        if !self.lines_visible {
            return Ok(Redraw::none());
        }
        self.dispatch(|tool, ctx| tool.mouse_press(ctx, event))
    }

    /// 鼠标移动. 边界线隐藏时不编辑.
    pub fn mouse_move(&mut self, event: PointerEvent) -> MarkerResult<Redraw> {
        if !self.lines_visible {
            return Ok(Redraw::none());
        }
        self.dispatch(|tool, ctx| tool.mouse_move(ctx, event))
    }

    /// 鼠标松开.
    pub fn mouse_release(&mut self, event: PointerEvent) -> MarkerResult<Redraw> {
        self.dispatch(|tool, ctx| tool.mouse_release(ctx, event))
    }

    /// 按键. 先交给编辑方法, 未被消费时按快捷键表处理. 返回按键是否被处理.
    pub fn key_press(&mut self, key: Key) -> MarkerResult<bool> {
        if self.dispatch(|tool, ctx| tool.key_press(ctx, key))? {
            self.events.push_back(MarkerEvent::FullRedrawRequested);
            return Ok(true);
        }

        let Some(action) = KeyAction::resolve(key, &self.options.keys) else {
            return Ok(false);
        };
        match action {
            KeyAction::SelectBoundary(kind) => self.set_act_boundary_type(kind),
            KeyAction::SetMethod(method) => self.set_seg_method(method),
            KeyAction::ToggleLines => self.set_lines_visible(!self.lines_visible),
            KeyAction::GenerateThickness => {
                if let Err(e) = self.generate_thickness_map(None) {
                    log::info!("{e}, 不生成厚度图");
                }
            }
        }
        Ok(true)
    }

    fn after_history(&mut self, kind: BoundaryType) {
        self.tool.reset();
        self.events.push_back(MarkerEvent::UndoRedoChanged);
        self.events.push_back(MarkerEvent::FullRedrawRequested);
        if self.thickness.depends_on(kind) {
            self.invalidate_thickness();
        }
    }

    /// 撤销一步. 返回是否有可撤销的命令.
    pub fn undo(&mut self) -> MarkerResult<bool> {
        let Some(kind) = self.undo.undo(&mut self.layers)?.map(|p| p.kind()) else {
            return Ok(false);
        };
        self.after_history(kind);
        Ok(true)
    }

    /// 重做一步. 返回是否有可重做的命令.
    pub fn redo(&mut self) -> MarkerResult<bool> {
        let Some(kind) = self.undo.redo(&mut self.layers)?.map(|p| p.kind()) else {
            return Ok(false);
        };
        self.after_history(kind);
        Ok(true)
    }

    /// 在当前 B-scan 上把 `[start, end)` 标为 `label`.
    pub fn assign_interval(&mut self, collection: &str, start: usize, end: usize, label: IntervalLabel) -> MarkerResult<()> {
        self.intervals.assign_range(collection, self.act_scan, start, end, label)?;
        self.events.push_back(MarkerEvent::FullRedrawRequested);
        Ok(())
    }

    /// 按选项生成厚度图并放入缓存. 投影前填充所有 B-scan.
    ///
    /// 缺少色表或空间对应表时什么也不做, 旧的叠加层保持不变. 被 `cancel` 取消时返回 `Ok(false)`.
    pub fn generate_thickness_map(&mut self, cancel: Option<&AtomicBool>) -> Result<bool, MissingCollaborator> {
        let colormap = self.colormap.as_deref().ok_or(MissingCollaborator::Colormap)?;
        let map = self.correspondence.as_deref().ok_or(MissingCollaborator::CorrespondenceMap)?;

        self.layers.fill_all(&*self.defaults);
        let t = &self.options.thickness;
        let params = ProjectionParams {
            upper: t.upper,
            lower: t.lower,
            scale: self.series.depth_mm() * t.unit_factor,
            policy: t.policy,
        };
        let Some((field, stats)) = project(&self.layers, map, &params, cancel) else {
            return Ok(false);
        };
        log::debug!("厚度图: {stats:?}");
        let image = field.colorize(colormap);
        self.thickness.store(image, field, stats, (params.upper, params.lower));
        self.overlay_visible = true;
        self.events.push_back(MarkerEvent::OverlayChanged);
        Ok(true)
    }

    /// 区间标记或边界线自上次保存后是否改变.
    #[inline]
    pub fn has_changed_since_last_save(&self) -> bool {
        self.intervals.has_changed_since_last_save() || self.layers.has_unsaved_changes()
    }

    /// 清除修改标记. 应在标注文件成功写入后调用.
    pub fn reset_changed(&mut self) {
        self.intervals.reset_changed();
        self.layers.reset_changes();
    }

    /// 从 series 节点读取全部标注. 撤销历史被清空.
    pub fn load_state(&mut self, series_node: &PTree) -> LoadReport {
        let empty = PTree::new();
        let mut report = codec::load_intervals(
            series_node.get_child(doc_keys::INTERVAL_MODULE).unwrap_or(&empty),
            &mut self.intervals,
        );
        report.merge(codec::load_layers(
            series_node.get_child(doc_keys::LAYER_MODULE).unwrap_or(&empty),
            &mut self.layers,
            &*self.defaults,
        ));
        self.layers.reset_changes();
        self.undo.clear();
        self.tool.reset();
        self.invalidate_thickness();
        self.events.push_back(MarkerEvent::UndoRedoChanged);
        self.events.push_back(MarkerEvent::FullRedrawRequested);
        report
    }

    /// 把全部标注写入 series 节点. 出错时节点不被修改.
    pub fn save_state(&self, series_node: &mut PTree) -> Result<(), DocumentError> {
        let mut layers = series_node.get_child(doc_keys::LAYER_MODULE).cloned().unwrap_or_default();
        codec::save_layers(&self.layers, &mut layers)?;
        codec::save_intervals(&self.intervals, series_node.get_put(doc_keys::INTERVAL_MODULE));
        series_node.put_child(doc_keys::LAYER_MODULE, layers);
        Ok(())
    }

    /// 从标注文件读取 `ids` 对应 series 的标注.
    pub fn load_file(&mut self, path: impl AsRef<Path>, ids: &SeriesIds) -> Result<LoadReport, DocumentError> {
        let path = path.as_ref();
        let mut tree = codec::read_file(path, None)?;
        let node = codec::series_node_mut(&mut tree, ids);
        let report = self.load_state(node);
        self.marker_file = Some((path.to_path_buf(), ids.clone()));
        Ok(report)
    }

    /// 把标注写入文件. 文件已存在时保留其中其他 series 的内容. 成功后清除修改标记.
    pub fn save_file(&mut self, path: impl AsRef<Path>, ids: &SeriesIds, format: Option<MarkerFileFormat>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let format = format.or_else(|| MarkerFileFormat::from_path(path)).unwrap_or(self.options.file_format);
        let mut tree = if path.is_file() {
            codec::read_file(path, Some(format))?
        } else {
            PTree::new()
        };
        self.save_state(codec::series_node_mut(&mut tree, ids))?;
        codec::write_file(path, &tree, Some(format))?;
        self.reset_changed();
        self.marker_file = Some((path.to_path_buf(), ids.clone()));
        Ok(())
    }
}
