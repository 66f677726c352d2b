//! 标注存储与文档树之间的双向映射.
//!
//! 读取时遇到缺失或无法解析的字段只跳过对应节点, 并记录一条 [`Diagnostic`];
//! 只有文档本身无法解析才是硬错误 ([`DocumentError`](crate::DocumentError)).

mod document;
mod interval;
mod layer;

pub use document::{default_marker_path, read_file, series_node_mut, write_file, MarkerFileFormat, SeriesIds};
pub use interval::{load_intervals, save_intervals};
pub use layer::{load_layers, save_layers};

use crate::data::BoundaryType;
use crate::ScanIdx;
use std::fmt;

/// 读取文档时被跳过的内容.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// 必需字段缺失或无法解析.
    MalformedNode {
        /// 所在模块或集合.
        section: String,
        /// 出问题的字段.
        field: &'static str,
        /// B-scan 索引, 如果已知.
        scan: Option<ScanIdx>,
    },

    /// `Class` 不是该集合中的标签.
    UnknownLabel {
        /// 集合名.
        collection: String,
        /// B-scan 索引.
        scan: ScanIdx,
        /// 文档中的类名.
        class: String,
    },

    /// 区间不满足 `start < end`, 或 B-scan 越界.
    RejectedInterval {
        /// 集合名.
        collection: String,
        /// B-scan 索引.
        scan: ScanIdx,
        /// 起点.
        start: usize,
        /// 终点.
        end: usize,
    },

    /// 边界线类型名未知.
    UnknownBoundaryType {
        /// B-scan 索引.
        scan: ScanIdx,
        /// 文档中的类型名.
        name: String,
    },

    /// 边界线数据无法解码.
    CorruptLine {
        /// B-scan 索引.
        scan: ScanIdx,
        /// 边界线类型.
        kind: BoundaryType,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedNode { section, field, scan: Some(scan) } => {
                write!(f, "{section}: B-scan {scan} 的 `{field}` 缺失或无法解析, 已跳过")
            }
            Self::MalformedNode { section, field, scan: None } => {
                write!(f, "{section}: `{field}` 缺失或无法解析, 已跳过")
            }
            Self::UnknownLabel { collection, scan, class } => {
                write!(f, "{collection}: B-scan {scan} 中未知的区间类别 `{class}`, 已跳过")
            }
            Self::RejectedInterval { collection, scan, start, end } => {
                write!(f, "{collection}: B-scan {scan} 中的区间 [{start}, {end}) 无效, 已跳过")
            }
            Self::UnknownBoundaryType { scan, name } => {
                write!(f, "B-scan {scan} 中未知的边界线类型 `{name}`, 已跳过")
            }
            Self::CorruptLine { scan, kind } => write!(f, "B-scan {scan} 的 {kind} 边界线数据损坏, 已跳过"),
        }
    }
}

/// 一次读取的结果.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// 被跳过的内容.
    pub diagnostics: Vec<Diagnostic>,

    /// 读入的区间个数.
    pub intervals: usize,

    /// 读入的边界线条数.
    pub lines: usize,
}

impl LoadReport {
    /// 记录一条诊断, 同时写日志.
    pub(crate) fn skip(&mut self, d: Diagnostic) {
        log::warn!("{d}");
        self.diagnostics.push(d);
    }

    /// 是否没有跳过任何内容.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 合并另一份结果.
    pub fn merge(&mut self, other: LoadReport) {
        self.diagnostics.extend(other.diagnostics);
        self.intervals += other.intervals;
        self.lines += other.lines;
    }
}
