//! 运行时错误.
//!
//! 除 [`DocumentError`] 以外的错误都不会终止会话, 调用方记录后继续即可.

use std::path::PathBuf;
use thiserror::Error;

/// 对标注存储的非法操作. 出错时存储保持原样, 不会被部分修改.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkerError {
    /// 区间要求 `start < end`.
    #[error("非法区间 [{start}, {end}): 要求 start < end")]
    InvalidInterval {
        /// 起点.
        start: usize,
        /// 终点.
        end: usize,
    },

    /// B-scan 或列索引越界.
    #[error("{what} 索引越界: {index} (上限 {len})")]
    IndexOutOfRange {
        /// 越界的维度.
        what: &'static str,
        /// 实际索引.
        index: usize,
        /// 该维度的长度.
        len: usize,
    },

    /// 标记集合不存在.
    #[error("未知的标记集合 `{0}`")]
    UnknownCollection(String),

    /// 标签索引不属于该标记集合.
    #[error("标记集合 `{collection}` 中没有编号为 {index} 的标签")]
    UnknownLabel {
        /// 集合名.
        collection: String,
        /// 标签索引.
        index: u16,
    },

    /// 边界线类型名不存在.
    #[error("未知的边界线类型 `{0}`")]
    UnknownBoundaryType(String),

    /// 撤销补丁的新旧数据长度不一致.
    #[error("补丁长度不一致: 旧数据 {old}, 新数据 {new}")]
    PatchLengthMismatch {
        /// 旧数据长度.
        old: usize,
        /// 新数据长度.
        new: usize,
    },
}

/// 标注存储操作的结果.
pub type MarkerResult<T> = Result<T, MarkerError>;

/// 读写标注文档时的硬错误. 出现该错误时文档不会被修改.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件读写错误.
    #[error("无法{operation}文件 {path}")]
    Io {
        /// "读取" 或 "写入".
        operation: &'static str,
        /// 文件路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: std::io::Error,
    },

    /// 不是合法的 XML 文档.
    #[error("XML 解析失败")]
    Xml(#[from] quick_xml::Error),

    /// 不是合法的 JSON 文档.
    #[error("JSON 解析失败")]
    Json(#[from] serde_json::Error),

    /// 二进制边界线数据损坏.
    #[error("边界线数据损坏: {0}")]
    Blob(String),

    /// 无法从扩展名判断文件格式.
    #[error("无法识别的标注文件格式: {0}")]
    UnknownFormat(PathBuf),
}

/// 生成厚度图所需的协作者缺失. 该情况下生成操作什么也不做, 旧的叠加图保持不变.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MissingCollaborator {
    /// 没有配置色表.
    #[error("未配置色表")]
    Colormap,

    /// 没有可用的空间对应表.
    #[error("没有可用的空间对应表")]
    CorrespondenceMap,
}
