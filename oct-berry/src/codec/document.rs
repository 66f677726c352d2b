//! 标注文件与病人/检查/序列层级.

use crate::consts::keys;
use crate::ptree::{json, xml, PTree};
use crate::DocumentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 标注文件格式.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerFileFormat {
    /// XML.
    #[default]
    Xml,

    /// JSON.
    Json,
}

impl MarkerFileFormat {
    /// 由扩展名判断格式 (不区分大小写).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" => Some(Self::Xml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// 该格式的扩展名.
    #[inline]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }

    fn parse(self, s: &str) -> Result<PTree, DocumentError> {
        match self {
            Self::Xml => xml::from_str(s),
            Self::Json => json::from_str(s),
        }
    }

    fn render(self, tree: &PTree) -> Result<String, DocumentError> {
        match self {
            Self::Xml => xml::to_string(tree),
            Self::Json => json::to_string(tree),
        }
    }
}

fn resolve(path: &Path, format: Option<MarkerFileFormat>) -> Result<MarkerFileFormat, DocumentError> {
    format
        .or_else(|| MarkerFileFormat::from_path(path))
        .ok_or_else(|| DocumentError::UnknownFormat(path.to_path_buf()))
}

/// 读取标注文件, 返回根元素下的标注树. `format` 为 `None` 时由扩展名判断.
///
/// 出错时不产生任何部分结果.
pub fn read_file(path: impl AsRef<Path>, format: Option<MarkerFileFormat>) -> Result<PTree, DocumentError> {
    let path = path.as_ref();
    let format = resolve(path, format)?;
    let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        operation: "读取",
        path: path.to_path_buf(),
        source,
    })?;
    let mut doc = format.parse(&text)?;
    log::debug!("读取标注文件 {} ({format:?})", path.display());
    Ok(match doc.take_child(keys::DOCUMENT_ROOT) {
        Some(root) => root,
        None => doc,
    })
}

/// 把标注树包在根元素下写入文件. 文档先完整生成, 成功后才写盘.
pub fn write_file(path: impl AsRef<Path>, tree: &PTree, format: Option<MarkerFileFormat>) -> Result<(), DocumentError> {
    let path = path.as_ref();
    let format = resolve(path, format)?;
    let mut doc = PTree::new();
    doc.add(keys::DOCUMENT_ROOT, tree.clone());
    let text = format.render(&doc)?;
    fs::write(path, text).map_err(|source| DocumentError::Io {
        operation: "写入",
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("写入标注文件 {} ({format:?})", path.display());
    Ok(())
}

/// 扫描文件旁的默认标注文件路径: `<扫描文件名>_octmarker.<扩展名>`.
pub fn default_marker_path(scan_path: impl AsRef<Path>, format: MarkerFileFormat) -> PathBuf {
    let scan_path = scan_path.as_ref();
    let mut name = scan_path.file_name().unwrap_or_default().to_os_string();
    name.push("_octmarker.");
    name.push(format.extension());
    scan_path.with_file_name(name)
}

/// 一个 series 在标注树中的定位信息.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesIds {
    /// 病人内部 ID.
    pub patient_id: i64,
    /// 检查内部 ID.
    pub study_id: i64,
    /// 序列内部 ID.
    pub series_id: i64,
    /// 病人 UID, 可为空.
    pub patient_uid: String,
    /// 检查 UID, 可为空.
    pub study_uid: String,
    /// 序列 UID, 可为空.
    pub series_uid: String,
}

/// `parent` 下键为 `key` 且 `ID` 为 `id` 的子节点, 不存在时创建.
fn node_with_id<'a>(parent: &'a mut PTree, key: &str, id: i64) -> &'a mut PTree {
    parent.find_or_add(
        key,
        |c| c.get::<i64>(keys::ID) == Some(id),
        || {
            let mut node = PTree::new();
            node.put(keys::ID, id);
            node
        },
    )
}

fn put_not_empty(node: &mut PTree, key: &str, value: &str) {
    if !value.is_empty() {
        node.put(key, value);
    }
}

/// 找到 (必要时创建) series 节点, 并写入非空的 UID.
pub fn series_node_mut<'a>(tree: &'a mut PTree, ids: &SeriesIds) -> &'a mut PTree {
    let patient = node_with_id(tree, keys::PATIENT, ids.patient_id);
    put_not_empty(patient, keys::PATIENT_UID, &ids.patient_uid);
    let study = node_with_id(patient, keys::STUDY, ids.study_id);
    put_not_empty(study, keys::STUDY_UID, &ids.study_uid);
    let series = node_with_id(study, keys::SERIES, ids.series_id);
    put_not_empty(series, keys::SERIES_UID, &ids.series_uid);
    series
}
