//! 运行选项. 以 JSON 保存, 缺失的字段取默认值.

use crate::codec::MarkerFileFormat;
use crate::consts::MM_TO_UM;
use crate::data::BoundaryType;
use crate::layer::edit::SegMethod;
use crate::thickness::{ColormapKind, PixelPolicy};
use crate::DocumentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 快捷键. 数字键 `0`-`9` 固定用于选择边界线类型, 不可配置.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// 切换为钢笔.
    pub pen: char,

    /// 切换为样条.
    pub spline: char,

    /// 显示/隐藏边界线.
    pub toggle_lines: char,

    /// 重新生成厚度图.
    pub thickness: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pen: 'q',
            spline: 'w',
            toggle_lines: 'e',
            thickness: 't',
        }
    }
}

/// 编辑方法的选项.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    /// 新会话的编辑方法.
    pub default_method: SegMethod,

    /// 样条控制点的拾取半径 (列).
    pub spline_pick_radius: f64,

    /// 钢笔右键擦除为未定义.
    pub pen_erase_on_secondary: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            default_method: SegMethod::Pen,
            spline_pick_radius: 5.0,
            pen_erase_on_secondary: true,
        }
    }
}

/// 厚度图选项.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThicknessOptions {
    /// 上边界.
    pub upper: BoundaryType,

    /// 下边界.
    pub lower: BoundaryType,

    /// 深度分辨率 (毫米) 到显示单位的倍数.
    pub unit_factor: f64,

    /// 像素冲突处理方式.
    pub policy: PixelPolicy,

    /// 色表种类.
    pub colormap: ColormapKind,

    /// 色表上限.
    pub max_value: f64,
}

impl Default for ThicknessOptions {
    fn default() -> Self {
        Self {
            upper: BoundaryType::Ilm,
            lower: BoundaryType::Bm,
            unit_factor: MM_TO_UM,
            policy: PixelPolicy::Average,
            colormap: ColormapKind::Hsv,
            max_value: 500.0,
        }
    }
}

/// 全部选项.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// 快捷键.
    pub keys: KeyBindings,

    /// 编辑方法.
    pub edit: EditOptions,

    /// 厚度图.
    pub thickness: ThicknessOptions,

    /// 切换 series 前自动保存.
    pub autosave: bool,

    /// 新建标注文件的格式.
    pub file_format: MarkerFileFormat,
}

impl Options {
    /// 从 JSON 文本解析.
    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(s)?)
    }

    /// 从 JSON 文件读取.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            operation: "读取",
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// 从默认位置读取; 文件不存在或无法解析时使用默认值.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path().filter(|p| p.is_file()) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!("{}: {e}, 使用默认选项", path.display());
            Self::default()
        })
    }

    /// 写入 JSON 文件.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| DocumentError::Io {
            operation: "写入",
            path: path.to_path_buf(),
            source,
        })
    }

    /// 获取 `{用户配置目录}/oct-berry/options.json`.
    pub fn default_path() -> Option<PathBuf> {
        let mut ans = dirs::config_dir()?;
        ans.push("oct-berry");
        ans.push("options.json");
        Some(ans)
    }
}

#[cfg(test)]
mod tests {
    use super::Options;
    use crate::codec::MarkerFileFormat;
    use crate::data::BoundaryType;
    use crate::layer::edit::SegMethod;
    use crate::thickness::PixelPolicy;

    #[test]
    fn test_partial_json_uses_defaults() {
        let o = Options::from_json_str(
            r#"{ "keys": { "pen": "p" },
                 "edit": { "default_method": "Spline" },
                 "thickness": { "lower": "CHO", "policy": "lastwrite" },
                 "file_format": "json" }"#,
        )
        .unwrap();
        assert_eq!(o.keys.pen, 'p');
        assert_eq!(o.keys.spline, 'w');
        assert_eq!(o.edit.default_method, SegMethod::Spline);
        assert_eq!(o.thickness.upper, BoundaryType::Ilm);
        assert_eq!(o.thickness.lower, BoundaryType::Cho);
        assert_eq!(o.thickness.policy, PixelPolicy::LastWrite);
        assert_eq!(o.thickness.unit_factor, 1000.0);
        assert_eq!(o.file_format, MarkerFileFormat::Json);
        assert!(!o.autosave);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("oct-berry-options-{}.json", std::process::id()));
        let mut o = Options::default();
        o.autosave = true;
        o.thickness.max_value = 350.0;
        o.save(&path).unwrap();
        let back = Options::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, o);
        assert!(Options::from_json_str("[1]").is_err());
    }
}
