//! 基础数据类型: 边界线类型、采样值约定和 series 元信息.

use crate::ScanIdx;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 边界线采样中的 "未定义" 哨兵值.
pub const UNDEFINED: f64 = f64::NAN;

/// 采样值是否为未定义哨兵.
#[inline]
pub fn is_undefined(sample: f64) -> bool {
    sample.is_nan()
}

/// 解剖学分层边界线类型.
///
/// 顺序固定, 快捷键 `0`-`9` 依次对应前十种. 规范名与标注文件中 `Type` 字段一致.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoundaryType {
    /// 内界膜.
    #[serde(rename = "ILM")]
    Ilm,

    /// 神经纤维层 / 神经节细胞层.
    #[serde(rename = "NFL")]
    Nfl,

    /// 神经节细胞层 / 内丛状层.
    #[serde(rename = "I3T1")]
    I3T1,

    /// 内丛状层 / 内核层.
    #[serde(rename = "I4T1")]
    I4T1,

    /// 内核层 / 外丛状层.
    #[serde(rename = "I5T1")]
    I5T1,

    /// 外丛状层 / 外核层.
    #[serde(rename = "I6T1")]
    I6T1,

    /// 外界膜.
    #[serde(rename = "I8T3")]
    I8T3,

    /// 光感受器内外节连接.
    #[serde(rename = "I14T1")]
    I14T1,

    /// 光感受器外节末端.
    #[serde(rename = "I15T1")]
    I15T1,

    /// 视网膜色素上皮.
    #[serde(rename = "I16T1")]
    I16T1,

    /// Bruch 膜.
    #[serde(rename = "BM")]
    Bm,

    /// 脉络膜 / 巩膜.
    #[serde(rename = "CHO")]
    Cho,
}

impl BoundaryType {
    /// 边界线类型总数.
    pub const COUNT: usize = 12;

    /// 按固定顺序排列的所有类型.
    pub const ALL: [BoundaryType; Self::COUNT] = [
        Self::Ilm,
        Self::Nfl,
        Self::I3T1,
        Self::I4T1,
        Self::I5T1,
        Self::I6T1,
        Self::I8T3,
        Self::I14T1,
        Self::I15T1,
        Self::I16T1,
        Self::Bm,
        Self::Cho,
    ];

    /// 在 [`Self::ALL`] 中的位置.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 由位置获取类型. 越界时返回 `None`.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 规范名.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ilm => "ILM",
            Self::Nfl => "NFL",
            Self::I3T1 => "I3T1",
            Self::I4T1 => "I4T1",
            Self::I5T1 => "I5T1",
            Self::I6T1 => "I6T1",
            Self::I8T3 => "I8T3",
            Self::I14T1 => "I14T1",
            Self::I15T1 => "I15T1",
            Self::I16T1 => "I16T1",
            Self::Bm => "BM",
            Self::Cho => "CHO",
        }
    }

    /// 由规范名获取类型.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryType {
    type Err = crate::MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| crate::MarkerError::UnknownBoundaryType(s.to_owned()))
    }
}

/// 一个已加载 series 的几何信息. 加载后不可变.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    /// 每个 B-scan 的列数.
    widths: Vec<usize>,

    /// B-scan 深度方向的像素分辨率 (毫米).
    depth_mm: f64,
}

impl SeriesInfo {
    /// 初始化. `widths[i]` 为第 `i` 个 B-scan 的宽度.
    pub fn new(widths: Vec<usize>, depth_mm: f64) -> Self {
        Self { widths, depth_mm }
    }

    /// 所有 B-scan 宽度相同的 series.
    #[inline]
    pub fn uniform(num_scans: usize, width: usize, depth_mm: f64) -> Self {
        Self::new(vec![width; num_scans], depth_mm)
    }

    /// B-scan 个数.
    #[inline]
    pub fn num_scans(&self) -> usize {
        self.widths.len()
    }

    /// 第 `scan` 个 B-scan 的宽度. 越界时返回 `None`.
    #[inline]
    pub fn width(&self, scan: ScanIdx) -> Option<usize> {
        self.widths.get(scan).copied()
    }

    /// 所有 B-scan 的宽度.
    #[inline]
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// 最宽 B-scan 的宽度. 空 series 返回 0.
    #[inline]
    pub fn max_width(&self) -> usize {
        self.widths.iter().copied().max().unwrap_or(0)
    }

    /// 深度方向像素分辨率 (毫米).
    #[inline]
    pub fn depth_mm(&self) -> f64 {
        self.depth_mm
    }
}

#[cfg(test)]
mod tests {
    use super::BoundaryType;

    #[test]
    fn test_boundary_type_order_and_names() {
        for (i, t) in BoundaryType::ALL.into_iter().enumerate() {
            assert_eq!(t.index(), i);
            assert_eq!(BoundaryType::from_index(i), Some(t));
            assert_eq!(BoundaryType::from_name(t.name()), Some(t));
        }
        assert_eq!(BoundaryType::from_index(BoundaryType::COUNT), None);
        assert!("XYZ".parse::<BoundaryType>().is_err());
    }

    #[test]
    fn test_boundary_type_serde_uses_canonical_name() {
        let s = serde_json::to_string(&BoundaryType::Bm).unwrap();
        assert_eq!(s, "\"BM\"");
        let t: BoundaryType = serde_json::from_str("\"I14T1\"").unwrap();
        assert_eq!(t, BoundaryType::I14T1);
    }
}
