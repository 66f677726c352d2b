//! 标记集合及其标签定义.

use super::IntervalLabel;
use crate::consts::keys;
use once_cell::sync::Lazy;

/// 单个标签的定义.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelDef {
    internal_name: String,
    display_name: String,
    color: [u8; 3],
}

impl LabelDef {
    /// 构建标签定义.
    pub fn new(internal_name: impl Into<String>, display_name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_name: display_name.into(),
            color,
        }
    }

    /// 规范名, 即标注文件中 `Class` 字段的值.
    #[inline]
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// 显示名.
    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// 显示颜色 (RGB).
    #[inline]
    pub fn color(&self) -> [u8; 3] {
        self.color
    }
}

/// 一个命名的标记集合, 拥有若干标签.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerCollection {
    internal_name: String,
    labels: Vec<LabelDef>,
}

impl MarkerCollection {
    /// 构建集合. 标签序号即 `labels` 中的位置.
    pub fn new(internal_name: impl Into<String>, labels: Vec<LabelDef>) -> Self {
        Self {
            internal_name: internal_name.into(),
            labels,
        }
    }

    /// 集合的规范名, 同时也是标注文件中该集合的根键.
    #[inline]
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// 所有标签定义.
    #[inline]
    pub fn labels(&self) -> &[LabelDef] {
        &self.labels
    }

    /// 由规范名查找标签. 找不到时返回 `None`.
    pub fn label_from_name(&self, name: &str) -> Option<IntervalLabel> {
        self.labels
            .iter()
            .position(|l| l.internal_name == name)
            .and_then(|i| u16::try_from(i).ok())
            .map(IntervalLabel::new)
    }

    /// 标签的定义. 未定义或越界时返回 `None`.
    pub fn label_def(&self, label: IntervalLabel) -> Option<&LabelDef> {
        label.index().and_then(|i| self.labels.get(usize::from(i)))
    }

    /// 标签的规范名.
    #[inline]
    pub fn label_name(&self, label: IntervalLabel) -> Option<&str> {
        self.label_def(label).map(LabelDef::internal_name)
    }
}

/// 已定义的所有标记集合, 按注册顺序排列.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionRegistry {
    collections: Vec<MarkerCollection>,
}

static BUILTIN: Lazy<CollectionRegistry> = Lazy::new(|| {
    let signal_quality = MarkerCollection::new(
        keys::SIGNAL_QUALITY,
        vec![
            LabelDef::new("good", "Good", [0, 200, 0]),
            LabelDef::new("middle", "Middle", [230, 200, 0]),
            LabelDef::new("bad", "Bad", [220, 0, 0]),
        ],
    );
    let artefacts = MarkerCollection::new(
        "artefacts",
        vec![
            LabelDef::new("shadow", "Shadow", [90, 90, 90]),
            LabelDef::new("motion", "Motion", [0, 120, 255]),
            LabelDef::new("mirror", "Mirror", [200, 0, 200]),
        ],
    );
    CollectionRegistry::new(vec![signal_quality, artefacts])
});

impl CollectionRegistry {
    /// 由集合列表构建. 名字重复时后者被忽略.
    pub fn new(collections: Vec<MarkerCollection>) -> Self {
        let mut registry = Self::default();
        for c in collections {
            if registry.get(c.internal_name()).is_some() {
                log::warn!("标记集合 `{}` 重复定义, 已忽略", c.internal_name());
                continue;
            }
            registry.collections.push(c);
        }
        registry
    }

    /// 内置集合: `signalQuality` 与 `artefacts`.
    #[inline]
    pub fn builtin() -> &'static CollectionRegistry {
        &BUILTIN
    }

    /// 按名字查找集合.
    pub fn get(&self, name: &str) -> Option<&MarkerCollection> {
        self.collections.iter().find(|c| c.internal_name() == name)
    }

    /// 集合在注册表中的位置.
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.internal_name() == name)
    }

    /// 按注册顺序迭代所有集合.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, MarkerCollection> {
        self.collections.iter()
    }

    /// 集合个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
