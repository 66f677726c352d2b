//! 通用常量.

/// 标注文档中的键名. 这些键与已有的标注文件逐字节兼容, 不可修改.
pub mod keys {
    /// 单个 B-scan 节点名.
    pub const BSCAN: &str = "BScan";

    /// B-scan 节点下的索引子节点名.
    pub const ID: &str = "ID";

    /// 单个区间节点名. 拼写沿用既有文件格式.
    pub const INTERVAL: &str = "Intervall";

    /// 区间起点 (含).
    pub const START: &str = "Start";

    /// 区间终点 (不含).
    pub const END: &str = "End";

    /// 区间标签的规范名.
    pub const CLASS: &str = "Class";

    /// 旧版信号质量集合的键名. 读取时映射到 [`SIGNAL_QUALITY`], 保存时总是删除.
    pub const LEGACY_QUALITY: &str = "Quality";

    /// 信号质量集合的内部名.
    pub const SIGNAL_QUALITY: &str = "signalQuality";

    /// 单条边界线节点名.
    pub const SEGLINE: &str = "Segline";

    /// 边界线类型.
    pub const TYPE: &str = "Type";

    /// 边界线压缩数据.
    pub const DATA: &str = "Data";

    /// 病人节点.
    pub const PATIENT: &str = "Patient";

    /// 检查节点.
    pub const STUDY: &str = "Study";

    /// 序列节点.
    pub const SERIES: &str = "Series";

    /// 病人 UID.
    pub const PATIENT_UID: &str = "PatientUID";

    /// 检查 UID.
    pub const STUDY_UID: &str = "StudyUID";

    /// 序列 UID.
    pub const SERIES_UID: &str = "SeriesUID";

    /// 标注文件的根元素.
    pub const DOCUMENT_ROOT: &str = "OctMarker";

    /// 区间标记模块的子树名.
    pub const INTERVAL_MODULE: &str = "IntervalMarker";

    /// 分层分割模块的子树名.
    pub const LAYER_MODULE: &str = "LayerSegmentation";

    /// XML 属性在文档树中的挂载点.
    pub const XML_ATTR: &str = "<xmlattr>";
}

/// RGBA 颜色.
pub mod color {
    /// 完全透明.
    pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

    /// 不透明通道值.
    pub const OPAQUE: u8 = u8::MAX;
}

/// 毫米到微米.
pub const MM_TO_UM: f64 = 1000.0;

/// 快捷键数字可选中的边界线类型个数.
pub const DIGIT_SLOTS: usize = 10;
