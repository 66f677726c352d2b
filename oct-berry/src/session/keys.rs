//! 键盘输入及其含义.

use crate::consts::DIGIT_SLOTS;
use crate::data::BoundaryType;
use crate::layer::edit::SegMethod;
use crate::options::KeyBindings;

/// 引擎关心的按键.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// 数字键 `0`-`9`.
    Digit(u8),

    /// 字符键, 已转为小写.
    Char(char),

    /// Delete.
    Delete,

    /// Esc.
    Escape,
}

impl Key {
    /// 由字符构建. 数字字符得到 [`Key::Digit`].
    pub fn from_char(c: char) -> Self {
        match c.to_digit(10) {
            Some(d) => Self::Digit(d as u8),
            None => Self::Char(c.to_ascii_lowercase()),
        }
    }
}

/// 编辑方法未消费的按键所触发的会话动作.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// 选择当前边界线类型.
    SelectBoundary(BoundaryType),

    /// 切换编辑方法.
    SetMethod(SegMethod),

    /// 显示/隐藏边界线.
    ToggleLines,

    /// 重新生成厚度图.
    GenerateThickness,
}

impl KeyAction {
    /// 按快捷键表解析按键.
    pub fn resolve(key: Key, bindings: &KeyBindings) -> Option<Self> {
        match key {
            Key::Digit(d) if (d as usize) < DIGIT_SLOTS => BoundaryType::from_index(d as usize).map(Self::SelectBoundary),
            Key::Char(c) if c == bindings.pen => Some(Self::SetMethod(SegMethod::Pen)),
            Key::Char(c) if c == bindings.spline => Some(Self::SetMethod(SegMethod::Spline)),
            Key::Char(c) if c == bindings.toggle_lines => Some(Self::ToggleLines),
            Key::Char(c) if c == bindings.thickness => Some(Self::GenerateThickness),
            _ => None,
        }
    }
}
