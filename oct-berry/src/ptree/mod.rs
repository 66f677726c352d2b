//! 层次化的标注文档树.
//!
//! 每个节点有一个字符串值和一组有序的 `(键, 子节点)`. 同一个键可以出现多次.
//! 路径以 `.` 分隔, 如 `"Series.ID"`.
//!
//! 文档可以读写为 XML ([`xml`]) 或 JSON ([`json`]):
//!
//! - XML: 元素名为键, 元素文本为值, 属性挂在 `<xmlattr>` 子节点下;
//! - JSON: 对象成员为子节点 (允许重复键), 数组元素为键为空的子节点, 标量统一保存为字符串.

pub mod json;
pub mod xml;

use std::fmt::Display;
use std::str::FromStr;

/// 文档树节点.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PTree {
    value: String,
    children: Vec<(String, PTree)>,
}

impl PTree {
    /// 空节点.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 只有值、没有子节点的节点.
    #[inline]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// 节点值.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 设置节点值.
    #[inline]
    pub fn set_value(&mut self, value: impl Display) {
        self.value = value.to_string();
    }

    /// 把节点值解析为 `T`. 解析前去掉首尾空白.
    #[inline]
    pub fn get_value<T: FromStr>(&self) -> Option<T> {
        self.value.trim().parse().ok()
    }

    /// 没有值也没有子节点.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.children.is_empty()
    }

    /// 按顺序迭代所有直接子节点.
    #[inline]
    pub fn children(&self) -> impl Iterator<Item = (&str, &PTree)> + '_ {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 直接子节点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// 所有键为 `key` 的直接子节点.
    pub fn children_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a PTree> + 'a {
        self.children.iter().filter(move |(k, _)| k == key).map(|(_, v)| v)
    }

    /// 第一个键为 `key` 的直接子节点.
    #[inline]
    fn child(&self, key: &str) -> Option<&PTree> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[inline]
    fn child_mut(&mut self, key: &str) -> Option<&mut PTree> {
        self.children.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 按路径查找子节点. 每一级取第一个匹配的键.
    pub fn get_child(&self, path: &str) -> Option<&PTree> {
        path.split('.').try_fold(self, |node, key| node.child(key))
    }

    /// 同 [`Self::get_child`], 可变版本.
    pub fn get_child_mut(&mut self, path: &str) -> Option<&mut PTree> {
        path.split('.').try_fold(self, |node, key| node.child_mut(key))
    }

    /// 按路径取子节点值并解析为 `T`.
    #[inline]
    pub fn get<T: FromStr>(&self, path: &str) -> Option<T> {
        self.get_child(path)?.get_value()
    }

    /// 按路径取子节点; 沿途不存在的节点会被创建.
    pub fn get_put(&mut self, path: &str) -> &mut PTree {
        path.split('.').fold(self, |node, key| {
            let pos = match node.children.iter().position(|(k, _)| k == key) {
                Some(pos) => pos,
                None => {
                    node.children.push((key.to_owned(), PTree::new()));
                    node.children.len() - 1
                }
            };
            &mut node.children[pos].1
        })
    }

    /// 设置路径处节点的值, 必要时创建节点. 返回该节点.
    pub fn put(&mut self, path: &str, value: impl Display) -> &mut PTree {
        let node = self.get_put(path);
        node.set_value(value);
        node
    }

    /// 以 `child` 替换路径处的节点, 必要时创建. 返回该节点.
    pub fn put_child(&mut self, path: &str, child: PTree) -> &mut PTree {
        let node = self.get_put(path);
        *node = child;
        node
    }

    /// 在末尾追加一个直接子节点, 不检查重复键. 返回新节点.
    pub fn add(&mut self, key: impl Into<String>, child: PTree) -> &mut PTree {
        self.children.push((key.into(), child));
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }

    /// 删除所有键为 `key` 的直接子节点, 返回删除的个数.
    pub fn erase(&mut self, key: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|(k, _)| k != key);
        before - self.children.len()
    }

    /// 取出第一个键为 `key` 的直接子节点.
    pub fn take_child(&mut self, key: &str) -> Option<PTree> {
        let pos = self.children.iter().position(|(k, _)| k == key)?;
        Some(self.children.remove(pos).1)
    }

    /// 第一个键为 `key` 且满足 `pred` 的直接子节点; 不存在时追加 `init()` 的结果.
    pub fn find_or_add(&mut self, key: &str, pred: impl Fn(&PTree) -> bool, init: impl FnOnce() -> PTree) -> &mut PTree {
        match self.children.iter().position(|(k, v)| k == key && pred(v)) {
            Some(pos) => &mut self.children[pos].1,
            None => self.add(key, init()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PTree;

    #[test]
    fn test_paths_and_duplicates() {
        let mut t = PTree::new();
        t.put("a.b", 3);
        t.add("c", PTree::with_value("x"));
        t.add("c", PTree::with_value("y"));

        assert_eq!(t.get::<i32>("a.b"), Some(3));
        assert_eq!(t.get::<i32>("a.z"), None);
        let cs: Vec<_> = t.children_named("c").map(PTree::value).collect();
        assert_eq!(cs, vec!["x", "y"]);

        t.put("c", "z");
        assert_eq!(t.get_child("c").unwrap().value(), "z");
        assert_eq!(t.children_named("c").count(), 2);

        assert_eq!(t.erase("c"), 2);
        assert!(t.get_child("c").is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_get_put_creates_once() {
        let mut t = PTree::new();
        t.get_put("x.y").put("v", 1);
        t.get_put("x.y").put("w", 2);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get::<u8>("x.y.v"), Some(1));
        assert_eq!(t.get::<u8>("x.y.w"), Some(2));
    }

    #[test]
    fn test_value_is_trimmed_for_parsing() {
        assert_eq!(PTree::with_value(" 42\n").get_value::<usize>(), Some(42));
        assert_eq!(PTree::with_value("4x").get_value::<usize>(), None);
    }

    #[test]
    fn test_find_or_add_and_take() {
        let mut t = PTree::new();
        t.add("s", PTree::with_value("1"));
        t.add("s", PTree::with_value("2"));
        t.find_or_add("s", |c| c.value() == "2", PTree::new).put("x", 1);
        t.find_or_add("s", |c| c.value() == "3", || PTree::with_value("3"));
        assert_eq!(t.children_named("s").count(), 3);
        assert_eq!(t.children_named("s").nth(1).unwrap().get::<i32>("x"), Some(1));

        assert_eq!(t.take_child("s").unwrap().value(), "1");
        assert_eq!(t.len(), 2);
        assert!(t.take_child("q").is_none());
    }
}
