//! 文档树的 JSON 读写.
//!
//! 没有子节点的节点写为字符串; 所有子节点键都为空的节点写为数组; 其余写为对象, 重复键按原顺序保留.

use super::PTree;
use crate::DocumentError;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

impl Serialize for PTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.children.is_empty() {
            return serializer.serialize_str(&self.value);
        }
        if self.children.iter().all(|(k, _)| k.is_empty()) {
            let mut seq = serializer.serialize_seq(Some(self.children.len()))?;
            for (_, child) in &self.children {
                seq.serialize_element(child)?;
            }
            return seq.end();
        }
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (k, child) in &self.children {
            map.serialize_entry(k, child)?;
        }
        map.end()
    }
}

struct PTreeVisitor;

impl<'de> Visitor<'de> for PTreeVisitor {
    type Value = PTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JSON 对象, 数组或标量")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PTree, E> {
        Ok(PTree::with_value(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<PTree, E> {
        Ok(PTree::with_value(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<PTree, E> {
        Ok(PTree::with_value(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<PTree, E> {
        Ok(PTree::with_value(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<PTree, E> {
        Ok(PTree::with_value(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<PTree, E> {
        Ok(PTree::with_value(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<PTree, E> {
        Ok(PTree::with_value("null"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<PTree, A::Error> {
        let mut node = PTree::new();
        while let Some(child) = seq.next_element::<PTree>()? {
            node.add("", child);
        }
        Ok(node)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PTree, A::Error> {
        let mut node = PTree::new();
        while let Some((k, child)) = map.next_entry::<String, PTree>()? {
            node.add(k, child);
        }
        Ok(node)
    }
}

impl<'de> Deserialize<'de> for PTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PTreeVisitor)
    }
}

/// 解析 JSON 文档.
pub fn from_str(s: &str) -> Result<PTree, DocumentError> {
    Ok(serde_json::from_str(s)?)
}

/// 写出带缩进的 JSON 文档.
pub fn to_string(tree: &PTree) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(tree)?)
}

#[cfg(test)]
mod tests {
    use super::{from_str, to_string};
    use crate::ptree::PTree;

    #[test]
    fn test_duplicate_keys_survive() {
        let t = from_str(r#"{"BScan": {"ID": 1}, "BScan": {"ID": "2"}, "flag": true}"#).unwrap();
        let ids: Vec<u32> = t.children_named("BScan").filter_map(|b| b.get("ID")).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(t.get_child("flag").unwrap().value(), "true");

        let back = from_str(&to_string(&t).unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_arrays_use_empty_keys() {
        let t = from_str(r#"{"xs": [1, 2, 3]}"#).unwrap();
        let xs = t.get_child("xs").unwrap();
        assert_eq!(xs.children().map(|(k, _)| k).collect::<Vec<_>>(), vec!["", "", ""]);
        let s = to_string(&t).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["xs"][2], "3");
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(from_str("{\"a\": ").is_err());
        let mut t = PTree::new();
        t.put("a", 1);
        assert!(to_string(&t).unwrap().contains("\"a\": \"1\""));
    }
}
