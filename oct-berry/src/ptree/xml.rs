//! 文档树的 XML 读写.

use super::PTree;
use crate::consts::keys::XML_ATTR;
use crate::DocumentError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::str;

fn utf8(bytes: &[u8]) -> Result<&str, quick_xml::Error> {
    Ok(str::from_utf8(bytes)?)
}

/// 由开始标签构建节点, 属性挂在 `<xmlattr>` 下.
fn open(e: &BytesStart<'_>) -> Result<(String, PTree), quick_xml::Error> {
    let name = utf8(e.name().as_ref())?.to_owned();
    let mut node = PTree::new();
    let mut attrs = PTree::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?.to_owned();
        attrs.add(key, PTree::with_value(attr.unescape_value()?.into_owned()));
    }
    if !attrs.is_empty() {
        node.add(XML_ATTR, attrs);
    }
    Ok((name, node))
}

/// 解析 XML 文档. 返回的根节点以文档元素为唯一子节点.
pub fn from_str(s: &str) -> Result<PTree, DocumentError> {
    let mut reader = Reader::from_str(s);
    reader.trim_text(true);

    let mut stack: Vec<(String, PTree)> = vec![(String::new(), PTree::new())];
    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(open(&e)?),
            Event::Empty(e) => {
                let (name, node) = open(&e)?;
                if let Some((_, parent)) = stack.last_mut() {
                    parent.add(name, node);
                }
            }
            Event::Text(e) => {
                if let Some((_, cur)) = stack.last_mut() {
                    cur.value.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some((_, cur)) = stack.last_mut() {
                    cur.value.push_str(utf8(&e.into_inner())?);
                }
            }
            Event::End(_) => {
                // 结束标签是否匹配由 reader 检查.
                let (name, node) = stack
                    .pop()
                    .ok_or_else(|| quick_xml::Error::UnexpectedEof("多余的结束标签".to_owned()))?;
                match stack.last_mut() {
                    Some((_, parent)) => {
                        parent.add(name, node);
                    }
                    None => return Err(quick_xml::Error::UnexpectedEof("多余的结束标签".to_owned()).into()),
                }
            }
            Event::Eof => break,
            // 声明, 注释, 处理指令与 DOCTYPE 不进入文档树.
            _ => {}
        }
    }

    match stack.pop() {
        Some((_, root)) if stack.is_empty() => Ok(root),
        _ => Err(quick_xml::Error::UnexpectedEof("元素未闭合".to_owned()).into()),
    }
}

fn write_node<W: std::io::Write>(w: &mut Writer<W>, name: &str, node: &PTree) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(name);
    if let Some(attrs) = node.get_child(XML_ATTR) {
        for (k, v) in attrs.children() {
            start.push_attribute((k, v.value()));
        }
    }
    let mut body = node.children().filter(|(k, _)| *k != XML_ATTR).peekable();
    if node.value().is_empty() && body.peek().is_none() {
        return w.write_event(Event::Empty(start));
    }

    w.write_event(Event::Start(start))?;
    if !node.value().is_empty() {
        w.write_event(Event::Text(BytesText::new(node.value())))?;
    }
    for (k, child) in body {
        write_node(w, k, child)?;
    }
    w.write_event(Event::End(BytesEnd::new(name)))
}

/// 写出 XML 文档. 根节点的每个子节点成为一个顶层元素, 根节点自身的值被忽略.
pub fn to_string(tree: &PTree) -> Result<String, DocumentError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    for (k, child) in tree.children() {
        write_node(&mut w, k, child)?;
    }
    let buf = w.into_inner();
    String::from_utf8(buf).map_err(|e| quick_xml::Error::from(e.utf8_error()).into())
}

#[cfg(test)]
mod tests {
    use super::{from_str, to_string};
    use crate::ptree::PTree;
    use crate::DocumentError;

    #[test]
    fn test_read_elements_and_attributes() {
        let doc = r#"<?xml version="1.0"?>
            <Root version="2">
              <BScan><ID>2</ID><Intervall><Start>0</Start><End>5</End><Class>good</Class></Intervall></BScan>
              <Empty/>
              <Note>a &amp; b</Note>
            </Root>"#;
        let t = from_str(doc).unwrap();
        assert_eq!(t.get::<u32>("Root.<xmlattr>.version"), Some(2));
        assert_eq!(t.get::<usize>("Root.BScan.ID"), Some(2));
        assert_eq!(t.get_child("Root.BScan.Intervall.Class").unwrap().value(), "good");
        assert!(t.get_child("Root.Empty").unwrap().is_empty());
        assert_eq!(t.get_child("Root.Note").unwrap().value(), "a & b");
    }

    #[test]
    fn test_write_then_read() {
        let mut t = PTree::new();
        let root = t.get_put("Root");
        root.get_put("<xmlattr>").put("kind", "x<y");
        root.add("Item", PTree::with_value("1"));
        root.add("Item", PTree::with_value("2 & 3"));
        root.add("Blank", PTree::new());
        let s = to_string(&t).unwrap();
        assert_eq!(from_str(&s).unwrap(), t);
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(matches!(from_str("<a><b></a>"), Err(DocumentError::Xml(_))));
        assert!(matches!(from_str("<a><b></b>"), Err(DocumentError::Xml(_))));
    }
}
