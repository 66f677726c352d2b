//! 区间标记的读写.

use super::{Diagnostic, LoadReport};
use crate::consts::keys;
use crate::interval::{IntervalLabelStore, MarkerCollection};
use crate::ptree::PTree;
use crate::{MarkerError, ScanIdx};

/// 读取 `tree` 中键为 `key` 的集合子树到 `collection`.
fn load_collection(tree: &PTree, key: &str, collection: &MarkerCollection, store: &mut IntervalLabelStore, report: &mut LoadReport) {
    let Some(bscans) = tree.get_child(key) else {
        return;
    };
    let name = collection.internal_name();

    for bscan in bscans.children_named(keys::BSCAN) {
        let Some(scan) = bscan.get::<ScanIdx>(keys::ID) else {
            report.skip(Diagnostic::MalformedNode {
                section: key.to_owned(),
                field: keys::ID,
                scan: None,
            });
            continue;
        };

        for node in bscan.children_named(keys::INTERVAL) {
            let malformed = |field| Diagnostic::MalformedNode {
                section: key.to_owned(),
                field,
                scan: Some(scan),
            };
            let Some(start) = node.get::<usize>(keys::START) else {
                report.skip(malformed(keys::START));
                continue;
            };
            let Some(end) = node.get::<usize>(keys::END) else {
                report.skip(malformed(keys::END));
                continue;
            };
            let Some(class) = node.get_child(keys::CLASS).map(PTree::value) else {
                report.skip(malformed(keys::CLASS));
                continue;
            };
            let Some(label) = collection.label_from_name(class.trim()) else {
                report.skip(Diagnostic::UnknownLabel {
                    collection: name.to_owned(),
                    scan,
                    class: class.to_owned(),
                });
                continue;
            };

            match store.assign_range(name, scan, start, end, label) {
                Ok(()) => report.intervals += 1,
                Err(MarkerError::InvalidInterval { .. } | MarkerError::IndexOutOfRange { .. }) => {
                    report.skip(Diagnostic::RejectedInterval {
                        collection: name.to_owned(),
                        scan,
                        start,
                        end,
                    });
                }
                Err(e) => log::warn!("{e}"),
            }
        }
    }
}

/// 从模块子树读取所有已注册集合, 以及旧版 `Quality` 键.
///
/// 读取前不清空存储. 读取后修改标记被清除.
pub fn load_intervals(tree: &PTree, store: &mut IntervalLabelStore) -> LoadReport {
    let mut report = LoadReport::default();
    let registry = store.registry().clone();
    for collection in registry.iter() {
        load_collection(tree, collection.internal_name(), collection, store, &mut report);
    }
    if let Some(quality) = registry.get(keys::SIGNAL_QUALITY) {
        load_collection(tree, keys::LEGACY_QUALITY, quality, store, &mut report);
    }
    store.reset_changed();
    report
}

/// 把所有已注册集合写入模块子树. 每个集合的子树都从头重建, 没有已定义区间的 B-scan 被省略.
///
/// 旧版 `Quality` 键总是被删除.
pub fn save_intervals(store: &IntervalLabelStore, tree: &mut PTree) {
    for collection in store.registry().iter() {
        let name = collection.internal_name();
        tree.erase(name);
        let subtree = tree.add(name, PTree::new());

        for scan in (0..store.num_scans()).filter(|&s| store.has_defined(name, s)) {
            let mut bscan = PTree::new();
            bscan.add(keys::ID, PTree::with_value(scan.to_string()));
            for (iv, label) in store.iterate(name, scan) {
                let Some(class) = collection.label_name(label) else {
                    continue;
                };
                let node = bscan.add(keys::INTERVAL, PTree::new());
                node.add(keys::START, PTree::with_value(iv.start().to_string()));
                node.add(keys::END, PTree::with_value(iv.end().to_string()));
                node.add(keys::CLASS, PTree::with_value(class));
            }
            subtree.add(keys::BSCAN, bscan);
        }
    }
    tree.erase(keys::LEGACY_QUALITY);
}

#[cfg(test)]
mod tests {
    use super::{load_intervals, save_intervals};
    use crate::codec::Diagnostic;
    use crate::interval::{CollectionRegistry, IntervalLabel, IntervalLabelStore};
    use crate::ptree::{xml, PTree};

    const SQ: &str = "signalQuality";

    fn store() -> IntervalLabelStore {
        IntervalLabelStore::new(CollectionRegistry::builtin().clone(), 5)
    }

    fn dump(store: &IntervalLabelStore, scan: usize) -> Vec<(usize, usize, IntervalLabel)> {
        store.iterate(SQ, scan).map(|(i, l)| (i.start(), i.end(), l)).collect()
    }

    #[test]
    fn test_round_trip() {
        let (a, b) = (IntervalLabel::new(0), IntervalLabel::new(2));
        let mut s = store();
        s.assign_range(SQ, 2, 0, 5, a).unwrap();
        s.assign_range(SQ, 2, 10, 20, b).unwrap();
        assert!(s.assign_range(SQ, 2, 100, 100, a).is_err());

        let mut tree = PTree::new();
        save_intervals(&s, &mut tree);
        assert_eq!(tree.get_child(SQ).unwrap().children_named("BScan").count(), 1);

        // 经过一次 XML 文本.
        let mut doc = PTree::new();
        doc.add("Marker", tree);
        let text = xml::to_string(&doc).unwrap();
        let back = xml::from_str(&text).unwrap();

        let mut loaded = store();
        let report = load_intervals(back.get_child("Marker").unwrap(), &mut loaded);
        assert!(report.is_clean());
        assert_eq!(report.intervals, 2);
        assert_eq!(dump(&loaded, 2), vec![(0, 5, a), (10, 20, b)]);
        assert!(!loaded.has_changed_since_last_save());
    }

    #[test]
    fn test_unknown_class_is_skipped() {
        let doc = r#"<M><signalQuality>
            <BScan><ID>1</ID>
              <Intervall><Start>0</Start><End>4</End><Class>unknownThing</Class></Intervall>
              <Intervall><Start>4</Start><End>9</End><Class>bad</Class></Intervall>
              <Intervall><Start>x</Start><End>9</End><Class>bad</Class></Intervall>
            </BScan>
            <BScan><Intervall><Start>0</Start><End>1</End><Class>bad</Class></Intervall></BScan>
        </signalQuality></M>"#;
        let tree = xml::from_str(doc).unwrap();
        let mut s = store();
        let report = load_intervals(tree.get_child("M").unwrap(), &mut s);
        assert_eq!(report.intervals, 1);
        assert_eq!(report.diagnostics.len(), 3);
        assert!(matches!(&report.diagnostics[0], Diagnostic::UnknownLabel { class, .. } if class == "unknownThing"));
        assert_eq!(dump(&s, 1), vec![(4, 9, IntervalLabel::new(2))]);
    }

    #[test]
    fn test_legacy_quality_migrates() {
        let doc = r#"<M><Quality><BScan><ID>0</ID>
            <Intervall><Start>1</Start><End>3</End><Class>middle</Class></Intervall>
        </BScan></Quality></M>"#;
        let tree = xml::from_str(doc).unwrap();
        let mut marker = tree.get_child("M").unwrap().clone();
        let mut s = store();
        load_intervals(&marker, &mut s);
        assert_eq!(s.query(SQ, 0, 2), IntervalLabel::new(1));

        save_intervals(&s, &mut marker);
        assert!(marker.get_child("Quality").is_none());
        assert_eq!(marker.get::<usize>("signalQuality.BScan.Intervall.End"), Some(3));
        assert!(marker.get_child("artefacts").unwrap().is_empty());
    }
}
