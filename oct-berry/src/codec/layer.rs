//! 分层边界线的读写.
//!
//! 每个 B-scan 一个 `BScan` 节点, 其下每条需要持久化的边界线一个 `Segline` 节点,
//! `Data` 为十六进制编码的压缩采样.

use super::{Diagnostic, LoadReport};
use crate::consts::keys;
use crate::data::BoundaryType;
use crate::layer::{compress, decompress, DefaultBoundarySource, LayerBoundaryStore};
use crate::ptree::PTree;
use crate::{DocumentError, ScanIdx};

const SECTION: &str = keys::LAYER_MODULE;

fn decode_line(data: &str) -> Result<Vec<f64>, DocumentError> {
    let raw = hex::decode(data.trim()).map_err(|e| DocumentError::Blob(e.to_string()))?;
    decompress(&raw)
}

/// 从模块子树读取边界线. 涉及的 B-scan 会先从 `source` 填充, 再以文档中的数据覆盖.
pub fn load_layers(tree: &PTree, store: &mut LayerBoundaryStore, source: &dyn DefaultBoundarySource) -> LoadReport {
    let mut report = LoadReport::default();

    for bscan in tree.children_named(keys::BSCAN) {
        let Some(scan) = bscan.get::<ScanIdx>(keys::ID).filter(|&s| s < store.num_scans()) else {
            report.skip(Diagnostic::MalformedNode {
                section: SECTION.to_owned(),
                field: keys::ID,
                scan: None,
            });
            continue;
        };
        if let Err(e) = store.ensure_filled(scan, source) {
            log::warn!("{e}");
            continue;
        }

        for segline in bscan.children_named(keys::SEGLINE) {
            let Some(name) = segline.get_child(keys::TYPE).map(PTree::value) else {
                report.skip(Diagnostic::MalformedNode {
                    section: SECTION.to_owned(),
                    field: keys::TYPE,
                    scan: Some(scan),
                });
                continue;
            };
            let Ok(kind) = name.trim().parse::<BoundaryType>() else {
                report.skip(Diagnostic::UnknownBoundaryType {
                    scan,
                    name: name.to_owned(),
                });
                continue;
            };
            let Some(data) = segline.get_child(keys::DATA).map(PTree::value) else {
                report.skip(Diagnostic::MalformedNode {
                    section: SECTION.to_owned(),
                    field: keys::DATA,
                    scan: Some(scan),
                });
                continue;
            };
            match decode_line(data) {
                Ok(values) => match store.load_line(scan, kind, values) {
                    Ok(()) => report.lines += 1,
                    Err(e) => log::warn!("{e}"),
                },
                Err(e) => {
                    log::debug!("{e}");
                    report.skip(Diagnostic::CorruptLine { scan, kind });
                }
            }
        }
    }
    report
}

/// 把被编辑过或读取自文档的边界线写入模块子树. 子树中原有的 `BScan` 节点被替换.
pub fn save_layers(store: &LayerBoundaryStore, tree: &mut PTree) -> Result<(), DocumentError> {
    let mut bscans = Vec::new();
    for (scan, data) in store.iter().enumerate() {
        let kinds: Vec<BoundaryType> = BoundaryType::ALL
            .into_iter()
            .filter(|&k| store.is_persistent(scan, k))
            .collect();
        if kinds.is_empty() {
            continue;
        }

        let mut bscan = PTree::new();
        bscan.add(keys::ID, PTree::with_value(scan.to_string()));
        for kind in kinds {
            let blob = hex::encode(compress(data.line(kind))?);
            let segline = bscan.add(keys::SEGLINE, PTree::new());
            segline.add(keys::TYPE, PTree::with_value(kind.name()));
            segline.add(keys::DATA, PTree::with_value(blob));
        }
        bscans.push(bscan);
    }

    tree.erase(keys::BSCAN);
    for bscan in bscans {
        tree.add(keys::BSCAN, bscan);
    }
    Ok(())
}
