//! 边界线的压缩存储.
//!
//! 单条边界线编码为 zlib 压缩的 bincode `Vec<f64>`; 整个存储可以导出为同样格式的二进制文件.

use super::LayerBoundaryStore;
use crate::DocumentError;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

fn blob_err(e: impl std::fmt::Display) -> DocumentError {
    DocumentError::Blob(e.to_string())
}

/// 序列化并压缩.
pub(crate) fn compress<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, DocumentError> {
    let raw = bincode::serialize(value).map_err(blob_err)?;
    let mut e = ZlibEncoder::new(Vec::with_capacity(raw.len() / 2 + 8), Compression::best());
    e.write_all(&raw).map_err(blob_err)?;
    e.finish().map_err(blob_err)
}

/// 解压缩并反序列化.
pub(crate) fn decompress<T: DeserializeOwned>(buf: &[u8]) -> Result<T, DocumentError> {
    let mut d = ZlibDecoder::new(buf);
    let mut raw = Vec::with_capacity(buf.len() * 4);
    d.read_to_end(&mut raw).map_err(blob_err)?;
    bincode::deserialize(&raw).map_err(blob_err)
}

/// 将整个边界线存储导出为二进制文件.
pub fn save_segmentation_bin(store: &LayerBoundaryStore, path: impl AsRef<Path>) -> Result<(), DocumentError> {
    let path = path.as_ref();
    let io_err = |source| DocumentError::Io {
        operation: "写入",
        path: path.to_path_buf(),
        source,
    };
    let buf = compress(store)?;
    let mut w = BufWriter::new(File::create(path).map_err(io_err)?);
    w.write_all(&buf).map_err(io_err)?;
    w.flush().map_err(io_err)?;
    log::debug!("边界线已导出到 {}", path.display());
    Ok(())
}

/// 读取 [`save_segmentation_bin`] 导出的二进制文件.
pub fn load_segmentation_bin(path: impl AsRef<Path>) -> Result<LayerBoundaryStore, DocumentError> {
    let path = path.as_ref();
    let io_err = |source| DocumentError::Io {
        operation: "读取",
        path: path.to_path_buf(),
        source,
    };
    let mut buf = Vec::new();
    BufReader::new(File::open(path).map_err(io_err)?)
        .read_to_end(&mut buf)
        .map_err(io_err)?;
    decompress(&buf)
}

#[cfg(test)]
mod tests {
    use super::{compress, decompress, load_segmentation_bin, save_segmentation_bin};
    use crate::data::{BoundaryType, SeriesInfo};
    use crate::layer::LayerBoundaryStore;
    use crate::DocumentError;

    #[test]
    fn test_line_blob_keeps_nan() {
        let line = vec![1.5, f64::NAN, -3.0];
        let back: Vec<f64> = decompress(&compress(&line).unwrap()).unwrap();
        assert_eq!(back[0], 1.5);
        assert!(back[1].is_nan());
        assert_eq!(back[2], -3.0);
    }

    #[test]
    fn test_corrupt_blob_is_error() {
        let r: Result<Vec<f64>, _> = decompress(b"not zlib at all");
        assert!(matches!(r, Err(DocumentError::Blob(_))));
    }

    #[test]
    fn test_store_file() {
        let mut s = LayerBoundaryStore::new(&SeriesInfo::new(vec![3, 5], 0.0039));
        s.set_range(1, BoundaryType::I8T3, 2, &[7.0, 8.0]).unwrap();
        let path = std::env::temp_dir().join(format!("oct-berry-seg-{}.bin", std::process::id()));
        save_segmentation_bin(&s, &path).unwrap();
        let back = load_segmentation_bin(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.samples(1, BoundaryType::I8T3).unwrap()[2..4], [7.0, 8.0]);
        assert!(back.samples(1, BoundaryType::I8T3).unwrap()[4].is_nan());
        assert_eq!(back.scan(0).unwrap().width(), 3);
        assert!(back.scan(1).unwrap().is_modified(BoundaryType::I8T3));
    }
}
