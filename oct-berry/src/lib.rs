#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供 OCT 体数据 (一组 B-scan 与一张眼底参考图像) 的标注状态引擎.
//!
//! 该 crate 不负责窗口、绘制、事件分发以及 OCT 文件格式本身, 只维护标注数据,
//! 并对外暴露协作者接口 (默认分层线来源、空间对应表、色表).
//!
//! # 注意
//!
//! 1. 所有状态都挂在一个 [`MarkerSession`] 上, 每加载一个 series 就新建一个.
//!   不存在任何全局可变单例.
//! 2. 引擎内部不加锁. 同一时刻只允许一个交互编辑或一次读写文档操作,
//!   该约束由调用方保证.
//! 3. 除 [`codec`] 中的文件读写外, 不进行任何 I/O.
//!
//! # 开发计划
//!
//! ### B-scan 区间标记 ✅
//!
//! 每个标记集合 (如 `signalQuality`) 在每个 B-scan 上维护一组互不重叠的
//! `[start, end) -> label` 区间, 相邻同标签区间自动合并.
//!
//! 实现位于 `oct-berry/src/interval`.
//!
//! ### 分层边界线存储与编辑 ✅
//!
//! 每个 B-scan 的每种边界线按列采样, NaN 表示未定义. 首次访问时从默认分层线惰性填充.
//! 提供钢笔与样条两种编辑方式, 所有交互修改都通过区段补丁进入撤销栈.
//!
//! 实现位于 `oct-berry/src/layer`.
//!
//! ### 自然三次样条 ✅
//!
//! 样条编辑所需的曲线插值. 三对角方程组直接追赶求解, 不依赖线性代数后端.
//!
//! 实现位于 `oct-berry/src/fitting`.
//!
//! ### 厚度图 ✅
//!
//! 借助外部提供的空间对应表, 将每个 B-scan 上两条边界线的距离投影到眼底参考图像上,
//! 再经色表着色. 同一像素被多次命中时默认取平均值.
//!
//! 实现位于 `oct-berry/src/thickness`.
//!
//! ### 标注文档 ✅
//!
//! 与 boost property tree 语义一致的层级文档 [`PTree`], 支持 XML / JSON 文件格式,
//! 以及区间标记和分层线的双向编解码. 兼容旧版 `Quality` 键.
//!
//! 实现位于 `oct-berry/src/ptree` 与 `oct-berry/src/codec`.
//!
//! ### 会话与快捷键 ✅
//!
//! 实现位于 `oct-berry/src/session`.

/// B-scan 索引.
pub type ScanIdx = usize;

/// 参考图像 (眼底图) 上的像素坐标 `(x, y)`.
pub type Pixel = (u32, u32);

pub mod consts;

mod error;

pub use error::{DocumentError, MarkerError, MarkerResult, MissingCollaborator};

mod data;

pub use data::{is_undefined, BoundaryType, SeriesInfo, UNDEFINED};

pub mod interval;

pub mod layer;

pub mod fitting;

pub mod thickness;

pub mod ptree;

pub use ptree::PTree;

pub mod codec;

pub mod options;

pub use options::Options;

pub mod session;

pub use session::{MarkerEvent, MarkerSession};

pub mod prelude;
