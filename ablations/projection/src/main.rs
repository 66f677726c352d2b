//! 厚度图投影中像素冲突策略的消融实验: 平均值 vs 最后写入.

mod algos;
mod result;
mod runner;

fn main() -> std::io::Result<()> {
    simple_logger::init_with_level(log::Level::Info).expect("Logger initialization error");
    runner::run().analyze()
}
