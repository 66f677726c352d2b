//! 程序运行函数.

use crate::result::AblationResult;
use std::thread;
use utils::loader;

/// 实际运行.
pub fn run() -> AblationResult {
    let scale = loader::scale_from_env_or_default();
    assert!(scale.scans > 0 && scale.width > 0, "Empty synthetic series: {scale:?}");

    log::info!("Running ablation studies on {scale:?}...");
    thread::scope(|s| {
        use super::algos::*;

        let handles = [average, last_write].map(|t| s.spawn(move || t(scale)));

        AblationResult::from_iter(
            ["average", "last-write"].into_iter().zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}
