mod profile;

use oct_berry::prelude::*;
use oct_berry::thickness::project;
use utils::loader::{self, Scale, WavyDefaults};

pub use profile::Profile;

/// 每种策略重复投影的轮数.
const ROUNDS: usize = 5;

/// 相邻 B-scan 在参考图像上重叠的行数.
const OVERLAP: u32 = 4;

/// 在合成 series 上以 `policy` 反复投影 ILM-BM 厚度.
fn run_policy(name: &str, policy: PixelPolicy, scale: Scale) -> Profile {
    let mut profile = Profile::new();
    let series = loader::series(scale);
    let defaults = WavyDefaults::new(scale.width, 37);
    let map = loader::raster_map(scale, OVERLAP);

    let mut store = LayerBoundaryStore::new(&series);
    profile.fill_start();
    store.fill_all(&defaults);
    profile.fill_elapsed();

    let params = ProjectionParams {
        upper: BoundaryType::Ilm,
        lower: BoundaryType::Bm,
        scale: series.depth_mm() * 1000.0,
        policy,
    };
    for round in 0..ROUNDS {
        log::info!("{name}: round {round}...");
        profile.project_start();
        let Some((field, stats)) = project(&store, &map, &params, None) else {
            log::warn!("{name}: round {round} cancelled");
            continue;
        };
        profile.project_elapsed(&field, &stats);
    }
    profile.finish()
}

pub fn average(scale: Scale) -> Profile {
    run_policy("Average", PixelPolicy::Average, scale)
}

pub fn last_write(scale: Scale) -> Profile {
    run_policy("LastWrite", PixelPolicy::LastWrite, scale)
}
