//! 算法运行统计.

use oct_berry::thickness::{ProjectionStats, ThicknessField};
use std::time::{Duration, Instant};

/// 可累加的计时器. 每次 `start` 到 `elapsed` 之间的时长累加到总时长中.
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器, 同时开始计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::from_secs(0),
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时并累加, 返回本段时长.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时长 (微秒).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// ablation/benchmark 数据统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 投影轮数.
    rounds: u64,

    /// 每轮访问的对应关系条数.
    entries: u64,

    /// 每轮因边界线未定义或越界而跳过的条数.
    skipped: u64,

    /// 每轮获得厚度值的像素个数.
    pixels: u64,

    /// 每轮写入已有值像素的次数.
    collisions: u64,

    /// 最后一轮厚度场的平均厚度.
    mean_thickness: Option<f64>,

    /// 填充默认边界线花费的时间.
    fill_time: AccTimer,

    /// 投影花费的总时间.
    project_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一轮投影所消耗的时间.
    most: Duration,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            rounds: 0,
            entries: 0,
            skipped: 0,
            pixels: 0,
            collisions: 0,
            mean_thickness: None,
            fill_time: AccTimer::default(),
            project_time: AccTimer::default(),
            real_time: AccTimer::default(),
            most: Duration::MAX,
        }
    }

    /// 开始填充计时.
    #[inline]
    pub fn fill_start(&mut self) {
        self.fill_time.start();
    }

    /// 结束填充计时.
    #[inline]
    pub fn fill_elapsed(&mut self) {
        self.fill_time.elapsed();
    }

    /// 开始一轮投影计时.
    #[inline]
    pub fn project_start(&mut self) {
        self.project_time.start();
    }

    /// 结束一轮投影计时, 并记录本轮的统计.
    pub fn project_elapsed(&mut self, field: &ThicknessField, stats: &ProjectionStats) {
        let d = self.project_time.elapsed();
        self.most = match self.most {
            Duration::MAX => d,
            once_duration => std::cmp::max(d, once_duration),
        };
        self.rounds += 1;
        self.entries = stats.entries as u64;
        self.skipped = (stats.skipped_undefined + stats.skipped_out_of_range) as u64;
        self.pixels = stats.pixels_written as u64;
        self.collisions = stats.collisions as u64;

        let defined: Vec<f64> = field.values().iter().copied().filter(|v| !v.is_nan()).collect();
        self.mean_thickness = match defined.len() {
            0 => None,
            n => Some(defined.iter().sum::<f64>() / n as f64),
        };
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 获得投影轮数.
    #[inline]
    pub fn get_rounds(&self) -> u64 {
        self.rounds
    }

    /// 获得每轮对应关系条数.
    #[inline]
    pub fn get_entries(&self) -> u64 {
        self.entries
    }

    /// 获得每轮跳过的条数.
    #[inline]
    pub fn get_skipped(&self) -> u64 {
        self.skipped
    }

    /// 获得每轮写入的像素个数.
    #[inline]
    pub fn get_pixels(&self) -> u64 {
        self.pixels
    }

    /// 获得每轮像素冲突次数.
    #[inline]
    pub fn get_collisions(&self) -> u64 {
        self.collisions
    }

    /// 获得最后一轮的平均厚度 (微米).
    #[inline]
    pub fn get_mean_thickness(&self) -> Option<f64> {
        self.mean_thickness
    }

    /// 以微秒为单位获得填充默认边界线的时间.
    #[inline]
    pub fn get_fill_time_us(&self) -> u64 {
        self.fill_time.get_total_us()
    }

    /// 以微秒为单位获得投影的总时间.
    #[inline]
    pub fn get_project_time_us(&self) -> u64 {
        self.project_time.get_total_us()
    }

    /// 以微秒为单位获得算法运行到目前的总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 以微秒为单位获得每轮投影的平均时间.
    #[inline]
    pub fn get_avg_project_time_us(&self) -> Option<f64> {
        match self.rounds {
            0 => None,
            rounds => Some(self.get_project_time_us() as f64 / rounds as f64),
        }
    }

    /// 获取最耗时的一轮投影所消耗的时间.
    ///
    /// 如果不存在任务, 则返回 `None`.
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        match self.most {
            Duration::MAX => None,
            d => Some(d),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
