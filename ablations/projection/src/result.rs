//! 实验结果.

use crate::algos::Profile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    #[inline]
    fn u64_to_display(u: Option<u64>) -> String {
        match u {
            Some(u) => u.to_string(),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Rounds: {}", p.get_rounds())?;
    writeln!(w, "{S4}Correspondences per round: {}", p.get_entries())?;
    writeln!(w, "{S4}Skipped per round: {}", p.get_skipped())?;
    writeln!(w, "{S4}Pixels written per round: {}", p.get_pixels())?;
    writeln!(w, "{S4}Collisions per round: {}", p.get_collisions())?;
    writeln!(w, "{S4}Mean thickness: {} um", f64_to_display(p.get_mean_thickness()))?;
    writeln!(w, "{S4}Fill time: {} us", p.get_fill_time_us())?;
    writeln!(w, "{S4}Projection total time: {} us", p.get_project_time_us())?;
    writeln!(
        w,
        "{S4}Projection average time: {} us",
        f64_to_display(p.get_avg_project_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as u64);
    write!(w, "{S4}Slowest round costs {} us", u64_to_display(t))?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        utils::sep_to(&mut out)?;

        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut out)?;
            writeln!(out)?;
            utils::sep_to(&mut out)?;
        }

        if let [(_, avg), (_, last)] = self.data.as_slice() {
            if let (Some(a), Some(b)) = (avg.get_mean_thickness(), last.get_mean_thickness()) {
                writeln!(out, "Mean thickness difference: {:.6} um", (a - b).abs())?;
            }
        }
        Ok(())
    }
}
