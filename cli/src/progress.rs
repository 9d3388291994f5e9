use crate::common::format_large_number;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mrc_economy::PlayerState;
use std::time::Instant;

/// Live status line for a game session
///
/// The bar tracks experience towards the next threshold level-up; the
/// message carries balance, level and rate.
pub struct StatusDisplay {
    bar: ProgressBar,
    start_time: Instant,
    xp_per_level: u64,
}

impl StatusDisplay {
    pub fn new(xp_per_level: u64) -> Self {
        let bar = ProgressBar::new(xp_per_level);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] XP [{bar:20.magenta/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        bar.set_style(style);
        bar.set_message("Waiting for first mine...");

        Self {
            bar,
            start_time: Instant::now(),
            xp_per_level,
        }
    }

    pub fn update(&self, state: &PlayerState) {
        self.bar.set_position(state.experience_progress(self.xp_per_level));
        self.bar.set_message(status_line(state));
        self.bar.tick();
    }

    /// Print a line above the bar without tearing it
    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line.as_ref());
    }

    pub fn finish_with_summary(&self, state: &PlayerState) {
        let elapsed = self.start_time.elapsed().as_secs().max(1);
        self.bar.finish_with_message(format!(
            "✅ Session over: {} MRC mined in {}s (level {})",
            format_large_number(state.total_mined),
            elapsed,
            state.level
        ));
    }
}

/// One-line summary of a player state
pub fn status_line(state: &PlayerState) -> String {
    let status = if state.is_active {
        style("ACTIVE").green().bold()
    } else {
        style("PAUSED").red()
    };
    let upgrade = if state.can_upgrade() {
        style(format!("upgrade {} ready", state.upgrade_cost)).yellow().bold()
    } else {
        style(format!("next upgrade {}", state.upgrade_cost))
    };
    format!(
        "💰 {} MRC | LVL {} | +{}/click | {} | {}",
        style(format_large_number(state.balance)).cyan().bold(),
        state.level,
        state.mining_rate,
        upgrade,
        status
    )
}
