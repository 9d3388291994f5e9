use mrc_economy::{LedgerConfig, PlayerState};

pub fn format_large_number(n: u64) -> String {
    if n >= 1_000_000_000_000 {
        format!("{:.2}T", n as f64 / 1_000_000_000_000.0)
    } else if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render ledger base units as whole tokens with up to four decimals.
pub fn format_token_amount(units: u128, config: &LedgerConfig) -> String {
    let unit = config.unit();
    let whole = units / unit;
    let frac = units % unit;
    if frac == 0 {
        return format!("{} {}", whole, config.symbol);
    }
    let scale = unit / 10_000;
    let frac4 = if scale == 0 { frac } else { frac / scale };
    let digits = format!("{:04}", frac4);
    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{} {}", whole, config.symbol)
    } else {
        format!("{}.{} {}", whole, trimmed, config.symbol)
    }
}

/// Multi-line summary printed at the end of a session
pub fn print_state(state: &PlayerState) {
    println!("📊 Mining Statistics");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("💰 Balance:      {} MRC", format_large_number(state.balance));
    println!("⭐ Level:        {}", state.level);
    println!("⛏️  Mining Rate:  {}/click", state.mining_rate);
    println!("🔧 Upgrade Cost: {}", state.upgrade_cost);
    println!("📦 Total Mined:  {}", format_large_number(state.total_mined));
    println!("✨ Experience:   {}", state.experience);
    println!(
        "🔌 Status:       {}",
        if state.is_active { "ACTIVE" } else { "PAUSED" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(999), "999");
        assert_eq!(format_large_number(1_500), "1.50K");
        assert_eq!(format_large_number(2_000_000), "2.00M");
    }

    #[test]
    fn test_format_token_amount() {
        let config = LedgerConfig::default();
        let unit = config.unit();
        assert_eq!(format_token_amount(5 * unit, &config), "5 MRC");
        assert_eq!(format_token_amount(unit * 11 / 10, &config), "1.1 MRC");
        assert_eq!(format_token_amount(1, &config), "0 MRC");
    }
}
