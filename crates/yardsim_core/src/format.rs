//! Display formatting for times, percentages and money

/// `mm:ss` clock, flooring fractional seconds
pub fn fmt_clock(sec: f64) -> String {
    let s = sec.max(0.0).floor() as u64;
    format!("{:02}:{:02}", s / 60, s % 60)
}

/// Compact duration (`1h 5m`, `2m 30s`, `45s`), or an em dash when missing
pub fn fmt_hms(sec: Option<f64>) -> String {
    let Some(sec) = sec else {
        return "—".to_string();
    };
    let s = sec.max(0.0).round() as u64;
    let (h, m, ss) = (s / 3600, (s % 3600) / 60, s % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {ss}s")
    } else {
        format!("{ss}s")
    }
}

/// Fraction as a whole percentage
pub fn fmt_pct(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round())
}

/// Millions of dollars, two decimals under $10M
pub fn fmt_money_m(millions: f64) -> String {
    let v = millions.max(0.0);
    if v < 10.0 {
        format!("${v:.2}M")
    } else {
        format!("${v:.1}M")
    }
}
