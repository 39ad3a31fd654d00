//! Display helpers for currency amounts.

/// Format an amount as Indonesian Rupiah with `.` thousands separators,
/// rounded to whole units: `1275.0 -> "Rp 1.275"`.
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Format a ratio as a whole percentage: `0.15 -> "15%"`.
pub fn format_percent(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round())
}
