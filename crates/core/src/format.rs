//! Compact number formatting for displayed counters.

/// Format a counter the way the landing page shows it.
///
/// Values of at least one million render as millions with one decimal and
/// an `M` suffix, values of at least one thousand as thousands with a `K`
/// suffix, anything smaller as a plain integer. A trailing `.0` is dropped
/// and the decimal is rounded half-up.
pub fn format_count(value: u64) -> String {
    if value >= 1_000_000 {
        scaled(value, 1_000_000, 'M')
    } else if value >= 1_000 {
        scaled(value, 1_000, 'K')
    } else {
        value.to_string()
    }
}

fn scaled(value: u64, divisor: u64, suffix: char) -> String {
    let tenths = (u128::from(value) * 10 + u128::from(divisor) / 2) / u128::from(divisor);
    let (whole, frac) = (tenths / 10, tenths % 10);
    if frac == 0 { format!("{whole}{suffix}") } else { format!("{whole}.{frac}{suffix}") }
}
