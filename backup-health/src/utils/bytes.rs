//! Human-readable byte quantities.

/// Render a file size for the health report, e.g. `1.50 KB`.
///
/// Binary units (1024) with two decimals; TB is the largest unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Render a generation-to-generation size change, always carrying its sign
/// so growth and shrinkage read differently in the report.
pub fn format_delta(delta: i64) -> String {
    let sign = if delta < 0 { '-' } else { '+' };
    format!("{}{}", sign, format_bytes(delta.unsigned_abs()))
}
