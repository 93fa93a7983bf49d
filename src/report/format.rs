use std::fmt::Display;

/// Render a millisecond figure for display.
///
/// Below one second this is `"{ms}ms"`. From one second on it is
/// `"{seconds}.{remainder}s"` with the millisecond remainder printed as-is,
/// unpadded: 1500 -> `1.500s`, 2000 -> `2.0s`, 1050 -> `1.50s`.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }
    format!("{}.{}s", ms / 1000, ms % 1000)
}

/// Value or `n/a` for fields the service left out
pub(crate) fn or_na<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
