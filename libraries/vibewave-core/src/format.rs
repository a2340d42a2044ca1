//! Display helpers

/// Format seconds as `m:ss`.
///
/// Non-finite and negative inputs render as `0:00`.
///
/// ```
/// use vibewave_core::format::format_seconds;
///
/// assert_eq!(format_seconds(0.0), "0:00");
/// assert_eq!(format_seconds(65.9), "1:05");
/// assert_eq!(format_seconds(f64::NAN), "0:00");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
