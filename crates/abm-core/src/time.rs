//! Simulation time model.
//!
//! Time is seconds since midnight of the simulated day, stored as `f64`.
//! Values past 24:00:00 are legal (late-evening trips spill over midnight).
//! Plan files may carry times either as raw seconds or as `HH:MM[:SS]`.

use crate::{CoreError, CoreResult};

/// Seconds in one simulated day.
pub const DAY_SECS: f64 = 86_400.0;

/// Seconds in one hour.
pub const HOUR_SECS: f64 = 3_600.0;

/// Parse a time given as raw seconds (`"28800"`, `"28800.5"`) or as
/// `HH:MM` / `HH:MM:SS` (`"08:00:00"`).  Hours may exceed 23.
pub fn parse_time(s: &str) -> CoreResult<f64> {
    let s = s.trim();
    if !s.contains(':') {
        return s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| CoreError::InvalidTime(s.to_owned()));
    }

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(CoreError::InvalidTime(s.to_owned()));
    }
    let field = |p: &str| p.parse::<u32>().map_err(|_| CoreError::InvalidTime(s.to_owned()));
    let h = field(parts[0])?;
    let m = field(parts[1])?;
    let sec = if parts.len() == 3 { field(parts[2])? } else { 0 };
    if m >= 60 || sec >= 60 {
        return Err(CoreError::InvalidTime(s.to_owned()));
    }
    Ok(h as f64 * HOUR_SECS + m as f64 * 60.0 + sec as f64)
}

/// Format seconds as `HH:MM:SS`, truncating fractional seconds.
pub fn format_hms(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let h = total / 3_600;
    let m = (total % 3_600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
