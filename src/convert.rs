/// Round half up to the nearest integer (`2.5 → 3`, `-2.5 → -2`).
pub fn round_to_int(x: f64) -> i64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// `125 → "2min 5s"`, `3725 → "1h 2min 5s"`. The hour part is omitted when zero.
pub fn seconds_to_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}h {}min {}s", hours, mins, secs)
    } else {
        format!("{}min {}s", mins, secs)
    }
}

/// Pace derived from an average speed in meters per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pace {
    pub seconds_per_km: i64,
    pub text: String,
}

/// Convert m/s into seconds per kilometer and a `"m:ss /km"` label.
///
/// Returns `None` for non-positive or non-finite speeds.
pub fn speed_to_pace(speed_mps: f64) -> Option<Pace> {
    if !speed_mps.is_finite() || speed_mps <= 0.0 {
        return None;
    }
    let seconds_per_km = round_to_int(1000.0 / speed_mps);
    let mins = seconds_per_km.div_euclid(60);
    let secs = seconds_per_km.rem_euclid(60);
    Some(Pace {
        seconds_per_km,
        text: format!("{}:{:02} /km", mins, secs),
    })
}

/// Leading decimal literal of `s`, parsed the way a lenient float reader does:
/// `"450.7"` → 450.7, `"1.2.3"` → 1.2, `"."` → None.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    s[..end].parse::<f64>().ok()
}
