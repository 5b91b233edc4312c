//! Scalar fields mined from inline `<script>` text.
//!
//! Each [`FieldExtractor`] pairs a pattern with a normalizer that writes into
//! [`ScriptFields`]. Blocks are scanned in document order and every match
//! overwrites the previous value, so the last block mentioning a field wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::convert::{parse_leading_float, round_to_int, seconds_to_duration, speed_to_pace};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptFields {
    pub duration: Option<String>,
    pub duration_seconds: Option<u64>,
    pub calories: Option<f64>,
    pub pace: Option<String>,
    pub pace_seconds_per_km: Option<i64>,
    pub average_heart_rate: Option<i64>,
}

/// Writes the captured payload into the fields. Payloads that do not
/// normalize leave the fields untouched.
pub type Normalizer = fn(&str, &mut ScriptFields);

#[derive(Debug, Clone)]
pub struct FieldExtractor {
    pub name: &'static str,
    /// Must have one capture group holding the payload.
    pub pattern: Regex,
    pub normalize: Normalizer,
}

impl FieldExtractor {
    pub fn new(name: &'static str, pattern: &str, normalize: Normalizer) -> Result<Self, regex::Error> {
        Ok(FieldExtractor {
            name,
            pattern: Regex::new(pattern)?,
            normalize,
        })
    }

    fn apply(&self, block: &str, fields: &mut ScriptFields) -> bool {
        match self.pattern.captures(block).and_then(|c| c.get(1)) {
            Some(payload) => {
                (self.normalize)(payload.as_str(), fields);
                true
            }
            None => false,
        }
    }
}

static DEFAULT_EXTRACTORS: LazyLock<Vec<FieldExtractor>> = LazyLock::new(|| {
    vec![
        FieldExtractor::new("moving_time", r"moving_time:\s*([0-9]+)", moving_time).unwrap(),
        FieldExtractor::new("calories", r"calories:\s*([0-9.]+)", calories).unwrap(),
        FieldExtractor::new("avg_speed", r"avg_speed:\s*([0-9.]+)", avg_speed).unwrap(),
        FieldExtractor::new("avg_hr", r"avg_hr:\s*([0-9.]+)", avg_hr).unwrap(),
    ]
});

fn moving_time(payload: &str, fields: &mut ScriptFields) {
    if let Ok(seconds) = payload.parse::<u64>() {
        fields.duration_seconds = Some(seconds);
        fields.duration = Some(seconds_to_duration(seconds));
    }
}

fn calories(payload: &str, fields: &mut ScriptFields) {
    if let Some(kcal) = parse_leading_float(payload) {
        fields.calories = Some(kcal);
    }
}

// avg_speed is in m/s; a zero speed carries no pace.
fn avg_speed(payload: &str, fields: &mut ScriptFields) {
    if let Some(pace) = parse_leading_float(payload).and_then(speed_to_pace) {
        fields.pace_seconds_per_km = Some(pace.seconds_per_km);
        fields.pace = Some(pace.text);
    }
}

fn avg_hr(payload: &str, fields: &mut ScriptFields) {
    if let Some(bpm) = parse_leading_float(payload) {
        fields.average_heart_rate = Some(round_to_int(bpm));
    }
}

#[derive(Debug, Clone)]
pub struct ScriptScanner {
    extractors: Vec<FieldExtractor>,
}

impl Default for ScriptScanner {
    fn default() -> Self {
        ScriptScanner {
            extractors: DEFAULT_EXTRACTORS.clone(),
        }
    }
}

impl ScriptScanner {
    pub fn new(extractors: Vec<FieldExtractor>) -> Self {
        ScriptScanner { extractors }
    }

    /// Add an extractor; it runs after the existing ones within each block.
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn scan<I, S>(&self, blocks: I) -> ScriptFields
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = ScriptFields::default();
        for (i, block) in blocks.into_iter().enumerate() {
            let block = block.as_ref();
            for extractor in &self.extractors {
                if extractor.apply(block, &mut fields) {
                    trace!("script block {} matched {}", i, extractor.name);
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(blocks: &[&str]) -> ScriptFields {
        ScriptScanner::default().scan(blocks)
    }

    #[test]
    fn all_patterns_in_one_block() {
        let f = scan(&["var a = {moving_time: 1500, calories: 450.7, avg_speed: 3.0, avg_hr: 150.4};"]);
        assert_eq!(f.duration_seconds, Some(1500));
        assert_eq!(f.duration.as_deref(), Some("25min 0s"));
        assert_eq!(f.calories, Some(450.7));
        assert_eq!(f.pace_seconds_per_km, Some(333));
        assert_eq!(f.pace.as_deref(), Some("5:33 /km"));
        assert_eq!(f.average_heart_rate, Some(150));
    }

    #[test]
    fn later_block_wins() {
        let f = scan(&["calories: 100", "nothing here", "calories: 250.5"]);
        assert_eq!(f.calories, Some(250.5));
    }

    #[test]
    fn later_block_overwrites_with_hours() {
        let f = scan(&["moving_time: 60", "moving_time:3725"]);
        assert_eq!(f.duration_seconds, Some(3725));
        assert_eq!(f.duration.as_deref(), Some("1h 2min 5s"));
    }

    #[test]
    fn zero_speed_ignored() {
        let f = scan(&["avg_speed: 0"]);
        assert!(f.pace.is_none());
        assert!(f.pace_seconds_per_km.is_none());

        // a later zero does not erase an earlier pace
        let f = scan(&["avg_speed: 2.5", "avg_speed: 0.0"]);
        assert_eq!(f.pace_seconds_per_km, Some(400));
        assert_eq!(f.pace.as_deref(), Some("6:40 /km"));
    }

    #[test]
    fn heart_rate_rounds_half_up() {
        assert_eq!(scan(&["avg_hr: 150.5"]).average_heart_rate, Some(151));
        assert_eq!(scan(&["avg_hr: 149.49"]).average_heart_rate, Some(149));
    }

    #[test]
    fn only_ascii_digits_match() {
        let f = scan(&["stats = { moving_time: \u{0661}\u{0665}, laps: 2, moving_time: 1500 }"]);
        assert_eq!(f.duration_seconds, Some(1500));
        assert_eq!(f.duration.as_deref(), Some("25min 0s"));

        let f = scan(&["avg_hr: \u{0661}\u{0665}\u{0660}"]);
        assert_eq!(f.average_heart_rate, None);
    }

    #[test]
    fn no_matches_is_all_none() {
        assert_eq!(scan(&["", "window.foo = 1;"]), ScriptFields::default());
        assert_eq!(scan(&[]), ScriptFields::default());
    }

    #[test]
    fn custom_extractor() {
        fn elapsed(payload: &str, fields: &mut ScriptFields) {
            if let Ok(s) = payload.parse::<u64>() {
                fields.duration = Some(format!("elapsed {s}"));
            }
        }
        let scanner = ScriptScanner::new(Vec::new())
            .with_extractor(FieldExtractor::new("elapsed", r"elapsed_time:\s*([0-9]+)", elapsed).unwrap());
        let f = scanner.scan(["elapsed_time: 42, moving_time: 40"]);
        assert_eq!(f.duration.as_deref(), Some("elapsed 42"));
        assert_eq!(f.duration_seconds, None);
    }
}
