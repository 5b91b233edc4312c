pub mod dom;
pub mod page;
pub mod scripts;
pub mod splits;

pub use page::Page;

use crate::record::{self, ActivityRecord, Split};
use scripts::ScriptScanner;

/// Full pass: script text → DOM title/fallback → splits table → record.
pub fn extract_activity(page: &Page) -> ActivityRecord {
    extract_activity_with(page, &ScriptScanner::default())
}

pub fn extract_activity_with(page: &Page, scanner: &ScriptScanner) -> ActivityRecord {
    let scripts = scanner.scan(page.scripts());
    let dom = dom::extract(page, scripts.duration.is_none());
    let splits = splits::extract(page);
    record::assemble(dom, scripts, splits)
}

/// Splits-only pass, re-run while the table is still rendering.
pub fn extract_splits(page: &Page) -> Vec<Split> {
    splits::extract(page)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldNames;
    use crate::record::Km;

    fn parse(fixture: &str) -> Page {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        Page::parse(&html)
    }

    #[test]
    fn full_activity() {
        let r = extract_activity(&parse("activity_full"));
        assert_eq!(r.title.as_deref(), Some("Morning Run"));
        assert_eq!(r.duration_seconds, Some(1500));
        assert_eq!(r.duration.as_deref(), Some("25min 0s"));
        assert_eq!(r.pace_seconds_per_km, Some(333));
        assert_eq!(r.pace.as_deref(), Some("5:33 /km"));
        assert_eq!(r.average_heart_rate, Some(150));
        assert_eq!(r.calories, Some(450.7));
        assert_eq!(
            r.splits,
            vec![
                Split {
                    km: Km::Number(1.0),
                    pace: "5:30/km".into(),
                    elevation: Some(2),
                },
                Split {
                    km: Km::Number(2.0),
                    pace: "5:45/km".into(),
                    elevation: None,
                },
            ]
        );
    }

    #[test]
    fn full_activity_json() {
        let r = extract_activity(&parse("activity_full"));
        let json = r.to_json_pretty(&FieldNames::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["duration"], "25min 0s");
        assert_eq!(value["splits"][1]["elevation"], serde_json::Value::Null);
        assert!(json.find("\"title\"").unwrap() < json.find("\"splits\"").unwrap());
    }

    #[test]
    fn pending_splits_and_dom_duration() {
        let r = extract_activity(&parse("activity_pending"));
        assert_eq!(r.title.as_deref(), Some("Hill Repeats"));
        // no moving_time in scripts: rendered text is used verbatim
        assert_eq!(r.duration.as_deref(), Some("48:20"));
        assert_eq!(r.duration_seconds, None);
        // later script block wins
        assert_eq!(r.calories, Some(612.0));
        // avg_speed: 0 emits no pace
        assert_eq!(r.pace, None);
        assert!(r.splits.is_empty());
    }

    #[test]
    fn splits_only_matches_full_pass() {
        let page = parse("activity_full");
        assert_eq!(extract_splits(&page), extract_activity(&page).splits);
    }
}
