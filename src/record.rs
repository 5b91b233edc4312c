use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::config::FieldNames;
use crate::parser::dom::DomFields;
use crate::parser::scripts::ScriptFields;

/// Distance cell of a split: a number when it parses, otherwise the cell text as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Km {
    Number(f64),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub km: Km,
    /// Always carries the `/km` suffix, e.g. `"4:30/km"`.
    pub pace: String,
    pub elevation: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityRecord {
    pub title: Option<String>,
    pub duration: Option<String>,
    pub duration_seconds: Option<u64>,
    pub calories: Option<f64>,
    pub pace: Option<String>,
    pub pace_seconds_per_km: Option<i64>,
    pub average_heart_rate: Option<i64>,
    pub splits: Vec<Split>,
}

/// Merge the three extraction outputs. Script values win; the DOM duration
/// only fills a gap.
pub fn assemble(dom: DomFields, scripts: ScriptFields, splits: Vec<Split>) -> ActivityRecord {
    ActivityRecord {
        title: dom.title,
        duration: scripts.duration.or(dom.duration),
        duration_seconds: scripts.duration_seconds,
        calories: scripts.calories,
        pace: scripts.pace,
        pace_seconds_per_km: scripts.pace_seconds_per_km,
        average_heart_rate: scripts.average_heart_rate,
        splits,
    }
}

impl ActivityRecord {
    pub fn localized<'a>(&'a self, names: &'a FieldNames) -> LocalizedRecord<'a> {
        LocalizedRecord {
            record: self,
            names,
        }
    }

    pub fn to_json_pretty(&self, names: &FieldNames) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.localized(names))
    }
}

/// Serialized view with fixed key order and configurable key names.
pub struct LocalizedRecord<'a> {
    record: &'a ActivityRecord,
    names: &'a FieldNames,
}

impl Serialize for LocalizedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let r = self.record;
        let n = self.names;
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry(&n.title, &r.title)?;
        map.serialize_entry(&n.duration, &r.duration)?;
        map.serialize_entry(&n.duration_seconds, &r.duration_seconds)?;
        map.serialize_entry(&n.calories, &r.calories)?;
        map.serialize_entry(&n.pace, &r.pace)?;
        map.serialize_entry(&n.pace_seconds_per_km, &r.pace_seconds_per_km)?;
        map.serialize_entry(&n.average_heart_rate, &r.average_heart_rate)?;
        map.serialize_entry(&n.splits, &LocalizedSplits::new(&r.splits, n))?;
        map.end()
    }
}

pub struct LocalizedSplits<'a> {
    splits: &'a [Split],
    names: &'a FieldNames,
}

impl<'a> LocalizedSplits<'a> {
    pub fn new(splits: &'a [Split], names: &'a FieldNames) -> Self {
        LocalizedSplits { splits, names }
    }
}

impl Serialize for LocalizedSplits<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.splits.len()))?;
        for split in self.splits {
            seq.serialize_element(&LocalizedSplit {
                split,
                names: self.names,
            })?;
        }
        seq.end()
    }
}

struct LocalizedSplit<'a> {
    split: &'a Split,
    names: &'a FieldNames,
}

impl Serialize for LocalizedSplit<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&self.names.split_km, &self.split.km)?;
        map.serialize_entry(&self.names.split_pace, &self.split.pace)?;
        map.serialize_entry(&self.names.split_elevation, &self.split.elevation)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;

    fn sample() -> ActivityRecord {
        ActivityRecord {
            title: Some("Morning Run".into()),
            duration: Some("25min 0s".into()),
            duration_seconds: Some(1500),
            calories: Some(450.7),
            pace: Some("5:33 /km".into()),
            pace_seconds_per_km: Some(333),
            average_heart_rate: Some(150),
            splits: vec![
                Split {
                    km: Km::Number(1.0),
                    pace: "5:30/km".into(),
                    elevation: Some(2),
                },
                Split {
                    km: Km::Raw("0.4a".into()),
                    pace: "5:45/km".into(),
                    elevation: None,
                },
            ],
        }
    }

    #[test]
    fn key_order_is_fixed() {
        let json = serde_json::to_string(&sample().localized(&FieldNames::default())).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"title":"Morning Run","duration":"25min 0s","duration_seconds":1500,"#,
                r#""calories":450.7,"pace":"5:33 /km","pace_seconds_per_km":333,"#,
                r#""average_heart_rate":150,"splits":[{"km":1.0,"pace":"5:30/km","elevation":2},"#,
                r#"{"km":"0.4a","pace":"5:45/km","elevation":null}]}"#
            )
        );
    }

    #[test]
    fn empty_record_serializes_nulls() {
        let json = serde_json::to_string(&ActivityRecord::default().localized(&FieldNames::default()))
            .unwrap();
        assert_eq!(
            json,
            r#"{"title":null,"duration":null,"duration_seconds":null,"calories":null,"pace":null,"pace_seconds_per_km":null,"average_heart_rate":null,"splits":[]}"#
        );
    }

    #[test]
    fn french_names_same_order() {
        let names = FieldNames::for_locale(Locale::Fr);
        let json = serde_json::to_string(&sample().localized(&names)).unwrap();
        let keys = ["\"titre\"", "\"duree\"", "\"duree_secondes\"", "\"allure\"", "\"segments\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains(r#""denivele":2"#));
    }

    #[test]
    fn dom_duration_only_fills_gap() {
        let dom = DomFields {
            title: Some("Run".into()),
            duration: Some("42:10".into()),
        };
        let scripts = ScriptFields {
            duration: Some("25min 0s".into()),
            duration_seconds: Some(1500),
            ..Default::default()
        };
        let record = assemble(dom.clone(), scripts, Vec::new());
        assert_eq!(record.duration.as_deref(), Some("25min 0s"));

        let record = assemble(dom, ScriptFields::default(), Vec::new());
        assert_eq!(record.duration.as_deref(), Some("42:10"));
        assert_eq!(record.duration_seconds, None);
    }
}
