use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const SWEDISH: &str = "sv";
pub const ENGLISH: &str = "en";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new(SWEDISH, ENGLISH)
    }
}

/// One persisted translation. Field names on disk follow the history file
/// layout: `id`, `timestamp`, `original`, `translated`, `from`, `to`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub id: i64,

    pub timestamp: String,

    pub original: String,

    #[serde(default)]
    pub translated: String,

    #[serde(rename = "from")]
    pub source_language: String,

    #[serde(rename = "to")]
    pub target_language: String,
}

impl TranslationRecord {
    pub fn new(original: String, translated: String, pair: &LanguagePair) -> Self {
        Self::at(Utc::now(), original, translated, pair)
    }

    pub fn at(
        now: DateTime<Utc>,
        original: String,
        translated: String,
        pair: &LanguagePair,
    ) -> Self {
        Self {
            id: now.timestamp_millis(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            original,
            translated,
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_uses_millis_and_iso_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let rec = TranslationRecord::at(
            now,
            "Hej".to_string(),
            "Hi".to_string(),
            &LanguagePair::default(),
        );

        assert_eq!(rec.id, now.timestamp_millis());
        assert_eq!(rec.timestamp, "2024-03-01T12:30:05.000Z");
        assert_eq!(rec.source_language, "sv");
        assert_eq!(rec.target_language, "en");
    }

    #[test]
    fn test_record_serializes_with_from_and_to() {
        let rec = TranslationRecord {
            id: 1,
            timestamp: "2024-03-01T12:30:05.000Z".to_string(),
            original: "Tack".to_string(),
            translated: "Thanks".to_string(),
            source_language: "sv".to_string(),
            target_language: "en".to_string(),
        };

        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["from"], "sv");
        assert_eq!(v["to"], "en");
        assert!(v.get("source_language").is_none());
    }

    #[test]
    fn test_record_accepts_missing_translation() {
        let raw = r#"{"id":7,"timestamp":"t","original":"x","from":"sv","to":"en"}"#;
        let rec: TranslationRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.translated, "");
    }
}
