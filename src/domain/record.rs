use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type RecordId = i64;
pub type Points = i64;

/// User credited when a request doesn't name one.
pub const DEFAULT_USER: &str = "default-user";

/// Second demo tenant seeded alongside the default user on first run.
pub const DEMO_USER: &str = "demo-user";

/// A single entry in the points ledger.
/// Records are immutable - corrections are made by appending compensating deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsRecord {
    pub id: RecordId,
    /// Owner of the delta; a user may have many records
    pub user: String,
    /// Signed delta: positive for a gain, negative for a reduction
    pub points: Points,
    /// Human-readable description
    pub description: Option<String>,
    /// When the record was inserted (assigned by the service, never by callers)
    #[serde(with = "wire_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Aggregate of a user's deltas for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoints {
    pub date: NaiveDate,
    pub points: Points,
}

/// Serde adapter for the `"YYYY-MM-DD HH:MM:SS"` timestamp format used on the wire.
pub mod wire_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&s, FORMAT).map_err(de::Error::custom)?;
        Ok(naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn sample_record() -> PointsRecord {
        PointsRecord {
            id: 7,
            user: DEFAULT_USER.to_string(),
            points: 10,
            description: Some("initial points".to_string()),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 20)
                .unwrap()
                .and_hms_opt(15, 30, 0)
                .unwrap()
                .and_utc(),
        }
    }

    #[test]
    fn test_record_serializes_wire_timestamp() {
        let value = serde_json::to_value(sample_record()).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["user"], DEFAULT_USER);
        assert_eq!(value["points"], 10);
        assert_eq!(value["description"], "initial points");
        assert_eq!(value["created_at"], "2024-01-20 15:30:00");
    }

    #[test]
    fn test_record_timestamp_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: PointsRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.created_at, record.created_at);
    }

    #[test]
    fn test_record_rejects_malformed_timestamp() {
        let value = json!({
            "id": 1,
            "user": "someone",
            "points": 5,
            "description": null,
            "created_at": "2024-01-20T15:30:00Z",
        });

        assert!(serde_json::from_value::<PointsRecord>(value).is_err());
    }

    #[test]
    fn test_daily_points_date_format() {
        let bucket = DailyPoints {
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            points: 15,
        };

        let value = serde_json::to_value(&bucket).unwrap();
        assert_eq!(value["date"], "2024-01-20");
        assert_eq!(value["points"], 15);
    }
}
