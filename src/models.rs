use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Report status. The serialized spellings are part of the slot format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Received,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Received => "Received",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One citizen-submitted cleanliness complaint.
///
/// `desc` and `imageData` are the field names of the browser prototype's
/// slot and are still accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(alias = "desc")]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, alias = "imageData")]
    pub image: Option<String>,
    pub status: ReportStatus,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub before_photo: Option<String>,
    #[serde(default)]
    pub after_photo: Option<String>,
    #[serde(with = "timestamp_millis")]
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn is_assigned(&self) -> bool {
        self.agent.is_some()
    }

    pub fn has_proof(&self) -> bool {
        self.before_photo.is_some() || self.after_photo.is_some()
    }
}

/// Citizen input for a new report.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub description: String,
    pub category: String,
    pub urgency: String,
    pub location: Option<String>,
    pub image: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// RFC 3339, millisecond precision, `Z` suffix.
mod timestamp_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
