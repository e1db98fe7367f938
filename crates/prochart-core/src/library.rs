//! Saved chart records and the library gateway that browses them.
//!
//! The persistence collaborator hands back raw JSON records. Those may be truncated, written by
//! older versions, or carry hand-edited timestamps, so the gateway validates and repairs each
//! record on its own: a bad record is dropped with a diagnostic, never the whole listing.

use crate::archetype::ChartArchetype;
use crate::store::ChartStore;
use crate::theme::Theme;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Summary of what a chart was built from; enough to re-run the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub archetype: ChartArchetype,
    #[serde(default)]
    pub product_refs: Vec<String>,
    #[serde(default)]
    pub parameter_names: Vec<String>,
    #[serde(default)]
    pub theme: Theme,
}

impl ChartConfig {
    /// Short human-readable description used in reuse events.
    pub fn data_summary(&self) -> String {
        format!(
            "{} products · {} parameters: {}",
            self.product_refs.len(),
            self.parameter_names.len(),
            self.parameter_names.join(", ")
        )
    }
}

/// Rasterized artifacts as `data:` URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImages {
    pub full_image: String,
    pub thumbnail_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChartRecord {
    pub id: String,
    pub title: String,
    pub config: ChartConfig,
    #[serde(default)]
    pub full_image: String,
    #[serde(default)]
    pub thumbnail_image: String,
    pub created_at: DateTime<Utc>,
}

impl SavedChartRecord {
    /// Builds a fresh record with a random id.
    pub fn new(
        title: impl Into<String>,
        config: ChartConfig,
        images: ExportedImages,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            config,
            full_image: images.full_image,
            thumbnail_image: images.thumbnail_image,
            created_at,
        }
    }

    pub fn reuse_event(&self) -> ReuseEvent {
        ReuseEvent {
            archetype: self.config.archetype,
            title: self.title.clone(),
            image_url: self.full_image.clone(),
            data_summary: self.config.data_summary(),
        }
    }

    /// Payload consumed by the content editor to embed the chart inline.
    pub fn insert_event(&self) -> InsertChartEvent {
        InsertChartEvent {
            kind: ASSET_KIND_CHART.to_string(),
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.full_image.clone(),
            archetype: self.config.archetype,
            data: self.config.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReuseEvent {
    pub archetype: ChartArchetype,
    pub title: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub data_summary: String,
}

pub const ASSET_KIND_CHART: &str = "chart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertChartEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: String,
    pub url: String,
    pub archetype: ChartArchetype,
    pub data: ChartConfig,
}

/// Parses a drag-and-drop asset payload. Anything that is not a well-formed chart asset yields
/// `None`; other asset kinds belong to other consumers.
pub fn parse_asset_drop(payload: &str) -> Option<InsertChartEvent> {
    let value: Value = serde_json::from_str(payload).ok()?;
    if value.get("type").and_then(Value::as_str) != Some(ASSET_KIND_CHART) {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Earliest and latest timestamps accepted for display.
fn time_floor() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn time_ceiling() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Creation time as shown in the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "lowercase")]
pub enum DisplayTime {
    Known(DateTime<Utc>),
    /// Parsed, but outside `[1970, 2100)`.
    Unknown,
}

impl DisplayTime {
    pub fn label(&self) -> String {
        match self {
            DisplayTime::Known(t) => t.format("%Y-%m-%d %H:%M").to_string(),
            DisplayTime::Unknown => "unknown time".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub record: SavedChartRecord,
    pub display_time: DisplayTime,
    /// Whether `createdAt` had to be substituted.
    pub repaired: bool,
}

/// Why a stored record was discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDefect {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing or empty field `{0}`")]
    MissingField(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

enum ParsedTime {
    Valid(DateTime<Utc>),
    OutOfRange(DateTime<Utc>),
    Invalid,
}

fn parse_timestamp(value: Option<&Value>) -> ParsedTime {
    let parsed = match value {
        Some(Value::String(s)) => parse_time_str(s),
        Some(Value::Number(n)) => n.as_f64().and_then(millis_to_datetime),
        _ => None,
    };
    match parsed {
        Some(t) if t >= time_floor() && t < time_ceiling() => ParsedTime::Valid(t),
        Some(t) => ParsedTime::OutOfRange(t),
        None => ParsedTime::Invalid,
    }
}

fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() || ms.abs() > 8.64e15 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)
}

fn parse_time_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
        }
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<f64>().ok().and_then(millis_to_datetime);
    }
    None
}

/// Validates and repairs one stored record.
///
/// `now` replaces a missing or unparseable `createdAt`; passing the same `now` makes the pass
/// idempotent.
pub fn repair_record(raw: &Value, now: DateTime<Utc>) -> std::result::Result<LibraryEntry, RecordDefect> {
    let obj = raw.as_object().ok_or(RecordDefect::NotAnObject)?;
    let id = crate::store::record_id(raw)
        .filter(|id| !id.trim().is_empty())
        .ok_or(RecordDefect::MissingField("id"))?;
    let title = match obj.get("title") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(RecordDefect::MissingField("title")),
    };
    let config = match obj.get("config") {
        Some(v @ Value::Object(_)) => serde_json::from_value::<ChartConfig>(v.clone())
            .map_err(|e| RecordDefect::InvalidConfig(e.to_string()))?,
        _ => return Err(RecordDefect::MissingField("config")),
    };
    let image = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let (created_at, display_time, repaired) = match parse_timestamp(obj.get("createdAt")) {
        ParsedTime::Valid(t) => (t, DisplayTime::Known(t), false),
        ParsedTime::OutOfRange(t) => (t, DisplayTime::Unknown, false),
        ParsedTime::Invalid => (now, DisplayTime::Known(now), true),
    };

    Ok(LibraryEntry {
        record: SavedChartRecord {
            id,
            title,
            config,
            full_image: image("fullImage"),
            thumbnail_image: image("thumbnailImage"),
            created_at,
        },
        display_time,
        repaired,
    })
}

/// Repairs every record, discarding (and logging) the ones that cannot be salvaged.
pub fn repair_records(raw: &[Value], now: DateTime<Utc>) -> Vec<LibraryEntry> {
    let mut out = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        match repair_record(value, now) {
            Ok(entry) => {
                if entry.repaired {
                    tracing::info!(id = %entry.record.id, "repaired chart record createdAt");
                }
                out.push(entry);
            }
            Err(defect) => {
                let id = value.get("id").map(|v| v.to_string()).unwrap_or_default();
                tracing::warn!(index, id, %defect, "discarding malformed chart record");
            }
        }
    }
    out
}

/// Library filter. Empty search matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryQuery {
    pub archetype: Option<ChartArchetype>,
    pub search: String,
}

impl LibraryQuery {
    pub fn matches(&self, record: &SavedChartRecord) -> bool {
        if let Some(a) = self.archetype {
            if record.config.archetype != a {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record.title.to_lowercase().contains(&needle)
            || record
                .config
                .parameter_names
                .iter()
                .any(|p| p.to_lowercase().contains(&needle))
    }
}

/// Filters and orders entries newest first; unknown times sort last, ties by id.
pub fn browse_entries(entries: Vec<LibraryEntry>, query: &LibraryQuery) -> Vec<LibraryEntry> {
    let mut out: Vec<LibraryEntry> = entries
        .into_iter()
        .filter(|e| query.matches(&e.record))
        .collect();
    out.sort_by(|a, b| {
        let key = |e: &LibraryEntry| match e.display_time {
            DisplayTime::Known(t) => Some(t),
            DisplayTime::Unknown => None,
        };
        key(b)
            .cmp(&key(a))
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
    out
}

/// Gateway between the wizard/editor and the persistence collaborator.
#[derive(Clone)]
pub struct ChartLibrary {
    store: Arc<dyn ChartStore>,
}

impl std::fmt::Debug for ChartLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartLibrary").finish_non_exhaustive()
    }
}

impl ChartLibrary {
    pub fn new(store: Arc<dyn ChartStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, record: &SavedChartRecord) -> Result<()> {
        self.store.add_chart(record)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete_chart(id)? {
            Ok(())
        } else {
            Err(Error::ChartNotFound { id: id.to_string() })
        }
    }

    /// Every salvageable record, repaired against `now`.
    pub fn entries(&self, now: DateTime<Utc>) -> Result<Vec<LibraryEntry>> {
        let raw = self.store.list_charts()?;
        Ok(repair_records(&raw, now))
    }

    pub fn browse(&self, query: &LibraryQuery, now: DateTime<Utc>) -> Result<Vec<LibraryEntry>> {
        Ok(browse_entries(self.entries(now)?, query))
    }

    pub fn find(&self, id: &str, now: DateTime<Utc>) -> Result<SavedChartRecord> {
        self.entries(now)?
            .into_iter()
            .find(|e| e.record.id == id)
            .map(|e| e.record)
            .ok_or_else(|| Error::ChartNotFound { id: id.to_string() })
    }

    pub fn reuse(&self, id: &str, now: DateTime<Utc>) -> Result<ReuseEvent> {
        Ok(self.find(id, now)?.reuse_event())
    }
}
