use crate::library::SavedChartRecord;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Mutex;

/// Persistence collaborator: the system of record for saved charts.
///
/// `list_charts` returns raw JSON so the library can repair records written by older or
/// misbehaving clients instead of failing to deserialize the whole list.
pub trait ChartStore: Send + Sync {
    fn add_chart(&self, record: &SavedChartRecord) -> Result<()>;
    /// Returns `false` when no record had that id.
    fn delete_chart(&self, id: &str) -> Result<bool>;
    fn list_charts(&self) -> Result<Vec<Value>>;
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryChartStore {
    records: Mutex<Vec<Value>>,
}

impl MemoryChartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw (possibly malformed) records.
    pub fn from_raw(records: Vec<Value>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Value>>> {
        self.records.lock().map_err(|_| Error::Store {
            message: "chart store lock poisoned".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The id of a raw record as the library reads it; numeric ids are stringified.
pub fn record_id(raw: &Value) -> Option<String> {
    match raw.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shared add/delete semantics for JSON-array backed stores.
pub fn add_raw(records: &mut Vec<Value>, record: &SavedChartRecord) -> Result<()> {
    if records
        .iter()
        .any(|r| record_id(r).as_deref() == Some(record.id.as_str()))
    {
        return Err(Error::DuplicateChart {
            id: record.id.clone(),
        });
    }
    records.push(serde_json::to_value(record)?);
    Ok(())
}

pub fn delete_raw(records: &mut Vec<Value>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| record_id(r).as_deref() != Some(id));
    before != records.len()
}

impl ChartStore for MemoryChartStore {
    fn add_chart(&self, record: &SavedChartRecord) -> Result<()> {
        add_raw(&mut *self.lock()?, record)
    }

    fn delete_chart(&self, id: &str) -> Result<bool> {
        Ok(delete_raw(&mut *self.lock()?, id))
    }

    fn list_charts(&self) -> Result<Vec<Value>> {
        Ok(self.lock()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_match_their_listed_form() {
        let mut records = vec![json!({"id": 42}), json!({"id": "a"}), json!({"id": null})];
        assert_eq!(record_id(&records[0]).as_deref(), Some("42"));
        assert_eq!(record_id(&records[2]), None);
        assert!(delete_raw(&mut records, "42"));
        assert!(!delete_raw(&mut records, "42"));
        assert_eq!(records.len(), 2);
    }
}
