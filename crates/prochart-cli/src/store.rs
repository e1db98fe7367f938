use prochart::store::{self, ChartStore};
use prochart::{Error, Result, SavedChartRecord};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Chart library kept as one pretty-printed JSON array on disk.
///
/// A missing file is an empty library. Records are kept raw so damaged entries survive until the
/// library gateway repairs or discards them on read.
#[derive(Debug)]
pub struct JsonFileChartStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileChartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Value>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(&self.path, err)),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(records) => Ok(records),
            _ => Err(Error::Store {
                message: format!("{} does not contain a JSON array", self.path.display()),
            }),
        }
    }

    fn write(&self, records: &[Value]) -> Result<()> {
        let text = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, text).map_err(|err| io_error(&self.path, err))
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut Vec<Value>) -> Result<(T, bool)>) -> Result<T> {
        let _guard = self.lock.lock().map_err(|_| Error::Store {
            message: "chart store lock poisoned".to_string(),
        })?;
        let mut records = self.read()?;
        let (out, dirty) = f(&mut records)?;
        if dirty {
            self.write(&records)?;
        }
        Ok(out)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> Error {
    Error::Store {
        message: format!("{}: {err}", path.display()),
    }
}

impl ChartStore for JsonFileChartStore {
    fn add_chart(&self, record: &SavedChartRecord) -> Result<()> {
        self.with_records(|records| {
            store::add_raw(records, record)?;
            Ok(((), true))
        })?;
        tracing::debug!(id = %record.id, path = %self.path.display(), "chart saved");
        Ok(())
    }

    fn delete_chart(&self, id: &str) -> Result<bool> {
        self.with_records(|records| {
            let removed = store::delete_raw(records, id);
            Ok((removed, removed))
        })
    }

    fn list_charts(&self) -> Result<Vec<Value>> {
        self.with_records(|records| Ok((std::mem::take(records), false)))
    }
}
