use async_trait::async_trait;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::config::RunConfig;
use crate::constants::PORTAL;
use crate::error::Result;
use crate::types::ListingRecord;

/// Sink for fully processed listing records.
#[async_trait]
pub trait FeedSink: Send + Sync {
    async fn append(&self, record: &ListingRecord) -> Result<()>;

    /// Flush buffered records and report where they went, if anywhere on disk.
    async fn finish(&self) -> Result<Option<String>>;
}

/// JSON-Lines feed writer, one record per line in feed field order.
pub struct JsonlFeed {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlFeed {
    /// Create the export file for a run inside `output_dir`, named after
    /// portal, country and the run start timestamp.
    pub fn create(output_dir: &str, run: &RunConfig) -> Result<Self> {
        fs::create_dir_all(output_dir)?;

        let timestamp = run.started_at.format("%Y-%m-%d_%H%M%S");
        let filename = format!("{}-overview-{}-{}.jsonl", PORTAL, run.country_code, timestamp);
        let path = Path::new(output_dir).join(filename);

        let writer = Mutex::new(BufWriter::new(File::create(&path)?));
        debug!(path = %path.display(), "created feed file");

        Ok(Self { path, writer })
    }
}

#[async_trait]
impl FeedSink for JsonlFeed {
    async fn append(&self, record: &ListingRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{line}")?;
        Ok(())
    }

    async fn finish(&self) -> Result<Option<String>> {
        self.writer.lock().unwrap().flush()?;
        Ok(Some(self.path.to_string_lossy().to_string()))
    }
}

/// In-memory sink for tests and dry runs.
pub struct InMemorySink {
    records: Mutex<Vec<ListingRecord>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<ListingRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSink for InMemorySink {
    async fn append(&self, record: &ListingRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn finish(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
