//! Saved-plan store backed by a JSONL file with file locking.
//!
//! Each saved plan is one JSON line. Appends take an exclusive lock, reads
//! a shared lock, and status updates rewrite the whole file atomically via
//! a temp file in the same directory.

use crate::{Error, PlanStatus, Result, StoredPlan};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// JSONL-backed store for saved plans
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a plan as a JSON line
    pub fn append(&self, plan: &StoredPlan) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(plan)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended plan {} to store", plan.id);
        Ok(())
    }

    /// Read all saved plans, skipping unparseable lines with a warning
    pub fn load(&self) -> Result<Vec<StoredPlan>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut plans = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<StoredPlan>(&line) {
                Ok(plan) => plans.push(plan),
                Err(e) => {
                    tracing::warn!("Failed to parse stored plan at line {}: {}", line_num + 1, e);
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} plans from store", plans.len());
        Ok(plans)
    }

    /// Update the status of a saved plan, rewriting the store atomically
    pub fn set_status(&self, id: Uuid, status: PlanStatus) -> Result<StoredPlan> {
        let mut plans = self.load()?;

        let Some(target) = plans.iter_mut().find(|p| p.id == id) else {
            return Err(Error::Store(format!("no stored plan with id {}", id)));
        };
        target.status = status;
        let updated = target.clone();

        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "plan store path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for plan in &plans {
                let line = serde_json::to_string(plan)?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the store file
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Updated plan {} to {}", id, updated.status);
        Ok(updated)
    }
}
