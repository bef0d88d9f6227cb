use crate::models::artifact::BackupArtifact;
use crate::models::dump_result::DumpResult;
use crate::utils::progress::format_bytes;
use chrono::NaiveDate;
use std::fmt;

/// What a remote pruning pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemotePurgeReport {
    pub deleted: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub local_purged: bool,
    pub dump: DumpResult,
    pub artifact: BackupArtifact,
    pub remote: RemotePurgeReport,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "date={}, archive={} ({}), database dump={}, yesterday purged={}, remote deleted={}, remote skipped={}",
            self.date,
            self.artifact.file_name(),
            format_bytes(self.artifact.size),
            self.dump.status(),
            self.local_purged,
            self.remote.deleted.len(),
            self.remote.skipped.len()
        )?;
        if !self.dump.ok {
            write!(f, " [dump error: {}]", self.dump.detail)?;
        }
        Ok(())
    }
}
