use crate::models::artifact::{artifact_name, parse_artifact_date, ArtifactDate};
use crate::models::error::{BackupError, Result};
use crate::models::run_summary::RemotePurgeReport;
use crate::repo::remote::RemoteStore;
use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Delete yesterday's local archive so only today's copy is kept.
///
/// Returns whether a file was removed. A missing file is the normal case
/// after the first run and is not an error.
pub fn purge_local(backup_dir: &Path, today: NaiveDate) -> Result<bool> {
    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
        info!("No backup found to delete for yesterday.");
        return Ok(false);
    };
    let name = artifact_name(yesterday);
    let path = backup_dir.join(&name);

    match fs::remove_file(&path) {
        Ok(()) => {
            info!("Deleted yesterday's backup file: {}", name);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No backup found to delete for yesterday.");
            Ok(false)
        }
        Err(cause) => Err(BackupError::FileRemove { path, cause }),
    }
}

/// Which remote names a pruning pass removes and which it leaves alone
/// because their date could not be read.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RemotePurgePlan {
    pub delete: Vec<String>,
    pub skipped: Vec<String>,
}

/// Decide what to prune from `listing`. Archives dated strictly before
/// `today - keep_days` go; an archive dated exactly on the cutoff stays.
pub fn remote_purge_plan(today: NaiveDate, keep_days: i64, listing: &[String]) -> RemotePurgePlan {
    let mut plan = RemotePurgePlan::default();
    let Some(cutoff) = cutoff_date(today, keep_days) else {
        return plan;
    };

    for name in listing {
        match parse_artifact_date(name) {
            ArtifactDate::NotAnArtifact => {}
            ArtifactDate::Malformed => plan.skipped.push(name.clone()),
            ArtifactDate::Dated(date) if date < cutoff => plan.delete.push(name.clone()),
            ArtifactDate::Dated(_) => {}
        }
    }
    plan
}

fn cutoff_date(today: NaiveDate, keep_days: i64) -> Option<NaiveDate> {
    if keep_days <= 0 {
        return None;
    }
    today.checked_sub_days(Days::new(keep_days as u64))
}

/// Remove remote archives older than `keep_days`, using a fresh listing
/// from `store`. With `keep_days <= 0` the store is not touched at all.
pub fn purge_remote<S: RemoteStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
    keep_days: i64,
) -> Result<RemotePurgeReport> {
    let mut report = RemotePurgeReport::default();
    if keep_days <= 0 {
        debug!("Remote retention disabled (keep_days = {})", keep_days);
        return Ok(report);
    }

    let listing = store.list_names()?;
    let plan = remote_purge_plan(today, keep_days, &listing);

    for name in plan.skipped {
        warn!("Skipped remote file with invalid date format: {}", name);
        report.skipped.push(name);
    }

    for name in plan.delete {
        store.delete(&name)?;
        info!("Deleted old backup from remote: {}", name);
        report.deleted.push(name);
    }

    Ok(report)
}
