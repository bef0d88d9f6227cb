use crate::models::artifact::BackupArtifact;
use crate::models::config::RemoteConfig;
use crate::models::error::Result;
use crate::models::run_summary::RemotePurgeReport;
use crate::repo::remote::{RemoteConnector, RemoteStore};
use crate::service::retention::purge_remote;
use crate::utils::progress::{format_bytes, stage_spinner};
use chrono::NaiveDate;
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;

/// Upload the archive, then prune old remote archives in the same session.
///
/// The session is always closed before returning. An upload or pruning
/// error wins over a failure to close.
pub fn ship<C: RemoteConnector>(
    connector: &C,
    remote: &RemoteConfig,
    artifact: &BackupArtifact,
    today: NaiveDate,
    show_progress: bool,
) -> Result<RemotePurgeReport> {
    let mut store = connector.connect(remote)?;

    let outcome = upload_and_prune(&mut store, remote, artifact, today, show_progress);

    match (outcome, store.quit()) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(report), Err(e)) => {
            warn!("Remote session did not close cleanly: {}", e);
            Ok(report)
        }
        (Err(e), Err(close)) => {
            warn!("Remote session did not close cleanly: {}", close);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

fn upload_and_prune<S: RemoteStore>(
    store: &mut S,
    remote: &RemoteConfig,
    artifact: &BackupArtifact,
    today: NaiveDate,
    show_progress: bool,
) -> Result<RemotePurgeReport> {
    store.cwd(&remote.remote_dir)?;

    let name = artifact.file_name();
    let mut reader = BufReader::new(File::open(&artifact.path)?);

    let spinner = stage_spinner(show_progress, &format!("[4/4] Uploading {}...", name));
    let sent = store.put(&name, &mut reader);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let sent = sent?;
    info!(
        "Backup uploaded to remote server: {} ({})",
        name,
        format_bytes(sent)
    );

    purge_remote(store, today, remote.keep_days)
}
