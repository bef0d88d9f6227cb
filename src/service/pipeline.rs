use crate::models::config::Config;
use crate::models::error::Result;
use crate::models::run_summary::RunSummary;
use crate::repo::remote::RemoteConnector;
use crate::service::package::pack;
use crate::service::retention::purge_local;
use crate::service::ship::ship;
use crate::service::snapshot::snapshot;
use chrono::NaiveDateTime;
use log::{info, warn};

/// One full backup run: purge yesterday, snapshot, package, ship.
///
/// Stages run in order and every run starts from the first one. A failed
/// database dump is carried in the summary; any other failure stops the run.
pub fn run<C: RemoteConnector>(
    config: &Config,
    now: NaiveDateTime,
    connector: &C,
) -> Result<RunSummary> {
    let today = now.date();
    info!("Backup script initiated.");

    info!("[1/4] Removing yesterday's local backup");
    let local_purged = purge_local(&config.backup_directory, today)?;

    info!("[2/4] Snapshotting site files and database");
    let dump = snapshot(
        &config.site_directory,
        &config.site_staging_dir(),
        &config.database,
        &config.database_dump_file(),
        config.show_progress,
    )?;

    info!("[3/4] Packaging backup archive");
    let artifact = pack(
        &config.site_staging_dir(),
        &config.database_staging_dir(),
        &config.backup_directory,
        today,
        config.show_progress,
    )?;

    info!("[4/4] Shipping backup to {}", config.remote.host);
    let remote = ship(
        connector,
        &config.remote,
        &artifact,
        today,
        config.show_progress,
    )?;

    let summary = RunSummary {
        date: today,
        local_purged,
        dump,
        artifact,
        remote,
    };
    if summary.dump.ok {
        info!("Backup process completed. {}", summary);
    } else {
        warn!("Backup process completed without a good database dump. {}", summary);
    }
    Ok(summary)
}
