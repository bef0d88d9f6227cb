use crate::models::config::DatabaseConfig;
use crate::models::dump_result::DumpResult;
use crate::models::error::{BackupError, Result};
use crate::utils::directory::{get_files_in_path, mirror_tree};
use crate::utils::progress::{format_bytes, stage_progress, stage_spinner};
use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// Copy the live site into staging and dump the database next to it.
///
/// A failed copy aborts the run. A failed dump does not: it comes back as a
/// failed `DumpResult` and the run packages whatever dump file is there.
pub fn snapshot(
    site_directory: &Path,
    site_staging_dir: &Path,
    database: &DatabaseConfig,
    dump_file: &Path,
    show_progress: bool,
) -> Result<DumpResult> {
    info!("Starting backup process.");

    let progress = if show_progress {
        let total = get_files_in_path(site_directory)?.len() as u64;
        stage_progress(true, total, "[2/4] Copying site files")
    } else {
        None
    };
    let stats = mirror_tree(site_directory, site_staging_dir, progress.as_ref())?;
    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }
    info!(
        "Site files copied successfully ({} files, {}).",
        stats.files,
        format_bytes(stats.bytes)
    );

    if let Some(db_dir) = dump_file.parent() {
        fs::create_dir_all(db_dir).map_err(|cause| BackupError::CreateDir {
            path: db_dir.to_path_buf(),
            cause,
        })?;
    }

    let spinner = stage_spinner(show_progress, "[2/4] Dumping database...");
    let dump = dump_database(database, dump_file);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if dump.ok {
        info!("Database SQL dump completed successfully.");
        match fs::metadata(dump_file) {
            Ok(meta) if meta.len() == 0 => {
                warn!("Database dump file is empty: {}", dump_file.display())
            }
            Err(_) => warn!("Database dump file was not created: {}", dump_file.display()),
            Ok(_) => {}
        }
    } else {
        error!("Error during database dump: {}", dump.detail);
    }

    Ok(dump)
}

/// Run the dump utility with the configured credentials, writing to `dump_file`
pub fn dump_database(database: &DatabaseConfig, dump_file: &Path) -> DumpResult {
    let output = Command::new(&database.dump_command)
        .arg("-h")
        .arg(&database.host)
        .arg("-u")
        .arg(&database.user)
        .arg(format!("--password={}", database.password))
        .arg(&database.database)
        .arg("--result-file")
        .arg(dump_file)
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => {
            DumpResult::succeeded(format!("{} {}", database.dump_command, output.status))
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                DumpResult::failed(format!("{} {}", database.dump_command, output.status))
            } else {
                DumpResult::failed(format!(
                    "{} {}: {}",
                    database.dump_command, output.status, stderr
                ))
            }
        }
        Err(e) => DumpResult::failed(format!(
            "could not run {}: {}",
            database.dump_command, e
        )),
    }
}
