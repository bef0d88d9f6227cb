use crate::models::config::Config;
use crate::models::error::{BackupError, Result};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating configuration...");

    validate_site_directory(&config.site_directory)?;

    validate_backup_directory(&config.backup_directory)?;

    check_site_outside_backup(&config.site_directory, &config.backup_directory)?;

    validate_database(config)?;

    validate_remote(config)?;

    validate_schedule(config)?;

    info!("Configuration validation passed");
    Ok(())
}

fn validate_site_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BackupError::InvalidConfig(format!(
            "Site directory does not exist: {}",
            path.display()
        )));
    }

    if !path.is_dir() {
        return Err(BackupError::InvalidConfig(format!(
            "Site directory is not a directory: {}",
            path.display()
        )));
    }

    if let Err(e) = fs::read_dir(path) {
        return Err(BackupError::InvalidConfig(format!(
            "Site directory is not readable: {}\nError: {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

fn validate_backup_directory(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(BackupError::InvalidConfig(
            "Backup directory must be set".to_string(),
        ));
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(BackupError::InvalidConfig(format!(
                "Backup directory exists but is not a directory: {}",
                path.display()
            )));
        }
        return check_writable(path).map_err(|e| {
            BackupError::InvalidConfig(format!(
                "Backup directory is not writable: {}\nError: {}",
                path.display(),
                e
            ))
        });
    }

    warn!(
        "Backup directory does not exist but will be created: {}",
        path.display()
    );
    fs::create_dir_all(path).map_err(|e| {
        BackupError::InvalidConfig(format!(
            "Backup directory could not be created: {}\nError: {}",
            path.display(),
            e
        ))
    })
}

/// The staging copy lives under the backup directory, so backing up a tree
/// that contains it would copy into itself.
fn check_site_outside_backup(site: &Path, backup: &Path) -> Result<()> {
    let site = fs::canonicalize(site)?;
    let backup = fs::canonicalize(backup)?;

    if backup.starts_with(&site) {
        return Err(BackupError::InvalidConfig(format!(
            "Backup directory {} must not be inside the site directory {}",
            backup.display(),
            site.display()
        )));
    }
    if site.starts_with(&backup) {
        return Err(BackupError::InvalidConfig(format!(
            "Site directory {} must not be inside the backup directory {}",
            site.display(),
            backup.display()
        )));
    }
    Ok(())
}

fn validate_database(config: &Config) -> Result<()> {
    if config.database.database.trim().is_empty() {
        return Err(BackupError::InvalidConfig(
            "Database name must be set".to_string(),
        ));
    }
    if config.database.dump_command.trim().is_empty() {
        return Err(BackupError::InvalidConfig(
            "Dump command must be set".to_string(),
        ));
    }
    if config.database.user.trim().is_empty() {
        warn!("No database user configured; the dump utility will use its own default");
    }
    Ok(())
}

fn validate_remote(config: &Config) -> Result<()> {
    let remote = &config.remote;
    if remote.host.trim().is_empty() {
        return Err(BackupError::InvalidConfig(
            "FTP host must be set".to_string(),
        ));
    }
    if remote.port == 0 {
        return Err(BackupError::InvalidConfig(
            "FTP port must be greater than 0".to_string(),
        ));
    }
    if remote.remote_dir.trim().is_empty() {
        return Err(BackupError::InvalidConfig(
            "Remote directory must be set".to_string(),
        ));
    }
    if remote.keep_days <= 0 {
        info!("keep_days is {}; remote backups will not be deleted", remote.keep_days);
    }
    Ok(())
}

fn validate_schedule(config: &Config) -> Result<()> {
    if let Some(schedule) = &config.schedule {
        if let Err(e) = cron::Schedule::from_str(schedule) {
            return Err(BackupError::InvalidConfig(format!(
                "Invalid cron expression '{}': {}\nExample: \"0 0 2 * * *\" runs daily at 02:00",
                schedule, e
            )));
        }
    }
    Ok(())
}

fn check_writable(path: &Path) -> std::io::Result<()> {
    let marker = path.join(".rustysitebackup_write_test");
    fs::write(&marker, b"test")?;
    fs::remove_file(&marker)
}
