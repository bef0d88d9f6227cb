mod models;
mod repo;
mod service;
mod utils;

use crate::models::config::{Config, DatabaseConfig, RemoteConfig};
use crate::models::config_validator::validate_config;
use crate::models::run_summary::RunSummary;
use crate::repo::ftp::FtpConnector;
use crate::service::pipeline;
use crate::utils::file_logger::{init_file_logger, parse_level};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use log::{debug, error, info, warn};
use std::path::PathBuf;

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = build_config(&args);

    init_file_logger(&config.log_file(), parse_level(&args.log_level))
        .context("Failed to set up logging")?;

    if let Err(e) = validate_config(&config) {
        error!("{}", e);
        return Err(e).context("Failed to validate configuration");
    }
    debug!("Loaded config: {:?}", &config);

    if args.validate_only {
        info!("Configuration is valid. Exiting (--validate-only mode).");
        return Ok(());
    }

    match &config.schedule {
        Some(schedule) => run_scheduled(&config, schedule),
        None => run_once(&config),
    }
}

#[derive(Parser)]
#[command(name = "RustySiteBackup")]
#[command(about = "Daily site and database backup with local and FTP rotation", long_about = None)]
struct Cli {
    #[arg(long = "site-dir", env = "BACKUP_SITE_DIR")]
    site_dir: PathBuf,

    #[arg(long = "backup-dir", env = "BACKUP_DIR")]
    backup_dir: PathBuf,

    #[arg(long = "db-host", default_value = "localhost", env = "BACKUP_DB_HOST")]
    db_host: String,

    #[arg(long = "db-user", default_value = "", env = "BACKUP_DB_USER")]
    db_user: String,

    #[arg(
        long = "db-password",
        default_value = "",
        env = "BACKUP_DB_PASSWORD",
        hide_env_values = true
    )]
    db_password: String,

    #[arg(long = "db-name", env = "BACKUP_DB_NAME")]
    db_name: String,

    #[arg(
        long = "dump-command",
        default_value = "mysqldump",
        env = "BACKUP_DUMP_COMMAND"
    )]
    dump_command: String,

    #[arg(long = "ftp-host", env = "BACKUP_FTP_HOST")]
    ftp_host: String,

    #[arg(long = "ftp-port", default_value = "21", env = "BACKUP_FTP_PORT")]
    ftp_port: u16,

    #[arg(long = "ftp-user", default_value = "", env = "BACKUP_FTP_USER")]
    ftp_user: String,

    #[arg(
        long = "ftp-password",
        default_value = "",
        env = "BACKUP_FTP_PASSWORD",
        hide_env_values = true
    )]
    ftp_password: String,

    #[arg(long = "ftp-dir", env = "BACKUP_FTP_DIR")]
    ftp_dir: String,

    /// Days of backups to keep on the FTP server; 0 disables remote deletion
    #[arg(
        short = 'k',
        long = "keep-days",
        default_value = "3",
        env = "BACKUP_KEEP_DAYS",
        allow_negative_numbers = true
    )]
    keep_days: i64,

    /// Cron expression; when set, runs in-process on this schedule until Ctrl+C
    #[arg(short = 's', long = "schedule", env = "BACKUP_SCHEDULE")]
    schedule: Option<String>,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[arg(short = 'v', long = "validate-only")]
    validate_only: bool,
}

fn build_config(args: &Cli) -> Config {
    Config {
        site_directory: args.site_dir.clone(),
        backup_directory: args.backup_dir.clone(),
        database: DatabaseConfig {
            host: args.db_host.clone(),
            user: args.db_user.clone(),
            password: args.db_password.clone(),
            database: args.db_name.clone(),
            dump_command: args.dump_command.clone(),
        },
        remote: RemoteConfig {
            host: args.ftp_host.clone(),
            port: args.ftp_port,
            user: args.ftp_user.clone(),
            password: args.ftp_password.clone(),
            remote_dir: args.ftp_dir.clone(),
            keep_days: args.keep_days,
        },
        schedule: args.schedule.clone(),
        show_progress: !args.quiet,
    }
}

fn run_header(now: NaiveDateTime) -> String {
    format!("--- Backup Script Run: {} ---", now.format("%Y-%m-%d %H:%M:%S"))
}

/// One backup run against the configured FTP server, headed in the log by
/// the time it started
fn start_run(config: &Config) -> models::error::Result<RunSummary> {
    let now = Local::now().naive_local();
    info!("{}", run_header(now));
    pipeline::run(config, now, &FtpConnector)
}

fn run_once(config: &Config) -> Result<()> {
    match start_run(config) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Backup run failed: {}", e);
            Err(e).context("Backup run failed")
        }
    }
}

fn run_scheduled(config: &Config, schedule_str: &str) -> Result<()> {
    use cron::Schedule;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let schedule = Schedule::from_str(schedule_str).context("Invalid cron expression")?;

    info!(
        "Starting scheduled backup mode with schedule: {}",
        schedule_str
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping scheduler...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    while running.load(Ordering::SeqCst) {
        let Some(next) = schedule.upcoming(Local).next() else {
            warn!("No upcoming scheduled times found");
            break;
        };

        info!(
            "Next backup scheduled for: {}",
            next.format("%Y-%m-%d %H:%M:%S %Z")
        );

        // Wake every second so Ctrl+C is noticed promptly
        while running.load(Ordering::SeqCst) && Local::now() < next {
            let remaining = (next - Local::now())
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(0));
            std::thread::sleep(std::cmp::min(
                remaining,
                std::time::Duration::from_secs(1),
            ));
        }

        if running.load(Ordering::SeqCst) {
            info!("Running scheduled backup...");
            if let Err(e) = start_run(config) {
                error!("Scheduled backup failed: {}", e);
            }
        }
    }

    info!("Scheduler stopped");
    Ok(())
}
