use std::fmt;
use std::path::PathBuf;

pub const SITE_STAGING_DIR: &str = "site_data";
pub const DATABASE_STAGING_DIR: &str = "database";
pub const DATABASE_DUMP_FILE: &str = "database_backup.sql";
pub const LOG_FILE: &str = "backup_log.txt";

/// Everything a backup run needs. Built once at startup and handed to each
/// stage by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub site_directory: PathBuf,
    pub backup_directory: PathBuf,
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub schedule: Option<String>,
    pub show_progress: bool,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub dump_command: String,
}

#[derive(Clone)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub remote_dir: String,
    /// Days of remote backups to keep; 0 disables remote deletion
    pub keep_days: i64,
}

impl Config {
    pub fn site_staging_dir(&self) -> PathBuf {
        self.backup_directory.join(SITE_STAGING_DIR)
    }

    pub fn database_staging_dir(&self) -> PathBuf {
        self.backup_directory.join(DATABASE_STAGING_DIR)
    }

    pub fn database_dump_file(&self) -> PathBuf {
        self.database_staging_dir().join(DATABASE_DUMP_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.backup_directory.join(LOG_FILE)
    }
}

impl RemoteConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Passwords stay out of debug logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"********")
            .field("database", &self.database)
            .field("dump_command", &self.dump_command)
            .finish()
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"********")
            .field("remote_dir", &self.remote_dir)
            .field("keep_days", &self.keep_days)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;

    /// Config rooted at the given directories, used by tests across the crate
    pub(crate) fn test_config(site: &Path, backup: &Path) -> Config {
        Config {
            site_directory: site.to_path_buf(),
            backup_directory: backup.to_path_buf(),
            database: DatabaseConfig {
                host: "localhost".to_string(),
                user: "wp".to_string(),
                password: "secret".to_string(),
                database: "wordpress".to_string(),
                dump_command: "true".to_string(),
            },
            remote: RemoteConfig {
                host: "ftp.example.com".to_string(),
                port: 21,
                user: "ftp_user".to_string(),
                password: "ftp_secret".to_string(),
                remote_dir: "/remote/backup".to_string(),
                keep_days: 3,
            },
            schedule: None,
            show_progress: false,
        }
    }

    #[test]
    fn test_derived_paths() {
        let config = test_config(Path::new("/srv/www"), Path::new("/var/backups/wp"));

        assert_eq!(config.site_staging_dir(), Path::new("/var/backups/wp/site_data"));
        assert_eq!(config.database_staging_dir(), Path::new("/var/backups/wp/database"));
        assert_eq!(
            config.database_dump_file(),
            Path::new("/var/backups/wp/database/database_backup.sql")
        );
        assert_eq!(config.log_file(), Path::new("/var/backups/wp/backup_log.txt"));
    }

    #[test]
    fn test_debug_hides_passwords() {
        let config = test_config(Path::new("/srv/www"), Path::new("/var/backups/wp"));
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("ftp_secret"));
        assert!(rendered.contains("ftp.example.com"));
    }

    #[test]
    fn test_remote_address() {
        let config = test_config(Path::new("/srv/www"), Path::new("/var/backups/wp"));
        assert_eq!(config.remote.address(), "ftp.example.com:21");
    }
}
