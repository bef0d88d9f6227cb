use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

pub const ARTIFACT_PREFIX: &str = "wordpress_backup_";
pub const ARTIFACT_SUFFIX: &str = ".zip";

/// A dated backup archive stored on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub size: u64,
}

impl BackupArtifact {
    /// Base name used both locally and on the remote server
    pub fn file_name(&self) -> String {
        artifact_name(self.date)
    }
}

/// Outcome of reading a date out of a (possibly remote) file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactDate {
    /// Not a backup archive at all; retention ignores it
    NotAnArtifact,
    /// Looks like a backup archive but the date part is unusable
    Malformed,
    Dated(NaiveDate),
}

pub fn artifact_name(date: NaiveDate) -> String {
    format!(
        "{}{:04}{:02}{:02}{}",
        ARTIFACT_PREFIX,
        date.year(),
        date.month(),
        date.day(),
        ARTIFACT_SUFFIX
    )
}

pub fn parse_artifact_date(name: &str) -> ArtifactDate {
    // Some FTP servers answer NLST with "dir/name"
    let base = name.rsplit('/').next().unwrap_or(name);

    let Some(middle) = base
        .strip_prefix(ARTIFACT_PREFIX)
        .and_then(|rest| rest.strip_suffix(ARTIFACT_SUFFIX))
    else {
        return ArtifactDate::NotAnArtifact;
    };

    if middle.len() != 8 || !middle.bytes().all(|b| b.is_ascii_digit()) {
        return ArtifactDate::Malformed;
    }

    let year = middle[0..4].parse::<i32>();
    let month = middle[4..6].parse::<u32>();
    let day = middle[6..8].parse::<u32>();
    match (year, month, day) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d)
            .map(ArtifactDate::Dated)
            .unwrap_or(ArtifactDate::Malformed),
        _ => ArtifactDate::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_artifact_name_is_zero_padded() {
        assert_eq!(artifact_name(date(2024, 1, 5)), "wordpress_backup_20240105.zip");
        assert_eq!(artifact_name(date(2023, 12, 31)), "wordpress_backup_20231231.zip");
    }

    #[test]
    fn test_parse_valid_name() {
        assert_eq!(
            parse_artifact_date("wordpress_backup_20240229.zip"),
            ArtifactDate::Dated(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_parse_strips_directory_component() {
        assert_eq!(
            parse_artifact_date("/remote/backups/wordpress_backup_20240103.zip"),
            ArtifactDate::Dated(date(2024, 1, 3))
        );
    }

    #[test]
    fn test_parse_unrelated_names() {
        assert_eq!(parse_artifact_date("notes.txt"), ArtifactDate::NotAnArtifact);
        assert_eq!(
            parse_artifact_date("wordpress_backup_20240101.tar"),
            ArtifactDate::NotAnArtifact
        );
        assert_eq!(
            parse_artifact_date("other_backup_20240101.zip"),
            ArtifactDate::NotAnArtifact
        );
    }

    #[test]
    fn test_parse_malformed_dates() {
        assert_eq!(parse_artifact_date("wordpress_backup_20xx13.zip"), ArtifactDate::Malformed);
        assert_eq!(parse_artifact_date("wordpress_backup_20241301.zip"), ArtifactDate::Malformed);
        assert_eq!(parse_artifact_date("wordpress_backup_20230229.zip"), ArtifactDate::Malformed);
        assert_eq!(parse_artifact_date("wordpress_backup_2024011.zip"), ArtifactDate::Malformed);
        assert_eq!(parse_artifact_date("wordpress_backup_.zip"), ArtifactDate::Malformed);
        assert_eq!(parse_artifact_date("wordpress_backup_+2024011.zip"), ArtifactDate::Malformed);
    }

    #[test]
    fn test_file_name_matches_date() {
        let artifact = BackupArtifact {
            date: date(2024, 3, 9),
            path: PathBuf::from("/backups/wordpress_backup_20240309.zip"),
            size: 10,
        };
        assert_eq!(artifact.file_name(), "wordpress_backup_20240309.zip");
    }
}
