use crate::models::error::{BackupError, Result};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Totals for a copied or archived tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub files: u64,
    pub bytes: u64,
}

/// All regular files under `dir`, in a stable order. A missing `dir`
/// yields an empty list; an unreadable entry is an error.
pub fn get_files_in_path(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|e| {
            BackupError::DirectoryRead(format!("{}: {}", dir.display(), e))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    Ok(files)
}

/// Replace `destination` with an exact copy of `source`.
///
/// Whatever was at `destination` before (a previous run's staging tree, a
/// half-finished copy from an interrupted run) is removed first, so the
/// result never holds files that are no longer in `source`.
pub fn mirror_tree(
    source: &Path,
    destination: &Path,
    progress: Option<&ProgressBar>,
) -> Result<TreeStats> {
    remove_path(destination)?;
    fs::create_dir_all(destination).map_err(|cause| BackupError::FileCopy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        cause,
    })?;

    let mut stats = TreeStats::default();
    for entry in WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|e| {
            BackupError::DirectoryRead(format!("{}: {}", source.display(), e))
        })?;
        let relative = entry.path().strip_prefix(source).map_err(|e| {
            BackupError::DirectoryRead(format!("{}: {}", entry.path().display(), e))
        })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|cause| BackupError::FileCopy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                cause,
            })?;
            continue;
        }

        if let Some(pb) = progress {
            pb.set_message(relative.display().to_string());
        }
        let copied = fs::copy(entry.path(), &target).map_err(|cause| BackupError::FileCopy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            cause,
        })?;
        stats.files += 1;
        stats.bytes += copied;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(stats)
}

/// Remove a file or directory tree if it exists
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(cause) => {
            return Err(BackupError::FileRemove {
                path: path.to_path_buf(),
                cause,
            })
        }
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|cause| BackupError::FileRemove {
        path: path.to_path_buf(),
        cause,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Collect (relative path, contents) pairs for every file under `root`
    pub(crate) fn snapshot_of(root: &Path) -> Vec<(String, Vec<u8>)> {
        get_files_in_path(root)
            .unwrap()
            .into_iter()
            .map(|file| {
                let relative = file
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                (relative, fs::read(&file).unwrap())
            })
            .collect()
    }

    fn build_site(root: &Path) {
        fs::create_dir_all(root.join("wp-content/uploads")).unwrap();
        fs::create_dir_all(root.join("empty-dir")).unwrap();
        fs::write(root.join("index.php"), "<?php // index").unwrap();
        fs::write(root.join("wp-config.php"), "<?php // config").unwrap();
        fs::write(root.join("wp-content/uploads/logo.png"), [0u8, 1, 2, 3, 255]).unwrap();
    }

    #[test]
    fn test_get_files_skips_directories_and_sorts() {
        let temp = TempDir::new().unwrap();
        build_site(temp.path());

        let files: Vec<String> = get_files_in_path(temp.path())
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(files, vec!["index.php", "wp-config.php", "wp-content/uploads/logo.png"]);
    }

    #[test]
    fn test_get_files_on_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let files = get_files_in_path(&temp.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_mirror_copies_everything() {
        let source = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        build_site(source.path());
        let destination = staging.path().join("site_data");

        let stats = mirror_tree(source.path(), &destination, None).unwrap();

        assert_eq!(stats.files, 3);
        assert_eq!(snapshot_of(&destination), snapshot_of(source.path()));
        assert!(destination.join("empty-dir").is_dir());
    }

    #[test]
    fn test_mirror_removes_stale_files() {
        let source = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        build_site(source.path());
        let destination = staging.path().join("site_data");
        fs::create_dir_all(destination.join("old-plugin")).unwrap();
        fs::write(destination.join("old-plugin/plugin.php"), "stale").unwrap();
        fs::write(destination.join("index.php"), "stale index").unwrap();

        mirror_tree(source.path(), &destination, None).unwrap();

        assert!(!destination.join("old-plugin").exists());
        assert_eq!(snapshot_of(&destination), snapshot_of(source.path()));
    }

    #[test]
    fn test_mirror_of_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = mirror_tree(&temp.path().join("missing"), &temp.path().join("dest"), None);

        assert!(matches!(result, Err(BackupError::DirectoryRead(_))));
    }

    #[test]
    fn test_remove_path_handles_files_dirs_and_absence() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        let dir = temp.path().join("dir");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(dir.join("inner")).unwrap();

        remove_path(&file).unwrap();
        remove_path(&dir).unwrap();
        remove_path(&temp.path().join("never-existed")).unwrap();

        assert!(!file.exists());
        assert!(!dir.exists());
    }
}
