use crate::models::artifact::{artifact_name, BackupArtifact};
use crate::models::error::{BackupError, Result};
use crate::utils::directory::{get_files_in_path, TreeStats};
use crate::utils::progress::{format_bytes, stage_progress};
use chrono::NaiveDate;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use zip::result::{ZipError, ZipResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const PARTIAL_SUFFIX: &str = ".partial";

/// Files found under one staging root
struct StagedTree<'a> {
    root: &'a Path,
    files: Vec<PathBuf>,
}

/// Package both staging areas into `<backup_dir>/wordpress_backup_<date>.zip`.
///
/// Entries are named relative to their own staging root, so the site files
/// and the database dump share one flat namespace. The archive is written
/// under a temporary name and renamed into place once complete.
pub fn pack(
    site_staging_dir: &Path,
    database_staging_dir: &Path,
    backup_dir: &Path,
    date: NaiveDate,
    show_progress: bool,
) -> Result<BackupArtifact> {
    let trees = [
        StagedTree {
            root: site_staging_dir,
            files: get_files_in_path(site_staging_dir)?,
        },
        StagedTree {
            root: database_staging_dir,
            files: get_files_in_path(database_staging_dir)?,
        },
    ];
    if trees[1].files.is_empty() {
        warn!(
            "No database dump found in {}; archiving site files only",
            database_staging_dir.display()
        );
    }

    let name = artifact_name(date);
    let destination = backup_dir.join(&name);
    let partial = backup_dir.join(format!("{}{}", name, PARTIAL_SUFFIX));

    let total: u64 = trees.iter().map(|t| t.files.len() as u64).sum();
    let progress = stage_progress(show_progress, total, "[3/4] Packaging");

    let stats = match write_archive(&partial, &trees, progress.as_ref()) {
        Ok(stats) => stats,
        Err(cause) => {
            discard_partial(&partial);
            return Err(BackupError::Archive {
                path: destination,
                cause,
            });
        }
    };
    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    if let Err(cause) = fs::rename(&partial, &destination) {
        discard_partial(&partial);
        return Err(BackupError::Archive {
            path: destination,
            cause: ZipError::Io(cause),
        });
    }

    let size = fs::metadata(&destination)?.len();
    info!(
        "Backup zipped successfully: {} ({} files, {} of content, {} archive)",
        destination.display(),
        stats.files,
        format_bytes(stats.bytes),
        format_bytes(size)
    );

    Ok(BackupArtifact {
        date,
        path: destination,
        size,
    })
}

fn write_archive(
    path: &Path,
    trees: &[StagedTree],
    progress: Option<&ProgressBar>,
) -> ZipResult<TreeStats> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut stats = TreeStats::default();

    // Later roots win a name clash, so the database dump is never displaced
    let mut planned: Vec<(String, &Path)> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    for tree in trees {
        for file in &tree.files {
            let entry = entry_name(tree.root, file)?;
            if let Some(&index) = slot.get(&entry) {
                warn!(
                    "Archive entry {} exists in more than one staging area; keeping {} over {}",
                    entry,
                    file.display(),
                    planned[index].1.display()
                );
                planned[index].1 = file.as_path();
            } else {
                slot.insert(entry.clone(), planned.len());
                planned.push((entry, file.as_path()));
            }
        }
    }
    if let Some(pb) = progress {
        pb.set_length(planned.len() as u64);
    }

    for (entry, file) in planned {
        let mut input = File::open(file)?;
        let size = input.metadata()?.len();

        debug!("Adding {} to archive", entry);
        if let Some(pb) = progress {
            pb.set_message(entry.clone());
        }
        zip.start_file(entry, options.large_file(size >= u32::MAX as u64))?;
        stats.bytes += io::copy(&mut input, &mut zip)?;
        stats.files += 1;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let writer = zip.finish()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(stats)
}

/// In-archive name: the path below `root`, always `/`-separated
fn entry_name(root: &Path, file: &Path) -> ZipResult<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        ZipError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not under {}", file.display(), root.display()),
        ))
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn discard_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Could not remove partial archive {}: {}", partial.display(), e);
        }
    }
}

/// Archive contents as sorted (name, bytes) pairs
#[cfg(test)]
pub(crate) fn read_entries(archive: &Path) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        entries.push((entry.name().to_string(), bytes));
    }
    entries.sort();
    entries
}
