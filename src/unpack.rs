//! Unpacker: extract a downloaded zip into the library directory.
//!
//! Entry names come from a remote archive and are not trusted. Each one is
//! normalized against the destination, and if any entry would land outside
//! it the whole archive is rejected before anything is written.

use crate::core::output;
use crate::core::progress::StageProgress;
use crate::error::{CleanupError, ExtractError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

/// A completed extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub destination_directory: PathBuf,
    pub elapsed: Duration,
    pub archive_removed: bool,
    /// Directory and file entries written
    pub entries: usize,
}

/// Resolve an entry name to a path relative to the destination.
///
/// `a/./b/../c` becomes `a/c`. Returns `None` for absolute names and names
/// that climb above the destination, such as `../../etc/passwd`.
pub fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let name = name.replace('\\', "/");
    let mut out = PathBuf::new();

    for c in Path::new(&name).components() {
        match c {
            Component::Prefix(_) | Component::RootDir => return None,
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    Some(out)
}

/// Extract `archive` into `dest`, creating `dest` if needed.
pub fn extract(archive: &Path, dest: &Path) -> Result<ExtractionResult, ExtractError> {
    let filename = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    output::action(&format!("Extracting {} to {}", archive.display(), dest.display()));

    std::fs::create_dir_all(dest).map_err(|source| ExtractError::CreateDir {
        path: dest.to_path_buf(),
        source,
    })?;

    let _progress = StageProgress::spinner(&format!("extracting {}", filename));

    let start = Instant::now();
    let entries = extract_zip(archive, dest)?;
    let elapsed = start.elapsed();

    output::detail(&format!("extracted {} entries from {}", entries, filename));
    output::finished("Extraction", elapsed);

    Ok(ExtractionResult {
        destination_directory: dest.to_path_buf(),
        elapsed,
        archive_removed: false,
        entries,
    })
}

/// Delete the archive once its contents are on disk.
pub fn remove_archive(archive: &Path) -> Result<(), CleanupError> {
    std::fs::remove_file(archive).map_err(|source| CleanupError {
        path: archive.to_path_buf(),
        source,
    })?;
    output::detail(&format!("removed archive {}", archive.display()));
    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive_path).map_err(|source| ExtractError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    // Every name is checked before the first byte is written.
    let mut targets = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let relative = sanitize_entry_path(entry.name())
            .ok_or_else(|| ExtractError::UnsafeEntry(entry.name().to_string()))?;
        targets.push(relative);
    }

    let mut written = 0;
    for (i, relative) in targets.iter().enumerate() {
        // Some archives contain a "." entry; treat it as a no-op.
        if relative.as_os_str().is_empty() {
            continue;
        }
        let mut entry = archive.by_index(i)?;
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|source| ExtractError::CreateDir {
                path: outpath.clone(),
                source,
            })?;
            written += 1;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ExtractError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        remove_previous(&outpath)?;
        let mut outfile = File::create(&outpath).map_err(|source| ExtractError::Write {
            path: outpath.clone(),
            source,
        })?;
        std::io::copy(&mut entry, &mut outfile).map_err(|source| ExtractError::Write {
            path: outpath.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let mode = mode & 0o7777;
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|source| ExtractError::Permissions {
                        path: outpath.clone(),
                        mode,
                        source,
                    })?;
            }
        }
        written += 1;
    }

    Ok(written)
}

/// Unlink a file or symlink left at `path` by an earlier extraction.
///
/// The new file is created fresh, so a read-only mode from the last run does
/// not block the write and a symlink is never followed.
fn remove_previous(path: &Path) -> Result<(), ExtractError> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => {
            std::fs::remove_file(path).map_err(|source| ExtractError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, Option<&str>)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            match content {
                Some(bytes) => {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(bytes.as_bytes()).unwrap();
                }
                None => zip.add_directory(*name, options).unwrap(),
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_sanitize_entry_path() {
        assert_eq!(sanitize_entry_path("a/b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(sanitize_entry_path("./a/./b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(sanitize_entry_path("a/x/../b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(sanitize_entry_path("../evil.txt"), None);
        assert_eq!(sanitize_entry_path("a/../../evil.txt"), None);
        assert_eq!(sanitize_entry_path("/etc/passwd"), None);
        assert_eq!(sanitize_entry_path("..\\evil.txt"), None);
    }

    #[test]
    fn test_extract_files_and_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("show.zip");
        let dest = temp_dir.path().join("TV");

        write_zip(
            &archive,
            &[
                ("Show/", None),
                ("Show/Season 1/", None),
                ("Show/Season 1/e01.mkv", Some("episode one")),
                ("Show/notes.txt", Some("notes")),
            ],
        );

        let result = extract(&archive, &dest).unwrap();

        assert_eq!(result.entries, 4);
        assert_eq!(result.destination_directory, dest);
        assert!(!result.archive_removed);
        assert!(dest.join("Show/Season 1").is_dir());
        assert_eq!(
            std::fs::read(dest.join("Show/Season 1/e01.mkv")).unwrap(),
            b"episode one"
        );
        assert_eq!(std::fs::read(dest.join("Show/notes.txt")).unwrap(), b"notes");
        assert!(archive.exists());
    }

    #[test]
    fn test_extract_creates_parents_without_dir_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("nested.zip");
        let dest = temp_dir.path().join("out");

        write_zip(&archive, &[("foo/bar/baz.txt", Some("nested zip content"))]);

        extract(&archive, &dest).unwrap();
        assert_eq!(
            std::fs::read_to_string(dest.join("foo/bar/baz.txt")).unwrap(),
            "nested zip content"
        );
    }

    #[test]
    fn test_extract_twice_overwrites_same_bytes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("a.zip");
        let dest = temp_dir.path().join("out");
        write_zip(&archive, &[("file.txt", Some("final content"))]);

        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("file.txt"), "stale and much longer content").unwrap();

        extract(&archive, &dest).unwrap();
        extract(&archive, &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("file.txt")).unwrap(), b"final content");
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_twice_over_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("ro.zip");
        let dest = temp_dir.path().join("out");

        let file = File::create(&archive).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("ro.txt", SimpleFileOptions::default().unix_permissions(0o444))
            .unwrap();
        zip.write_all(b"read only").unwrap();
        zip.finish().unwrap();

        extract(&archive, &dest).unwrap();
        extract(&archive, &dest).unwrap();

        let target = dest.join("ro.txt");
        assert_eq!(std::fs::read(&target).unwrap(), b"read only");
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_replaces_symlink_instead_of_following_it() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("a.zip");
        let dest = temp_dir.path().join("out");
        let outside = temp_dir.path().join("outside.txt");
        std::fs::write(&outside, "untouched").unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::os::unix::fs::symlink(&outside, dest.join("file.txt")).unwrap();

        write_zip(&archive, &[("file.txt", Some("inside"))]);
        extract(&archive, &dest).unwrap();

        assert_eq!(std::fs::read_to_string(&outside).unwrap(), "untouched");
        assert_eq!(std::fs::read_to_string(dest.join("file.txt")).unwrap(), "inside");
    }

    #[test]
    fn test_dot_entry_is_not_counted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("dot.zip");
        let dest = temp_dir.path().join("out");

        write_zip(&archive, &[("./", None), ("a.txt", Some("a"))]);

        let result = extract(&archive, &dest).unwrap();
        assert_eq!(result.entries, 1);
        assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"a");
    }

    #[test]
    fn test_unsafe_entry_rejects_whole_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("mixed.zip");
        let dest = temp_dir.path().join("lib/TV");

        write_zip(
            &archive,
            &[
                ("Show/", None),
                ("Show/e01.mkv", Some("fine")),
                ("../evil.txt", Some("pwned")),
            ],
        );

        let err = extract(&archive, &dest).unwrap_err();
        assert!(matches!(err, ExtractError::UnsafeEntry(_)), "{err}");
        assert!(!dest.join("Show").exists());
        assert!(!temp_dir.path().join("lib/evil.txt").exists());
    }

    #[test]
    fn test_extract_rejects_traversal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("evil.zip");
        let dest = temp_dir.path().join("lib/TV");

        write_zip(&archive, &[("../../evil.txt", Some("pwned"))]);

        let err = extract(&archive, &dest).unwrap_err();
        assert!(matches!(err, ExtractError::UnsafeEntry(ref name) if name == "../../evil.txt"));
        assert!(!temp_dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_extract_not_a_zip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("bogus.zip");
        std::fs::write(&archive, "this is not a zip file").unwrap();

        let err = extract(&archive, &temp_dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ExtractError::Archive(_)), "{err}");
    }

    #[test]
    fn test_extract_missing_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = extract(
            &temp_dir.path().join("missing.zip"),
            &temp_dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::Open { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("exec.zip");
        let dest = temp_dir.path().join("out");

        let file = File::create(&archive).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(
            "run.sh",
            SimpleFileOptions::default().unix_permissions(0o750),
        )
        .unwrap();
        zip.write_all(b"#!/bin/sh\n").unwrap();
        zip.finish().unwrap();

        extract(&archive, &dest).unwrap();

        let mode = std::fs::metadata(dest.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn test_remove_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive = temp_dir.path().join("a.zip");
        std::fs::write(&archive, "x").unwrap();

        remove_archive(&archive).unwrap();
        assert!(!archive.exists());

        let err = remove_archive(&archive).unwrap_err();
        assert_eq!(err.path, archive);
    }
}
