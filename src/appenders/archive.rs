//! Archive naming, ordering, and retention policy
//!
//! Pure policy functions used by [`FileAppender`](crate::appenders::FileAppender)
//! when the live file would overflow. Given a directory listing they decide
//! which siblings are archives of a base name, how they order, which ones to
//! prune, and what the next archive is called.
//!
//! Archives are named `<stem>.<yyyyMMdd>.<sequence><ext>`, where `<stem>` is
//! the live file name minus its extension and the sequence number restarts
//! from the newest existing archive, whatever its date. Ordering is by name
//! length first and lexically second. Note that this mis-orders archives
//! across a date boundary once sequence numbers gain a digit: a short
//! `app.20250830.0.log` sorts before a longer `app.20250829.10.log`. The rule
//! is kept as-is for compatibility with existing archive directories.

use crate::core::error::{Result, SinkError};
use chrono::Local;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Split a live file name into the pattern stem (up to the first `.`) and
/// the extension (from the last `.`, inclusive).
///
/// The two differ for dotted base names: `my.app.log` has pattern stem `my`
/// but archives under the stem `my.app` (see [`archive_file_name`]).
pub fn pattern_parts(file_name: &str) -> (&str, &str) {
    let stem = match file_name.find('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };
    let ext = match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    };
    (stem, ext)
}

/// Whether `name` matches the archive glob `<stem>.**.**<ext>`: it begins
/// with `<stem>.`, ends with `<ext>`, and keeps at least one `.` in between.
/// The live file itself never matches.
pub fn is_archive_name(name: &str, stem: &str, ext: &str) -> bool {
    let Some(rest) = name.strip_prefix(stem).and_then(|r| r.strip_prefix('.')) else {
        return false;
    };
    match rest.strip_suffix(ext) {
        Some(mid) => mid.contains('.'),
        None => false,
    }
}

/// Archive ordering: name length ascending, then lexical. The first element
/// under this order is treated as the oldest archive.
pub fn archive_order(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Parse the sequence number out of an archive name: the segment between the
/// second-to-last and last `.`. Returns 0 when the name has fewer than two
/// dots or the segment is not an integer.
pub fn sequence_no(name: &str) -> u32 {
    let Some(last) = name.rfind('.') else { return 0 };
    let Some(prev) = name[..last].rfind('.') else {
        return 0;
    };
    name[prev + 1..last].parse().unwrap_or(0)
}

/// Build the archive file name for the live file `file_name` with the given
/// `yyyyMMdd` date string and sequence number.
pub fn archive_file_name(file_name: &str, date: &str, sequence: u32) -> String {
    let (_, ext) = pattern_parts(file_name);
    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };
    format!("{stem}.{date}.{sequence}{ext}")
}

/// Archive the live file at `path`: prune old archives down to the retention
/// limit and rename the live file to its dated archive name, replacing any
/// file already carrying that name. Returns the archive path.
///
/// Pruning failures are reported to stderr and do not abort the rotation;
/// a failed rename is an error, leaving the live file in place (and possibly
/// oversized) until the next rotation attempt.
pub fn archive(path: &Path, max_history: usize) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            SinkError::file_rotation(path.display().to_string(), "path has no file name")
        })?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (stem, ext) = pattern_parts(file_name);

    let mut archives: Vec<String> = fs::read_dir(&parent)
        .map_err(|e| {
            SinkError::io_operation(
                "listing archive directory",
                format!("cannot read '{}'", parent.display()),
                e,
            )
        })?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| is_archive_name(name, stem, ext))
        .collect();

    archives.sort_by(|a, b| archive_order(a, b));

    // The next sequence number comes from the newest archive regardless of
    // what pruning removes below. Saturate at u32::MAX rather than panic on
    // a hostile archive name.
    let next_no = archives
        .last()
        .map(|newest| sequence_no(newest).saturating_add(1))
        .unwrap_or(0);

    // Keep room for the incoming archive so the retained count stays within
    // max_history after the rename lands.
    let keep = max_history.saturating_sub(1);
    let excess = archives.len().saturating_sub(keep);
    for name in archives.iter().take(excess) {
        let old = parent.join(name);
        if let Err(e) = fs::remove_file(&old) {
            eprintln!(
                "[SINK WARNING] Failed to remove old archive {}: {}",
                old.display(),
                e
            );
        }
    }

    let date = Local::now().format("%Y%m%d").to_string();
    let target = parent.join(archive_file_name(file_name, &date, next_no));

    // rename replaces an existing target on Unix; on platforms where it does
    // not, fall back to remove-then-rename.
    if let Err(first_err) = fs::rename(path, &target) {
        if target.exists() {
            let _ = fs::remove_file(&target);
            fs::rename(path, &target).map_err(|e| {
                SinkError::file_rotation(
                    path.display().to_string(),
                    format!("failed to move live file to '{}': {}", target.display(), e),
                )
            })?;
        } else {
            return Err(SinkError::file_rotation(
                path.display().to_string(),
                format!(
                    "failed to move live file to '{}': {}",
                    target.display(),
                    first_err
                ),
            ));
        }
    }

    Ok(target)
}
