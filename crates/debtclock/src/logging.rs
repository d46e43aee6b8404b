use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "debtclock.log";
/// Trim once the log grows past 5 MB
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Recent history kept by a trim
const KEEP_SIZE: u64 = 1024 * 1024;

/// Cut the log back to roughly its last `KEEP_SIZE` bytes of whole lines.
///
/// Returns the number of bytes dropped, or `None` when the log was small
/// enough (or absent).
fn trim_log(log_path: &Path) -> io::Result<Option<u64>> {
    let size = match fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if size <= MAX_LOG_SIZE {
        return Ok(None);
    }

    let mut reader = BufReader::new(File::open(log_path)?);
    reader.seek(SeekFrom::Start(size - KEEP_SIZE))?;
    // The window usually opens mid-line
    let mut partial = Vec::new();
    reader.read_until(b'\n', &mut partial)?;

    let dropped = size - KEEP_SIZE + partial.len() as u64;
    let mut kept = Vec::with_capacity(KEEP_SIZE as usize + 96);
    writeln!(
        kept,
        "--- Log rotated at {}, {dropped} older bytes removed ---",
        jiff::Timestamp::now()
    )?;
    reader.read_to_end(&mut kept)?;
    drop(reader);

    fs::write(log_path, kept)?;
    Ok(Some(dropped))
}

/// Initialize file logging in the data directory.
///
/// Events go to `{data_dir}/debtclock.log`; the terminal itself belongs to
/// the UI. `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<()> {
    fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(LOG_FILE_NAME);

    let trimmed = trim_log(&log_path).unwrap_or_else(|e| {
        eprintln!("Warning: failed to rotate {}: {e}", log_path.display());
        None
    });

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let default_filter = format!("debtclock={level},debtclock_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::info!(log_path = %log_path.display(), "Logging initialized");
    if let Some(dropped) = trimmed {
        tracing::info!(dropped_bytes = dropped, "Log rotated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_small_or_missing_log_is_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "line one\nline two\n").unwrap();

        assert_eq!(trim_log(&path).unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "line one\nline two\n");
        assert_eq!(trim_log(&dir.path().join("missing.log")).unwrap(), None);
    }

    #[test]
    fn test_oversized_log_keeps_recent_whole_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);

        let line = "2025-06-27T00:00:00Z  INFO debtclock_core::chain: Resolved debt figure\n";
        let count = (MAX_LOG_SIZE as usize / line.len()) + 100;
        let mut content = String::with_capacity(count * line.len() + 16);
        for _ in 0..count {
            content.push_str(line);
        }
        content.push_str("newest entry\n");
        fs::write(&path, &content).unwrap();

        let dropped = trim_log(&path).unwrap().unwrap();

        let rotated = fs::read_to_string(&path).unwrap();
        let (marker, body) = rotated.split_once('\n').unwrap();
        assert!(marker.starts_with("--- Log rotated at "));
        assert!(marker.contains(&format!("{dropped} older bytes removed")));
        assert_eq!(dropped + body.len() as u64, content.len() as u64);
        assert!(body.len() as u64 <= KEEP_SIZE);
        assert!(body.ends_with("newest entry\n"));
        for kept in body.lines() {
            assert!(kept == line.trim_end() || kept == "newest entry", "partial line: {kept}");
        }
    }
}
