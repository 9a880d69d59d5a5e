//! Best-effort helpers for the engine's intermediate files. Failures are
//! logged and never escalated.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A fresh path in the system temp dir. The file itself is not created.
pub fn temp_file_path(prefix: &str, extension: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let pid = std::process::id();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    if extension.is_empty() {
        path.push(format!("{prefix}-{pid}-{now}-{seq}"));
    } else {
        path.push(format!("{prefix}-{pid}-{now}-{seq}.{extension}"));
    }
    path
}

pub fn read_txt_file(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            error!("Cannot read file {}: {err}", path.display());
            None
        }
    }
}

pub fn write_to_text_file(path: &Path, data: &str) {
    if let Err(err) = fs::write(path, data) {
        error!("Cannot write to file {}: {err}", path.display());
    }
}

pub fn delete_file(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(err) = fs::remove_file(path) {
        info!("Cannot delete file {}: {err}", path.display());
    }
}
