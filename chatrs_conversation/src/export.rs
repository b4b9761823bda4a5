//! Plain-text transcript download.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::history::History;

pub const EXPORT_FILE_NAME: &str = "chat_history.txt";

/// Write the transcript to `<dir>/chat_history.txt`, replacing any previous export.
pub fn write_export(history: &History, dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, history.format_for_export())?;
    info!("Exported {} turns to {}", history.len(), path.display());
    Ok(path)
}
