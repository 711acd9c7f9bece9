use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use tts_core::TtsSaveError;

use crate::error_map::map_save_read;

const SAVES_SUBDIR: &str = "My Games/Tabletop Simulator/Saves";

/// Reads the save document text: stdin when no path was given, the path
/// itself when it exists, otherwise the same name under the default
/// Tabletop Simulator saves directory.
pub(crate) fn read_save_text(path: Option<&str>) -> Result<String, TtsSaveError> {
    let Some(path) = path else {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(map_save_read)?;
        return Ok(text);
    };

    let direct = Path::new(path);
    if direct.exists() {
        return fs::read_to_string(direct).map_err(map_save_read);
    }

    if let Some(fallback) = default_saves_dir().map(|dir| dir.join(path)) {
        if fallback.exists() {
            return fs::read_to_string(&fallback).map_err(map_save_read);
        }
    }

    Err(TtsSaveError::new(
        "CLI_SAVE_NOT_FOUND",
        format!("Save file does not exist: {path}"),
    ))
}

// Tabletop Simulator keeps saves under Documents on Windows and under the
// home directory elsewhere.
fn default_saves_dir() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    let base = if cfg!(windows) {
        dirs.document_dir()?.to_path_buf()
    } else {
        dirs.home_dir().to_path_buf()
    };
    Some(base.join(SAVES_SUBDIR))
}
