use std::fs;
use std::path::Path;

use serde::Serialize;
use tts_core::{ensure_trailing_lf, normalize_line_endings, TtsSaveError};

use crate::error_map::{map_output_write, map_resources_encode};

/// Writes a text file with a guaranteed trailing newline and native line
/// endings, creating parent directories as needed.
pub(crate) fn write_text_file(path: &Path, content: &str) -> Result<(), TtsSaveError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(map_output_write)?;

    let mut text = ensure_trailing_lf(&normalize_line_endings(content));
    if cfg!(windows) {
        text = text.replace('\n', "\r\n");
    }
    fs::write(path, text).map_err(map_output_write)
}

// linked_resources.json uses three-space indentation.
pub(crate) fn to_padded_json<T: Serialize>(value: &T) -> Result<String, TtsSaveError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer).map_err(map_resources_encode)?;

    String::from_utf8(buffer)
        .map_err(|error| TtsSaveError::new("CLI_RESOURCES_ENCODE", error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_text_file_creates_parents_and_appends_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a").join("b").join("out.txt");

        write_text_file(&path, "body").expect("write");

        let written = fs::read_to_string(&path).expect("read back");
        if cfg!(windows) {
            assert_eq!(written, "body\r\n");
        } else {
            assert_eq!(written, "body\n");
        }
    }

    #[test]
    fn stray_carriage_returns_never_reach_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");

        write_text_file(&path, "Title: a\r\nb\rc").expect("write");

        let written = fs::read_to_string(&path).expect("read back");
        if cfg!(windows) {
            assert_eq!(written, "Title: a\r\nbc\r\n");
        } else {
            assert_eq!(written, "Title: a\nbc\n");
        }
    }

    #[test]
    fn padded_json_uses_three_space_indent() {
        let value = serde_json::json!({ "resources": [ { "url": "http://x" } ] });
        let text = to_padded_json(&value).expect("serialize");
        assert!(text.contains("\n   \"resources\": [\n"));
        assert!(text.contains("\n      {\n"));
    }
}
