use std::fmt::Display;

use tts_core::TtsSaveError;

fn map_error(code: &'static str, error: impl Display) -> TtsSaveError {
    TtsSaveError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: TtsSaveError) -> i32 {
    eprintln!("{error}");
    1
}

pub(crate) fn map_save_read(error: std::io::Error) -> TtsSaveError {
    map_error("CLI_SAVE_READ", error)
}

pub(crate) fn map_save_invalid(error: serde_json::Error) -> TtsSaveError {
    map_error("CLI_SAVE_INVALID", error)
}

pub(crate) fn map_output_write(error: std::io::Error) -> TtsSaveError {
    map_error("CLI_OUTPUT_WRITE", error)
}

pub(crate) fn map_resources_read(error: std::io::Error) -> TtsSaveError {
    map_error("CLI_RESOURCES_READ", error)
}

pub(crate) fn map_resources_encode(error: serde_json::Error) -> TtsSaveError {
    map_error("CLI_RESOURCES_ENCODE", error)
}

pub(crate) fn map_http_client(error: reqwest::Error) -> TtsSaveError {
    map_error("CLI_HTTP_CLIENT", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(TtsSaveError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(
            map_save_read(std::io::Error::other("read")).code,
            "CLI_SAVE_READ"
        );
        assert_eq!(
            map_output_write(std::io::Error::other("write")).code,
            "CLI_OUTPUT_WRITE"
        );
        assert_eq!(
            map_resources_read(std::io::Error::other("read")).code,
            "CLI_RESOURCES_READ"
        );

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_save_invalid(invalid).code, "CLI_SAVE_INVALID");
    }
}
