use std::ffi::OsString;

use clap::Parser;
use tts_core::TtsSaveError;

mod cli_args;
mod download_cmd;
mod error_map;
mod extract_cmd;
mod output_store;
mod save_loader;

pub(crate) use cli_args::{Cli, Mode};
pub(crate) use error_map::emit_error;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, TtsSaveError> {
    match cli.command {
        Mode::Extract(args) => extract_cmd::run_extract(args),
        Mode::Download(args) => download_cmd::run_download(args),
    }
}
