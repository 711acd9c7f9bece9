use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tts-save")]
#[command(about = "Tabletop Simulator save extraction tools")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Extract scripts, markup, linked resources and notebook tabs.
    Extract(ExtractArgs),
    /// Download the resources listed in linked_resources.json.
    Download(DownloadArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ExtractArgs {
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub(crate) output: String,
    #[arg(short = 'a', long = "all")]
    pub(crate) all: bool,
    #[arg(short = 's', long = "scripts")]
    pub(crate) scripts: bool,
    #[arg(short = 'x', long = "xml")]
    pub(crate) xml: bool,
    #[arg(short = 'l', long = "linked")]
    pub(crate) linked: bool,
    #[arg(short = 'n', long = "notes")]
    pub(crate) notes: bool,
    #[arg(short = 'u', long = "unbundle")]
    pub(crate) unbundle: bool,
    /// Save file to read; stdin when omitted. A path that does not exist
    /// is retried under the default Tabletop Simulator saves directory.
    pub(crate) save_file: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct DownloadArgs {
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub(crate) output: String,
}
