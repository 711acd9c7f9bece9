use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tts_core::{pad_zeros, JsonValue, TtsSaveError};
use tts_extract::{LinkedResourceKind, ResourceRecord};

use crate::cli_args::DownloadArgs;
use crate::error_map::{map_http_client, map_resources_read};
use crate::output_store::{to_padded_json, write_text_file};

const RESOURCE_FILE: &str = "linked_resources.json";
const RESOURCE_DIR: &str = "resources";

pub(crate) fn run_download(args: DownloadArgs) -> Result<i32, TtsSaveError> {
    let out = Path::new(&args.output);
    let resource_path = out.join(RESOURCE_FILE);

    let raw = fs::read_to_string(&resource_path).map_err(map_resources_read)?;
    let mut document: JsonValue =
        serde_json::from_str(&raw).map_err(|_| bad_format())?;
    let count = document
        .as_object()
        .and_then(|root| root.get("resources"))
        .and_then(JsonValue::as_array)
        .ok_or_else(bad_format)?
        .len();

    let pad_width = count.saturating_sub(1).to_string().len();
    let client = reqwest::blocking::Client::builder()
        .build()
        .map_err(map_http_client)?;

    let mut ordinals: HashMap<LinkedResourceKind, usize> = HashMap::new();
    let resource_dir = out.join(RESOURCE_DIR);

    for index in 0..count {
        let entry = document["resources"][index].clone();
        let Ok(record) = serde_json::from_value::<ResourceRecord>(entry) else {
            eprintln!("Skipping bad entry {index}");
            continue;
        };

        let ordinal = ordinals.entry(record.kind).or_insert(0);
        let stem = format!("{}{}", record.kind.as_str(), pad_zeros(*ordinal, pad_width));
        *ordinal += 1;

        println!("Downloading {} as {stem}...", record.url);
        match fetch_resource(&client, &record, &stem, &resource_dir) {
            Ok(file_name) => {
                if let Some(entry) = document["resources"][index].as_object_mut() {
                    entry.insert("fn".to_string(), JsonValue::String(file_name));
                }
                // Persist progress after every download so an aborted run
                // keeps what it already fetched.
                write_text_file(&resource_path, &to_padded_json(&document)?)?;
            }
            Err(_) => {
                eprintln!("Failure downloading/saving {} as {stem}.", record.url);
            }
        }
    }

    Ok(0)
}

fn bad_format() -> TtsSaveError {
    TtsSaveError::new(
        "CLI_RESOURCES_FORMAT",
        "Unrecognized format of resource file.",
    )
}

fn fetch_resource(
    client: &reqwest::blocking::Client,
    record: &ResourceRecord,
    stem: &str,
    resource_dir: &Path,
) -> Result<String, TtsSaveError> {
    let map_download = |error: reqwest::Error| TtsSaveError::new("CLI_DOWNLOAD", error.to_string());
    let response = client
        .get(&record.url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(map_download)?;
    let bytes = response.bytes().map_err(map_download)?;

    let file_name = format!("{stem}{}", sniff_extension(record.kind, &bytes));

    fs::create_dir_all(resource_dir)
        .map_err(|error| TtsSaveError::new("CLI_DOWNLOAD", error.to_string()))?;
    fs::write(resource_dir.join(&file_name), &bytes)
        .map_err(|error| TtsSaveError::new("CLI_DOWNLOAD", error.to_string()))?;
    Ok(file_name)
}

// Servers hosting these resources routinely mislabel content types, so the
// extension comes from the payload's leading bytes instead.
fn sniff_extension(kind: LinkedResourceKind, bytes: &[u8]) -> &'static str {
    match kind {
        LinkedResourceKind::AssetBundle => ".unity3d",
        LinkedResourceKind::Model => ".obj",
        LinkedResourceKind::Pdf => ".pdf",
        LinkedResourceKind::Audio => {
            if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE" {
                ".wav"
            } else if bytes.len() >= 2
                && bytes[0] == 0xFF
                && matches!(bytes[1], 0xFB | 0xF3 | 0xF2)
            {
                ".mp3"
            } else {
                ".WAV"
            }
        }
        LinkedResourceKind::Image => {
            if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
                ".png"
            } else if bytes.starts_with(b"\xFF\xD8\xFF") {
                ".jpg"
            } else {
                ".PNG"
            }
        }
    }
}
