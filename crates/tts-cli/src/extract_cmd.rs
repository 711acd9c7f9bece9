use std::path::Path;

use serde::Serialize;
use tts_core::{JsonValue, TtsSaveError};
use tts_extract::{LinkedExtractor, NotesExtractor, ResourceRecord, ScriptExtractor};
use tts_unbundle::{SCRIPT_EXT, XML_EXT};

use crate::cli_args::ExtractArgs;
use crate::error_map::map_save_invalid;
use crate::output_store::{to_padded_json, write_text_file};
use crate::save_loader::read_save_text;

#[derive(Serialize)]
struct ResourceFile<'a> {
    resources: &'a [ResourceRecord],
}

pub(crate) fn run_extract(args: ExtractArgs) -> Result<i32, TtsSaveError> {
    let raw = read_save_text(args.save_file.as_deref())?;
    let document: JsonValue = serde_json::from_str(&raw).map_err(map_save_invalid)?;
    let Some(mod_dict) = document.as_object() else {
        return Ok(0);
    };

    let scripts = args.all || args.scripts || args.xml;
    let linked = args.all || args.linked;
    let notes = args.all || args.notes;
    let unbundle = args.all || args.unbundle;
    let out = Path::new(&args.output);

    if scripts {
        let mut extractor = ScriptExtractor::new(unbundle);
        extractor.extract(mod_dict)?;
        let (records, virtual_files) = extractor.into_parts();

        for record in &records {
            let base = record.base_file_name();
            if let Some(script) = &record.script {
                write_text_file(&out.join("objs").join(format!("{base}{SCRIPT_EXT}")), script)?;
            }
            if let Some(xml) = &record.xml {
                write_text_file(&out.join("objs").join(format!("{base}{XML_EXT}")), xml)?;
            }
        }

        for (path, content) in &virtual_files {
            let relative = path.trim_start_matches('/');
            write_text_file(&out.join("lib").join(relative), content)?;
        }
    }

    if linked {
        let mut extractor = LinkedExtractor::new();
        extractor.extract(mod_dict)?;
        let mut resources = extractor.into_resources();
        resources.sort_by(|a, b| a.url.cmp(&b.url));

        let payload = to_padded_json(&ResourceFile {
            resources: &resources,
        })?;
        write_text_file(&out.join("linked_resources.json"), &payload)?;
    }

    if notes {
        let mut extractor = NotesExtractor::new();
        extractor.extract(mod_dict);
        for record in extractor.records() {
            let body = format!("Title: {}\n\n{}", record.title, record.body);
            write_text_file(&out.join("notes").join(&record.file_name), &body)?;
        }
    }

    Ok(0)
}
