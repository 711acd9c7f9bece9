use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// A script taken apart into its bundled modules: the root module's source
/// plus every other registered module, in registration order.
#[derive(Debug, Clone)]
pub struct UnbundledModules {
    pub root_content: String,
    pub modules: Vec<(String, String)>,
}

const METADATA_PREFIX: &str = "-- Bundled by luabundle ";

#[derive(Debug, Deserialize)]
struct BundleMetadata {
    #[serde(default = "default_root_module_name", rename = "rootModuleName")]
    root_module_name: String,
}

fn default_root_module_name() -> String {
    "__root".to_string()
}

fn register_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r#"(?m)^__bundle_register\("((?:\\.|[^"\\])*)",\s*function\(\s*require,\s*_LOADED,\s*__bundle_register,\s*__bundle_modules\s*\)\n"#,
        )
        .expect("register regex")
    })
}

fn trailer_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?m)^return __bundle_require\(").expect("trailer regex"))
}

fn end_line_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?m)^end\)$").expect("end line regex"))
}

/// The metadata comment is emitted on the first line by current bundlers,
/// but older saves carry it as a footer. Accept either.
fn read_metadata(script: &str) -> Option<BundleMetadata> {
    let mut non_blank = script.lines().filter(|line| !line.trim().is_empty());
    let first = non_blank.next()?;
    let last = non_blank.next_back().unwrap_or(first);

    [first, last].iter().find_map(|line| {
        let raw = line.strip_prefix(METADATA_PREFIX)?;
        serde_json::from_str::<BundleMetadata>(raw.trim()).ok()
    })
}

fn unescape_lua_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Detects the module-bundle layout and takes it apart. `None` means the
/// script is not a recognizable bundle and must be used as-is; a bundle
/// whose root module cannot be found is treated the same way.
pub fn unbundle_modules(script: &str) -> Option<UnbundledModules> {
    let metadata = read_metadata(script)?;

    let headers: Vec<(String, usize, usize)> = register_regex()
        .captures_iter(script)
        .map(|caps| {
            let whole = caps.get(0).expect("match");
            let name = unescape_lua_string(caps.get(1).expect("module name").as_str());
            (name, whole.start(), whole.end())
        })
        .collect();
    if headers.is_empty() {
        return None;
    }

    let trailer_start = trailer_regex()
        .find(script)
        .map(|m| m.start())
        .unwrap_or(script.len());

    let mut root_content: Option<String> = None;
    let mut modules = Vec::new();
    for (i, (name, _, content_start)) in headers.iter().enumerate() {
        let region_end = headers
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(trailer_start);
        let region = &script[*content_start..region_end.max(*content_start)];

        // Module bodies may contain their own `end)` lines; the block's
        // terminator is the last one in the region.
        let Some(end) = end_line_regex().find_iter(region).last() else {
            continue;
        };
        let content = tts_core::chomp(&region[..end.start()]).to_string();

        if *name == metadata.root_module_name && root_content.is_none() {
            root_content = Some(content);
        } else {
            modules.push((name.clone(), content));
        }
    }

    Some(UnbundledModules {
        root_content: root_content?,
        modules,
    })
}
