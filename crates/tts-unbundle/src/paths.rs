use std::sync::OnceLock;

use regex::Regex;
use tts_core::clean_str_for_path;

fn xml_ext_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)\.xml$").expect("xml ext regex"))
}

fn sanitize_segments(path: &str, separators: &[char]) -> String {
    path.split(|ch| separators.contains(&ch))
        .map(clean_str_for_path)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Bundled module names use `.` as well as slashes as separators.
pub(crate) fn sanitize_module_path(module_path: &str) -> String {
    sanitize_segments(module_path, &['.', '/', '\\'])
}

/// `foo` and `/foo` are relative; `!/foo` is absolute (resolved from the
/// extraction root); `/!/foo` is the relative path `!/foo`. The returned
/// path keeps a leading `/` to mark absoluteness.
pub(crate) fn sanitize_script_include_path(include_path: &str) -> Option<String> {
    let rel_path = include_path
        .strip_prefix("!/")
        .or_else(|| include_path.strip_prefix("!\\"));
    let is_absolute = rel_path.is_some();

    let sanitized = sanitize_segments(rel_path.unwrap_or(include_path), &['/', '\\']);
    if sanitized.is_empty() {
        return None;
    }

    if is_absolute {
        Some(format!("/{sanitized}"))
    } else {
        Some(sanitized)
    }
}

/// XML include paths are always relative; a trailing `.xml` is stripped
/// before sanitization and re-appended after.
pub(crate) fn sanitize_xml_include_path(include_path: &str) -> Option<String> {
    let without_ext = xml_ext_regex().replace(include_path, "");
    let sanitized = sanitize_segments(&without_ext, &['/', '\\']);
    if sanitized.is_empty() {
        return None;
    }

    Some(format!("{sanitized}.xml"))
}

pub(crate) fn virtual_dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(pos) => path[..pos].to_string(),
        None => ".".to_string(),
    }
}

pub(crate) fn virtual_join(dir: &str, rel: &str) -> String {
    if dir == "." {
        rel.to_string()
    } else {
        format!("{dir}/{rel}")
    }
}
