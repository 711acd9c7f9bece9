use std::sync::OnceLock;

use regex::Regex;
use tts_core::chomp;

use crate::bundle::unbundle_modules;
use crate::paths::{
    sanitize_module_path, sanitize_script_include_path, virtual_dirname, virtual_join,
};
use crate::tree::VirtualTree;
use crate::SCRIPT_EXT;

fn include_open_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?m)^----([^\S\n]*#include[^\S\n]+(\S(?:[^\n]*\S)?)[^\S\n]*)\n")
            .expect("include open regex")
    })
}

fn wrapped_path_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?s)^<(.*)>$").expect("wrapped path regex"))
}

fn wrapped_body_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?s)^do\n(.*)\nend$").expect("wrapped body regex"))
}

/// Reverses the flattening applied to one script: module unbundling first,
/// then recursive `#include` fence expansion. Returns the rewritten
/// top-level script; every extracted file lands in `tree`.
pub fn unbundle_script(tree: &mut VirtualTree, script: &str) -> String {
    let script = match unbundle_modules(script) {
        Some(unbundled) => {
            for (name, content) in unbundled.modules {
                let base = sanitize_module_path(&name);
                if base.is_empty() {
                    continue;
                }
                // Bundled modules never use #include themselves.
                tree.insert(format!("{base}{SCRIPT_EXT}"), content);
            }
            unbundled.root_content
        }
        None => script.to_string(),
    };

    expand_includes(tree, ".", &script)
}

/// An include directive is a fence line `----<tag>` (where the tag is
/// `#include <path>`), a body, and a second line carrying the identical
/// tag. The body moves to its own virtual file; the parent keeps the
/// opening fence line.
fn expand_includes(tree: &mut VirtualTree, dir: &str, script: &str) -> String {
    let mut result = String::new();
    let mut copied = 0usize;
    let mut search_from = 0usize;

    while let Some(caps) = include_open_regex().captures(&script[search_from..]) {
        let open = caps.get(0).expect("open match");
        let open_start = search_from + open.start();
        let open_end = search_from + open.end();
        let tag = caps.get(1).expect("tag").as_str().to_string();
        let raw_path = caps.get(2).expect("path token").as_str().to_string();

        let close_line = format!("----{tag}");
        let Some(close_rel) = find_line(&script[open_end..], &close_line) else {
            // No matching closing fence; the opening line is plain text.
            search_from = open_end;
            continue;
        };
        let close_start = open_end + close_rel;
        let match_end = close_start + close_line.len();

        let mut body = chomp(&script[open_end..close_start]).to_string();
        let mut path_token = raw_path;
        if let Some(wrapped) = wrapped_path_regex().captures(&path_token) {
            path_token = wrapped.get(1).expect("inner path").as_str().to_string();
            if let Some(inner) = wrapped_body_regex().captures(&body) {
                body = inner.get(1).expect("inner body").as_str().to_string();
            }
        }

        match sanitize_script_include_path(&path_token) {
            None => {
                // Unresolvable path: the whole directive stays as-is.
                search_from = match_end;
            }
            Some(sanitized) => {
                let qfn = match sanitized.strip_prefix('/') {
                    Some(absolute) => format!("{absolute}{SCRIPT_EXT}"),
                    None => format!("{}{SCRIPT_EXT}", virtual_join(dir, &sanitized)),
                };
                let expanded = expand_includes(tree, &virtual_dirname(&qfn), &body);
                tree.insert(qfn, expanded);

                result.push_str(&script[copied..open_start]);
                result.push_str("----");
                result.push_str(&tag);
                copied = match_end;
                search_from = match_end;
            }
        }
    }

    result.push_str(&script[copied..]);
    result
}

fn find_line(text: &str, needle: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut from = 0usize;
    while let Some(found) = text[from..].find(needle) {
        let start = from + found;
        let end = start + needle.len();
        let at_line_start = start == 0 || bytes[start - 1] == b'\n';
        let at_line_end = end == text.len() || bytes[end] == b'\n';
        if at_line_start && at_line_end {
            return Some(start);
        }
        from = start + 1;
    }
    None
}
