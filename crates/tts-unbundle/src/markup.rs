use std::sync::OnceLock;

use regex::Regex;
use tts_core::{remove_extra_trailing_lf, text_to_xml_attr, TtsSaveError};

use crate::paths::{sanitize_xml_include_path, virtual_dirname, virtual_join};
use crate::tree::VirtualTree;

fn include_comment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"<!--[^\S\n]+include[^\S\n]+([^\n]*?)[^\S\n]+-->")
            .expect("include comment regex")
    })
}

/// Reverses the flattening applied to UI markup. The directive is an
/// `<!-- include path -->` comment; the body runs up to a second verbatim
/// occurrence of the same comment. The parent gets
/// `<Include src="path"/>`; the body, dedented by the directive's leading
/// whitespace, moves to its own virtual file.
pub fn unbundle_xml(tree: &mut VirtualTree, xml: &str) -> Result<String, TtsSaveError> {
    expand_includes(tree, ".", xml)
}

fn expand_includes(
    tree: &mut VirtualTree,
    dir: &str,
    xml: &str,
) -> Result<String, TtsSaveError> {
    let mut result = String::new();
    let mut copied = 0usize;
    let mut search_from = 0usize;

    while let Some(caps) = include_comment_regex().captures(&xml[search_from..]) {
        let comment = caps.get(0).expect("comment match");
        let comment_start = search_from + comment.start();
        let comment_end = search_from + comment.end();
        let comment_text = comment.as_str().to_string();
        let path_token = caps.get(1).expect("path token").as_str().to_string();

        // Comments whose token degenerates (empty, or colliding with the
        // comment terminator) are not directives at all.
        if path_token.trim().is_empty() || path_token.contains("--") {
            search_from = comment_end;
            continue;
        }

        // The directive must sit on its own line end.
        if xml.as_bytes().get(comment_end) != Some(&b'\n') {
            search_from = comment_end;
            continue;
        }
        let body_start = comment_end + 1;

        // Leading horizontal whitespace counts only when it spans from the
        // start of the line to the comment.
        let line_start = xml[..comment_start].rfind('\n').map(|p| p + 1).unwrap_or(0);
        let between = &xml[line_start..comment_start];
        let prefix = if !between.is_empty()
            && between.chars().all(|ch| ch != '\n' && ch.is_whitespace())
        {
            between
        } else {
            ""
        };
        let match_start = comment_start - prefix.len();

        let Some(close_rel) = xml[body_start..].find(&comment_text) else {
            search_from = comment_end;
            continue;
        };
        let close_start = body_start + close_rel;
        let match_end = close_start + comment_text.len();

        match sanitize_xml_include_path(&path_token) {
            None => {
                search_from = match_end;
            }
            Some(sanitized) => {
                let qfn = virtual_join(dir, &sanitized);

                let body = &xml[body_start..close_start];
                let dedented = if prefix.is_empty() {
                    body.to_string()
                } else {
                    body.split('\n')
                        .map(|line| line.strip_prefix(prefix).unwrap_or(line))
                        .collect::<Vec<_>>()
                        .join("\n")
                };

                let expanded = expand_includes(tree, &virtual_dirname(&qfn), &dedented)?;
                tree.insert(qfn, expanded);

                result.push_str(&xml[copied..match_start]);
                result.push_str(prefix);
                result.push_str(&format!(
                    "<Include src=\"{}\"/>",
                    text_to_xml_attr(&path_token)?
                ));
                copied = match_end;
                search_from = match_end;
            }
        }
    }

    result.push_str(&xml[copied..]);
    Ok(remove_extra_trailing_lf(&result))
}
