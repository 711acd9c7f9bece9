use std::cmp::Ordering;
use std::collections::HashMap;

use tts_core::{clean_str_for_path, dict_get_dict, normalize_line_endings, JsonDict};

const UNTITLED: &str = "[Untitled]";
const NOTE_EXT: &str = ".txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub file_name: String,
    pub index: usize,
    pub title: String,
    pub body: String,
}

/// Pulls notebook tabs out of the document's `TabStates` mapping, ordered
/// by the numeric value of their keys.
#[derive(Debug, Default)]
pub struct NotesExtractor {
    records: Vec<NoteRecord>,
}

impl NotesExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[NoteRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NoteRecord> {
        self.records
    }

    pub fn extract(&mut self, mod_dict: &JsonDict) {
        let Some(tabs) = dict_get_dict(mod_dict, "TabStates") else {
            return;
        };

        let mut keys: Vec<&String> = tabs.keys().collect();
        keys.sort_by(|a, b| compare_tab_keys(a, b));

        struct Pending {
            index: usize,
            title: String,
            base: String,
            body: String,
        }

        let mut pending: Vec<Pending> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            let Some(tab) = tabs.get(key).and_then(|v| v.as_object()) else {
                continue;
            };
            let Some(body) = tab.get("body").and_then(|v| v.as_str()) else {
                continue;
            };
            let body = normalize_line_endings(body);
            if body.is_empty() {
                continue;
            }

            let title = tab
                .get("title")
                .and_then(|v| v.as_str())
                .map(normalize_line_endings)
                .unwrap_or_default();
            let mut base = clean_str_for_path(&title);
            if base.is_empty() {
                base = UNTITLED.to_string();
            }
            *counts.entry(base.clone()).or_insert(0) += 1;
            pending.push(Pending {
                index,
                title,
                base,
                body,
            });
        }

        let mut occurrence: HashMap<String, usize> = HashMap::new();
        for tab in pending {
            let file_name = if counts[&tab.base] > 1 {
                let n = occurrence.entry(tab.base.clone()).or_insert(0);
                *n += 1;
                format!("{}.{}{}", tab.base, n, NOTE_EXT)
            } else {
                format!("{}{}", tab.base, NOTE_EXT)
            };
            self.records.push(NoteRecord {
                file_name,
                index: tab.index,
                title: tab.title,
                body: tab.body,
            });
        }
    }
}

fn compare_tab_keys(a: &str, b: &str) -> Ordering {
    match (parse_int_prefix(a), parse_int_prefix(b)) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

// Leading-digit parse in the style of JavaScript's parseInt: skip
// whitespace, accept an optional sign, stop at the first non-digit.
fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
