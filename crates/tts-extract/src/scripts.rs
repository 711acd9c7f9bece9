use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use tts_core::{
    clean_str_for_path, dict_get_array, dict_get_dict, dict_get_str, normalize_line_endings,
    JsonDict, JsonValue, TtsSaveError,
};
use tts_unbundle::{unbundle_script, unbundle_xml, VirtualTree};

use crate::walk::walk_objects;

/// Reserved name/identifier pair for the document root's own scripts.
const GLOBAL_NAME: &str = "Global";
const GLOBAL_GUID: &str = "-1";

/// One graph node that owns inline script and/or markup content. `index`
/// is 0 for unique identifiers, otherwise the 1-based occurrence number in
/// visit order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRecord {
    pub name: String,
    pub guid: String,
    pub index: usize,
    pub script: Option<String>,
    pub xml: Option<String>,
}

impl ScriptRecord {
    pub fn base_file_name(&self) -> String {
        if self.index > 0 {
            format!("{}.{}-{}", self.name, self.guid, self.index)
        } else {
            format!("{}.{}", self.name, self.guid)
        }
    }
}

fn guid_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{6}$").expect("guid regex"))
}

/// Harvests inline scripts and UI markup from one document. Use a fresh
/// instance per document.
#[derive(Debug, Default)]
pub struct ScriptExtractor {
    unbundle: bool,
    records: Vec<ScriptRecord>,
    tree: VirtualTree,
}

impl ScriptExtractor {
    pub fn new(unbundle: bool) -> Self {
        Self {
            unbundle,
            records: Vec::new(),
            tree: VirtualTree::new(),
        }
    }

    pub fn records(&self) -> &[ScriptRecord] {
        &self.records
    }

    pub fn virtual_files(&self) -> &BTreeMap<String, String> {
        self.tree.files()
    }

    pub fn into_parts(self) -> (Vec<ScriptRecord>, BTreeMap<String, String>) {
        (self.records, self.tree.into_files())
    }

    pub fn extract(&mut self, mod_dict: &JsonDict) -> Result<(), TtsSaveError> {
        self.extract_node(GLOBAL_NAME, GLOBAL_GUID, 0, mod_dict)?;

        let Some(objects) = dict_get_array(mod_dict, "ObjectStates") else {
            return Ok(());
        };

        let mut counts: HashMap<String, usize> = HashMap::new();
        count_guids(&mut counts, objects.iter());
        let flagged: HashSet<String> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(guid, _)| guid)
            .collect();

        let mut occurrence: HashMap<String, usize> = HashMap::new();
        walk_objects(objects, |obj| {
            self.extract_object(&flagged, &mut occurrence, obj)
        })
    }

    fn extract_object(
        &mut self,
        flagged: &HashSet<String>,
        occurrence: &mut HashMap<String, usize>,
        obj: &JsonDict,
    ) -> Result<(), TtsSaveError> {
        let name = ["Nickname", "Name"].iter().find_map(|key| {
            dict_get_str(obj, key)
                .map(clean_str_for_path)
                .filter(|name| !name.is_empty())
        });
        let Some(name) = name else {
            return Ok(());
        };
        let Some(guid) = dict_get_str(obj, "GUID").filter(|guid| guid_regex().is_match(guid))
        else {
            return Ok(());
        };

        if !has_inline_payload(obj) {
            return Ok(());
        }

        let index = if flagged.contains(guid) {
            let slot = occurrence.entry(guid.to_string()).or_insert(0);
            *slot += 1;
            *slot
        } else {
            0
        };

        self.extract_node(&name, guid, index, obj)
    }

    fn extract_node(
        &mut self,
        name: &str,
        guid: &str,
        index: usize,
        dict: &JsonDict,
    ) -> Result<(), TtsSaveError> {
        if !has_inline_payload(dict) {
            return Ok(());
        }

        let mut script = dict_get_str(dict, "LuaScript")
            .filter(|s| !s.is_empty())
            .map(normalize_line_endings);
        let mut xml = dict_get_str(dict, "XmlUI")
            .filter(|s| !s.is_empty())
            .map(normalize_line_endings);

        if self.unbundle {
            if let Some(s) = script.take() {
                script = Some(unbundle_script(&mut self.tree, &s));
            }
            if let Some(x) = xml.take() {
                xml = Some(unbundle_xml(&mut self.tree, &x)?);
            }
        }

        self.records.push(ScriptRecord {
            name: name.to_string(),
            guid: guid.to_string(),
            index,
            script,
            xml,
        });
        Ok(())
    }
}

fn has_inline_payload(dict: &JsonDict) -> bool {
    dict_get_str(dict, "LuaScript").is_some_and(|s| !s.is_empty())
        || dict_get_str(dict, "XmlUI").is_some_and(|s| !s.is_empty())
}

fn count_guids<'a>(
    counts: &mut HashMap<String, usize>,
    objects: impl Iterator<Item = &'a JsonValue>,
) {
    for value in objects {
        let Some(obj) = value.as_object() else {
            continue;
        };
        let Some(guid) = dict_get_str(obj, "GUID") else {
            continue;
        };
        let cleaned = clean_str_for_path(guid);
        if cleaned.is_empty() {
            continue;
        }
        *counts.entry(cleaned).or_insert(0) += 1;

        if let Some(contained) = dict_get_array(obj, "ContainedObjects") {
            count_guids(counts, contained.iter());
        }
        if let Some(states) = dict_get_dict(obj, "States") {
            count_guids(counts, states.values());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(doc: &JsonValue, unbundle: bool) -> ScriptExtractor {
        let mut extractor = ScriptExtractor::new(unbundle);
        extractor
            .extract(doc.as_object().expect("document object"))
            .expect("extraction");
        extractor
    }

    #[test]
    fn document_root_is_the_global_record() {
        let doc = serde_json::json!({
            "LuaScript": "print(1)\r\n",
            "XmlUI": "<Panel/>",
            "ObjectStates": [],
        });
        let extractor = extract(&doc, false);

        let records = extractor.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Global");
        assert_eq!(records[0].guid, "-1");
        assert_eq!(records[0].index, 0);
        assert_eq!(records[0].script.as_deref(), Some("print(1)\n"));
        assert_eq!(records[0].xml.as_deref(), Some("<Panel/>"));
        assert_eq!(records[0].base_file_name(), "Global.-1");
    }

    #[test]
    fn nodes_without_name_or_valid_guid_are_skipped() {
        let doc = serde_json::json!({
            "ObjectStates": [
                { "GUID": "abc123", "LuaScript": "x" },
                { "Nickname": "NoGuid", "LuaScript": "x" },
                { "Nickname": "BadGuid", "GUID": "zzzzzz", "LuaScript": "x" },
                { "Nickname": "ShortGuid", "GUID": "ab12", "LuaScript": "x" },
                { "Nickname": "Good", "GUID": "ab12cd", "LuaScript": "x" },
            ],
        });
        let extractor = extract(&doc, false);

        let names: Vec<&str> = extractor.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
    }

    #[test]
    fn nickname_wins_over_name_and_empty_nickname_falls_through() {
        let doc = serde_json::json!({
            "ObjectStates": [
                { "Nickname": "Nick", "Name": "Card", "GUID": "000001", "LuaScript": "x" },
                { "Nickname": "", "Name": "Card", "GUID": "000002", "LuaScript": "x" },
            ],
        });
        let extractor = extract(&doc, false);

        let names: Vec<&str> = extractor.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Card", "Nick"]);
    }

    #[test]
    fn unique_identifiers_carry_no_suffix() {
        let doc = serde_json::json!({
            "ObjectStates": [
                { "Name": "Card", "GUID": "abc123", "LuaScript": "x" },
            ],
        });
        let extractor = extract(&doc, false);
        assert_eq!(extractor.records()[0].base_file_name(), "Card.abc123");
    }

    #[test]
    fn repeated_identifiers_get_occurrence_suffixes_in_visit_order() {
        let doc = serde_json::json!({
            "ObjectStates": [
                { "Name": "One", "GUID": "abc123", "LuaScript": "x" },
                { "Name": "Two", "GUID": "abc123", "LuaScript": "x" },
                { "Name": "Three", "GUID": "abc123", "LuaScript": "x" },
            ],
        });
        let extractor = extract(&doc, false);

        let names: Vec<String> = extractor
            .records()
            .iter()
            .map(ScriptRecord::base_file_name)
            .collect();
        assert_eq!(
            names,
            vec!["Three.abc123-1", "Two.abc123-2", "One.abc123-3"]
        );
    }

    #[test]
    fn contained_and_state_nodes_count_toward_disambiguation() {
        let doc = serde_json::json!({
            "ObjectStates": [
                {
                    "Name": "Bag",
                    "GUID": "abc123",
                    "LuaScript": "x",
                    "ContainedObjects": [
                        { "Name": "Inner", "GUID": "abc123", "LuaScript": "y" },
                    ],
                },
            ],
        });
        let extractor = extract(&doc, false);

        let names: Vec<String> = extractor
            .records()
            .iter()
            .map(ScriptRecord::base_file_name)
            .collect();
        assert_eq!(names, vec!["Bag.abc123-1", "Inner.abc123-2"]);
    }

    #[test]
    fn unbundling_collects_virtual_files() {
        let doc = serde_json::json!({
            "LuaScript": "----#include A\nHELLO\n----#include A\n",
            "ObjectStates": [],
        });
        let extractor = extract(&doc, true);

        assert_eq!(
            extractor.records()[0].script.as_deref(),
            Some("----#include A\n")
        );
        assert_eq!(
            extractor.virtual_files().get("A.ttslua"),
            Some(&"HELLO".to_string())
        );
    }

    #[test]
    fn unbundling_disabled_keeps_directives_inline() {
        let doc = serde_json::json!({
            "LuaScript": "----#include A\nHELLO\n----#include A\n",
            "ObjectStates": [],
        });
        let extractor = extract(&doc, false);

        assert_eq!(
            extractor.records()[0].script.as_deref(),
            Some("----#include A\nHELLO\n----#include A\n")
        );
        assert!(extractor.virtual_files().is_empty());
    }

    #[test]
    fn empty_script_strings_are_treated_as_absent() {
        let doc = serde_json::json!({
            "ObjectStates": [
                { "Name": "Quiet", "GUID": "000003", "LuaScript": "", "XmlUI": "" },
            ],
        });
        let extractor = extract(&doc, false);
        assert!(extractor.records().is_empty());
    }
}
