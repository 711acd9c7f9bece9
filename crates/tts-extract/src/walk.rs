use tts_core::{dict_get_array, dict_get_dict, JsonDict, JsonValue, TtsSaveError};

/// Walks the object graph with an explicit stack. The frontier is seeded
/// with the root collection in document order; each pop takes the
/// last-pushed value, and a node's `ContainedObjects` entries and then its
/// `States` variants are pushed before the node is visited. The resulting
/// visit order (last child of the last node first) is part of the output
/// contract; disambiguation indexes depend on it.
pub fn walk_objects<'a>(
    objects: &'a [JsonValue],
    mut visit: impl FnMut(&'a JsonDict) -> Result<(), TtsSaveError>,
) -> Result<(), TtsSaveError> {
    let mut stack: Vec<&JsonValue> = objects.iter().collect();

    while let Some(value) = stack.pop() {
        let Some(obj) = value.as_object() else {
            continue;
        };

        if let Some(contained) = dict_get_array(obj, "ContainedObjects") {
            stack.extend(contained.iter());
        }
        if let Some(states) = dict_get_dict(obj, "States") {
            stack.extend(states.values());
        }

        visit(obj)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_last_pushed_first_and_descends_before_siblings() {
        let objects: JsonValue = serde_json::json!([
            { "Name": "A" },
            {
                "Name": "B",
                "ContainedObjects": [ { "Name": "C" }, { "Name": "D" } ],
            },
        ]);

        let mut seen = Vec::new();
        walk_objects(objects.as_array().expect("array"), |obj| {
            seen.push(obj.get("Name").and_then(JsonValue::as_str).unwrap().to_string());
            Ok(())
        })
        .expect("infallible visitor");

        assert_eq!(seen, vec!["B", "D", "C", "A"]);
    }

    #[test]
    fn state_variants_are_visited_before_contained_objects() {
        let objects: JsonValue = serde_json::json!([
            {
                "Name": "root",
                "ContainedObjects": [ { "Name": "held" } ],
                "States": { "2": { "Name": "alt" } },
            },
        ]);

        let mut seen = Vec::new();
        walk_objects(objects.as_array().expect("array"), |obj| {
            seen.push(obj.get("Name").and_then(JsonValue::as_str).unwrap().to_string());
            Ok(())
        })
        .expect("infallible visitor");

        assert_eq!(seen, vec!["root", "alt", "held"]);
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let objects: JsonValue = serde_json::json!([1, "x", { "Name": "only" }, null]);

        let mut count = 0;
        walk_objects(objects.as_array().expect("array"), |_| {
            count += 1;
            Ok(())
        })
        .expect("infallible visitor");

        assert_eq!(count, 1);
    }
}
