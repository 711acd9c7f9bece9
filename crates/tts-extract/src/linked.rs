use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tts_core::{dict_get_array, dict_get_dict, JsonDict, JsonValue, TtsSaveError};

use crate::walk::walk_objects;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedResourceKind {
    AssetBundle,
    Audio,
    Image,
    Model,
    Pdf,
}

impl LinkedResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AssetBundle => "asset_bundle",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Model => "model",
            Self::Pdf => "pdf",
        }
    }
}

/// Wire format of `linked_resources.json` entries; the kind travels under
/// the `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: LinkedResourceKind,
}

/// Collects every externally linked resource URL in the document,
/// de-duplicated by URL. The first occurrence fixes the kind, even when a
/// later occurrence declares a different one.
#[derive(Debug, Default)]
pub struct LinkedExtractor {
    seen: BTreeSet<String>,
    resources: Vec<ResourceRecord>,
}

impl LinkedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resources(&self) -> &[ResourceRecord] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<ResourceRecord> {
        self.resources
    }

    pub fn extract(&mut self, mod_dict: &JsonDict) -> Result<(), TtsSaveError> {
        self.extract_from_root(mod_dict);

        let Some(objects) = dict_get_array(mod_dict, "ObjectStates") else {
            return Ok(());
        };
        walk_objects(objects, |obj| {
            self.extract_from_object(obj);
            Ok(())
        })
    }

    fn add(&mut self, value: Option<&JsonValue>, kind: LinkedResourceKind) {
        let Some(url) = value.and_then(JsonValue::as_str) else {
            return;
        };
        if url.is_empty() || !self.seen.insert(url.to_string()) {
            return;
        }

        self.resources.push(ResourceRecord {
            url: url.to_string(),
            kind,
        });
    }

    fn extract_from_root(&mut self, mod_dict: &JsonDict) {
        self.add(mod_dict.get("TableURL"), LinkedResourceKind::Image);
        self.add(mod_dict.get("SkyURL"), LinkedResourceKind::Image);

        if let Some(lighting) = dict_get_dict(mod_dict, "Lighting") {
            // Might be more limited than other images.
            self.add(lighting.get("LutURL"), LinkedResourceKind::Image);
        }

        if let Some(player) = dict_get_dict(mod_dict, "MusicPlayer") {
            self.add(player.get("CurrentAudioURL"), LinkedResourceKind::Audio);

            if let Some(library) = dict_get_array(player, "AudioLibrary") {
                for entry in library {
                    if let Some(entry) = entry.as_object() {
                        self.add(entry.get("Item1"), LinkedResourceKind::Audio);
                    }
                }
            }
        }

        if let Some(assets) = dict_get_array(mod_dict, "CustomUIAssets") {
            for entry in assets {
                if let Some(entry) = entry.as_object() {
                    self.add(entry.get("URL"), LinkedResourceKind::Image);
                }
            }
        }
    }

    fn extract_from_object(&mut self, obj: &JsonDict) {
        if let Some(custom) = dict_get_dict(obj, "CustomImage") {
            self.add(custom.get("ImageURL"), LinkedResourceKind::Image);
            self.add(custom.get("ImageSecondaryURL"), LinkedResourceKind::Image);
        }

        if let Some(decks) = dict_get_dict(obj, "CustomDeck") {
            for deck in decks.values() {
                if let Some(deck) = deck.as_object() {
                    self.add(deck.get("FaceURL"), LinkedResourceKind::Image);
                    self.add(deck.get("BackURL"), LinkedResourceKind::Image);
                }
            }
        }

        if let Some(custom) = dict_get_dict(obj, "CustomAssetbundle") {
            self.add(custom.get("AssetbundleURL"), LinkedResourceKind::AssetBundle);
            self.add(
                custom.get("AssetbundleSecondaryURL"),
                LinkedResourceKind::AssetBundle,
            );
        }

        if let Some(custom) = dict_get_dict(obj, "CustomMesh") {
            self.add(custom.get("MeshURL"), LinkedResourceKind::Model);
            self.add(custom.get("DiffuseURL"), LinkedResourceKind::Image);
            self.add(custom.get("NormalURL"), LinkedResourceKind::Image);
            self.add(custom.get("ColliderURL"), LinkedResourceKind::Model);
        }

        if let Some(custom) = dict_get_dict(obj, "CustomPDF") {
            self.add(custom.get("PDFUrl"), LinkedResourceKind::Pdf);
        }
    }
}
