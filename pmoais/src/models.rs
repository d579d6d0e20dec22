//! Data models for the speaker and provider responses
//!
//! This module contains the gate identity record, the audio status snapshot,
//! the browse-media tree cached by callers and the metadata record shared
//! after a successful resolution.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Gate
// ============================================================================

/// Identity/capability record reported by the speaker root endpoint
///
/// Serializes back to the flat shape the speaker uses: the passthrough
/// fields plus `ais_id`, `ais_url` and `NetworkSpeed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateInfo {
    /// `gate_id`, or `ais_gate_client_id` when the former is missing
    #[serde(rename = "ais_id")]
    pub gate_id: Option<String>,
    /// Reported network speed, 0 when absent
    #[serde(rename = "NetworkSpeed", default)]
    pub network_speed: i64,
    /// Normalized speaker URL the record was fetched from
    #[serde(rename = "ais_url")]
    pub base_url: String,
    /// Every other field of the raw response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GateInfo {
    /// Compose the gate info from the raw root response
    pub fn from_response(raw: Value, base_url: impl Into<String>) -> Result<Self> {
        let mut fields = match raw {
            Value::Object(map) => map,
            other => {
                return Err(Error::parse(format!(
                    "gate info is not an object: {}",
                    other
                )))
            }
        };

        let gate_id = if fields.contains_key("gate_id") {
            fields.get("gate_id").and_then(value_as_string)
        } else {
            fields.get("ais_gate_client_id").and_then(value_as_string)
        };

        // an unreadable speed stays in `extra` as reported
        let reported = fields.get("NetworkSpeed").map(speed_from_value);
        let network_speed = match reported {
            None => 0,
            Some(Some(speed)) => {
                fields.remove("NetworkSpeed");
                speed
            }
            Some(None) => 0,
        };

        fields.remove("ais_id");
        fields.remove("ais_url");

        Ok(Self {
            gate_id,
            network_speed,
            base_url: base_url.into(),
            extra: fields,
        })
    }

    /// Passthrough field from the raw response
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Integer, or integer written as a string
fn speed_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// Audio status
// ============================================================================

/// Last known playback status, kept as an opaque mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioStatus(pub Map<String, Value>);

impl AudioStatus {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Provider listings
// ============================================================================

/// Body of a provider listing or name lookup
///
/// Tune-in answers with OPML text, every other provider with JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderListing {
    Text(String),
    Json(Value),
}

impl ProviderListing {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

// ============================================================================
// Browse media cache
// ============================================================================

/// A node of a browsed media tree, as handed over by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseMedia {
    pub media_content_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub media_class: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<BrowseMedia>>,
}

impl BrowseMedia {
    pub fn new(media_content_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_content_id: media_content_id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_media_class(mut self, media_class: impl Into<String>) -> Self {
        self.media_class = Some(media_class.into());
        self
    }

    pub fn with_children(mut self, children: Vec<BrowseMedia>) -> Self {
        self.children = Some(children);
        self
    }

    /// Node matching `media_content_id`: the root itself or one of its
    /// direct children. Grandchildren are not searched.
    pub fn find(&self, media_content_id: &str) -> Option<&BrowseMedia> {
        if self.media_content_id == media_content_id {
            return Some(self);
        }

        self.children
            .as_ref()?
            .iter()
            .find(|child| child.media_content_id == media_content_id)
    }
}

/// Display metadata shared with other clients after a resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub media_title: Option<String>,
    pub media_source: Option<String>,
    pub media_stream_image: Option<String>,
    pub media_album_name: Option<String>,
    pub media_content_id: String,
}

impl ResolvedMedia {
    /// Build from a browse node, stamped with the resolved content id
    pub fn from_node(node: &BrowseMedia, resolved_content_id: impl Into<String>) -> Self {
        Self {
            media_title: node.title.clone(),
            media_source: node.title.clone(),
            media_stream_image: node.thumbnail.clone(),
            media_album_name: node.media_class.clone(),
            media_content_id: resolved_content_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://ais-dom.local:8122";

    #[test]
    fn test_gate_id_prefers_gate_id() {
        let info = GateInfo::from_response(
            json!({"gate_id": "abc", "ais_gate_client_id": "xyz"}),
            BASE,
        )
        .unwrap();
        assert_eq!(info.gate_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_gate_id_falls_back_to_client_id() {
        let info = GateInfo::from_response(json!({"ais_gate_client_id": "xyz"}), BASE).unwrap();
        assert_eq!(info.gate_id.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_gate_id_absent() {
        let info = GateInfo::from_response(json!({"Product": "AIS"}), BASE).unwrap();
        assert!(info.gate_id.is_none());
        assert_eq!(info.get("Product"), Some(&json!("AIS")));
    }

    #[test]
    fn test_network_speed_default() {
        let info = GateInfo::from_response(json!({"gate_id": "abc"}), BASE).unwrap();
        assert_eq!(info.network_speed, 0);

        let info =
            GateInfo::from_response(json!({"gate_id": "abc", "NetworkSpeed": 72}), BASE).unwrap();
        assert_eq!(info.network_speed, 72);
    }

    #[test]
    fn test_network_speed_as_string() {
        let info =
            GateInfo::from_response(json!({"gate_id": "a", "NetworkSpeed": "100"}), BASE).unwrap();
        assert_eq!(info.network_speed, 100);
        assert!(info.get("NetworkSpeed").is_none());
    }

    #[test]
    fn test_network_speed_unreadable_is_kept() {
        let info =
            GateInfo::from_response(json!({"gate_id": "a", "NetworkSpeed": "fast"}), BASE).unwrap();
        assert_eq!(info.network_speed, 0);
        assert_eq!(info.get("NetworkSpeed"), Some(&json!("fast")));

        let info =
            GateInfo::from_response(json!({"gate_id": "a", "NetworkSpeed": 12.5}), BASE).unwrap();
        assert_eq!(info.network_speed, 0);
        assert_eq!(info.get("NetworkSpeed"), Some(&json!(12.5)));
    }

    #[test]
    fn test_gate_info_serializes_flat() {
        let info = GateInfo::from_response(json!({"gate_id": "abc", "Model": "X"}), BASE).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["ais_id"], "abc");
        assert_eq!(value["ais_url"], BASE);
        assert_eq!(value["NetworkSpeed"], 0);
        assert_eq!(value["gate_id"], "abc");
        assert_eq!(value["Model"], "X");
    }

    #[test]
    fn test_gate_info_rejects_non_object() {
        let err = GateInfo::from_response(json!(["not", "an", "object"]), BASE).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_browse_media_find() {
        let tree = BrowseMedia::new("ais_radio", "Radio").with_children(vec![
            BrowseMedia::new("ais_radio/Muzyka", "Muzyka"),
            BrowseMedia::new("ais_radio/Wiadomosci", "Wiadomości")
                .with_children(vec![BrowseMedia::new("deep", "Deep")]),
        ]);

        assert_eq!(tree.find("ais_radio").unwrap().title.as_deref(), Some("Radio"));
        assert_eq!(
            tree.find("ais_radio/Muzyka").unwrap().title.as_deref(),
            Some("Muzyka")
        );
        assert!(tree.find("deep").is_none());
        assert!(tree.find("ais_podcast").is_none());
    }

    #[test]
    fn test_resolved_media_from_node() {
        let node = BrowseMedia::new("ais_tunein/1/2/http://x", "Jazz FM")
            .with_thumbnail("http://img/jazz.png")
            .with_media_class("music");
        let media = ResolvedMedia::from_node(&node, "http://z/audio.mp3");

        assert_eq!(media.media_title.as_deref(), Some("Jazz FM"));
        assert_eq!(media.media_source.as_deref(), Some("Jazz FM"));
        assert_eq!(media.media_stream_image.as_deref(), Some("http://img/jazz.png"));
        assert_eq!(media.media_album_name.as_deref(), Some("music"));
        assert_eq!(media.media_content_id, "http://z/audio.mp3");
    }

    #[test]
    fn test_browse_media_deserialize_minimal() {
        let node: BrowseMedia =
            serde_json::from_value(json!({"media_content_id": "ais_podcast"})).unwrap();
        assert!(node.title.is_none());
        assert!(node.children.is_none());
    }
}
