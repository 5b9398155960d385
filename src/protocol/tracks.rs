use serde::{Deserialize, Serialize};

use crate::{
    common::{FriendlyError, Severity},
    protocol::codec::{CodecError, MessageWriter},
};

/// A single audio track with encoded data and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Base64-encoded track message.
    pub encoded: String,
    /// Track metadata.
    pub info: TrackInfo,
    /// Plugin-specific info — free JSON object whose shape is defined by the plugin.
    #[serde(default = "default_json_object")]
    pub plugin_info: serde_json::Value,
    /// User-provided data attached to the track.
    #[serde(default = "default_json_object")]
    pub user_data: serde_json::Value,
}

fn default_json_object() -> serde_json::Value {
    serde_json::json!({})
}

impl Track {
    /// Wraps metadata from a source that keeps no state beyond the common
    /// fields, encoding it right away. Fails when a field does not fit in a
    /// track message.
    pub fn new(info: TrackInfo) -> Result<Self, CodecError> {
        let encoded = encode_common(&info)?;

        Ok(Self {
            encoded,
            info,
            plugin_info: default_json_object(),
            user_data: default_json_object(),
        })
    }
}

fn encode_common(info: &TrackInfo) -> Result<String, CodecError> {
    let mut writer = MessageWriter::new();
    writer.write_track_info(info)?;
    writer.finish(info.position)
}

/// Metadata for an audio track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub identifier: String,
    pub is_seekable: bool,
    pub author: String,
    /// Duration in milliseconds.
    pub length: u64,
    pub is_stream: bool,
    /// Current playback position in milliseconds.
    pub position: u64,
    pub title: String,
    pub uri: Option<String>,
    pub artwork_url: Option<String>,
    pub isrc: Option<String>,
    pub source_name: String,
}

/// Result of a track load operation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "loadType", content = "data", rename_all = "camelCase")]
pub enum LoadResult {
    /// A single track was loaded.
    Track(Track),
    /// A playlist was loaded.
    Playlist(PlaylistData),
    /// Nothing exists at the identifier.
    Empty {},
    /// An error occurred during loading.
    Error(LoadError),
}

impl From<FriendlyError> for LoadResult {
    fn from(err: FriendlyError) -> Self {
        Self::Error(err.into())
    }
}

/// Playlist data returned from a load operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistData {
    pub info: PlaylistInfo,
    pub plugin_info: serde_json::Value,
    pub tracks: Vec<Track>,
}

impl PlaylistData {
    /// A playlist in page order with no selected track.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            info: PlaylistInfo {
                name: name.into(),
                selected_track: -1,
            },
            plugin_info: default_json_object(),
            tracks,
        }
    }
}

/// Playlist metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub name: String,
    /// Index of the selected track, or -1 if none.
    pub selected_track: i32,
}

/// Error from a failed track load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadError {
    /// Human-readable error message.
    pub message: Option<String>,
    /// How severe the error is.
    pub severity: Severity,
    /// Short cause description.
    pub cause: String,
}

impl From<FriendlyError> for LoadError {
    fn from(err: FriendlyError) -> Self {
        Self {
            cause: err.cause_description(),
            message: Some(err.message),
            severity: err.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::MessageReader;

    fn sample_info() -> TrackInfo {
        TrackInfo {
            identifier: "https://artist.bandcamp.com/track/first-light".to_string(),
            is_seekable: false,
            author: "Sample Artist".to_string(),
            length: 241_500,
            is_stream: true,
            position: 0,
            title: "First Light".to_string(),
            uri: Some("https://artist.bandcamp.com/track/first-light".to_string()),
            artwork_url: None,
            isrc: None,
            source_name: "bandcamp".to_string(),
        }
    }

    #[test]
    fn new_track_is_encoded() {
        let track = Track::new(sample_info()).unwrap();
        let mut reader = MessageReader::new(&track.encoded).unwrap();
        assert_eq!(reader.read_track_info().unwrap(), track.info);
        assert_eq!(reader.read_position(), 0);
        assert_eq!(track.plugin_info, serde_json::json!({}));
        assert_eq!(track.user_data, serde_json::json!({}));
    }

    #[test]
    fn load_result_serializes_with_load_type() {
        let json = serde_json::to_value(LoadResult::Track(Track::new(sample_info()).unwrap())).unwrap();
        assert_eq!(json["loadType"], "track");
        assert_eq!(json["data"]["info"]["isStream"], true);
        assert_eq!(json["data"]["info"]["sourceName"], "bandcamp");

        let empty = serde_json::to_value(LoadResult::Empty {}).unwrap();
        assert_eq!(empty["loadType"], "empty");

        let playlist = serde_json::to_value(LoadResult::Playlist(PlaylistData::new(
            "Album1",
            Vec::new(),
        )))
        .unwrap();
        assert_eq!(playlist["loadType"], "playlist");
        assert_eq!(playlist["data"]["info"]["name"], "Album1");
        assert_eq!(playlist["data"]["info"]["selectedTrack"], -1);
    }

    #[test]
    fn oversized_field_is_not_encoded() {
        let info = TrackInfo {
            title: "x".repeat(70_000),
            ..sample_info()
        };

        assert!(matches!(
            Track::new(info),
            Err(CodecError::StringTooLong(70_000))
        ));
    }

    #[test]
    fn friendly_error_becomes_load_error() {
        let err = FriendlyError::with_cause(
            "Loading information for a Bandcamp track failed.",
            Severity::Fault,
            "connection reset",
        );
        let LoadResult::Error(load_error) = LoadResult::from(err) else {
            panic!("expected an error result");
        };

        assert_eq!(
            load_error.message.as_deref(),
            Some("Loading information for a Bandcamp track failed.")
        );
        assert_eq!(load_error.severity, Severity::Fault);
        assert_eq!(load_error.cause, "connection reset");
    }
}
