use serde_json::Value;

use super::{
    BandcampError, PayloadKind, SOURCE_NAME, artwork::artwork_url, payload::PayloadExt,
};
use crate::protocol::TrackInfo;

/// Tracks of an album page in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumInfo {
    pub title: String,
    pub tracks: Vec<TrackInfo>,
}

/// First entry of a track page. A missing artist is tolerated.
pub fn map_track(payload: &Value, root_url: &str) -> Result<TrackInfo, BandcampError> {
    let artist = payload
        .text("artist")
        .map(|a| a.into_owned())
        .unwrap_or_default();
    let artwork = artwork_url(payload.text("art_id").as_deref());

    let entry = payload
        .array("trackinfo")
        .and_then(|entries| entries.first())
        .ok_or(BandcampError::MissingPayload(PayloadKind::Track))?;

    map_entry(entry, root_url, &artist, artwork.as_deref())
}

/// Every entry of an album page. Unlike a track page, the artist must be
/// present. A missing album title leaves the playlist unnamed.
pub fn map_album(payload: &Value, root_url: &str) -> Result<AlbumInfo, BandcampError> {
    let artist = payload
        .text("artist")
        .ok_or(BandcampError::MissingField("artist"))?;
    let artwork = artwork_url(payload.text("art_id").as_deref());

    let tracks = payload
        .array("trackinfo")
        .unwrap_or_default()
        .iter()
        .map(|entry| map_entry(entry, root_url, &artist, artwork.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let title = payload
        .get("current")
        .and_then(|current| current.text("title"))
        .map(|title| title.into_owned())
        .unwrap_or_default();

    Ok(AlbumInfo { title, tracks })
}

fn map_entry(
    entry: &Value,
    root_url: &str,
    artist: &str,
    artwork: Option<&str>,
) -> Result<TrackInfo, BandcampError> {
    let title = entry
        .text("title")
        .ok_or(BandcampError::MissingField("title"))?;
    let title_link = entry
        .text("title_link")
        .ok_or(BandcampError::MissingField("title_link"))?;

    // Fractional seconds, truncated to whole milliseconds.
    let length = entry
        .number("duration")
        .map(|seconds| (seconds * 1000.0) as u64)
        .unwrap_or(0);

    let page_url = format!("{}{}", root_url, title_link);

    // The page doubles as the playback source; it is always streamed even
    // though the length is known.
    Ok(TrackInfo {
        identifier: page_url.clone(),
        is_seekable: false,
        author: artist.to_string(),
        length,
        is_stream: true,
        position: 0,
        title: title.into_owned(),
        uri: Some(page_url),
        artwork_url: artwork.map(str::to_string),
        isrc: None,
        source_name: SOURCE_NAME.to_string(),
    })
}
