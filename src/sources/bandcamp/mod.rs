use std::{
    fmt,
    io::{Read, Write},
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    common::{
        BuilderConfigurator, FriendlyError, HttpClientPool, HttpConfigurable, HttpError,
        PageResponse, RequestConfigurator, Severity,
    },
    protocol::{CodecError, LoadResult, PlaylistData, Track, TrackInfo},
    sources::plugin::{BoxedTrack, PlayableTrack, SourcePlugin},
};

pub mod artwork;
pub mod mapper;
pub mod payload;
pub mod track;
pub mod url;

pub use track::BandcampTrack;
pub use url::{BandcampUrl, classify};

pub const SOURCE_NAME: &str = "bandcamp";

const LOAD_FAILED_MESSAGE: &str = "Loading information for a Bandcamp track failed.";

/// Which kind of page the embedded data was expected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Track,
    Album,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Track => f.write_str("Track"),
            Self::Album => f.write_str("Album"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BandcampError {
    #[error("Band information not found on the Bandcamp page.")]
    BandInfoNotFound,
    #[error("{0} information not found on the Bandcamp page.")]
    MissingPayload(PayloadKind),
    #[error("page data has no '{0}' field")]
    MissingField(&'static str),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("page data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl BandcampError {
    /// Missing data on a fetched page means the site changed or removed the
    /// content; everything else is a fault.
    pub fn severity(&self) -> Severity {
        match self {
            Self::BandInfoNotFound | Self::MissingPayload(_) => Severity::Suspicious,
            _ => Severity::Fault,
        }
    }
}

impl From<BandcampError> for FriendlyError {
    fn from(err: BandcampError) -> Self {
        match err.severity() {
            Severity::Fault => FriendlyError::with_cause(LOAD_FAILED_MESSAGE, Severity::Fault, err),
            severity => FriendlyError::new(err.to_string(), severity),
        }
    }
}

/// Resolves `*.bandcamp.com/track/...` and `*.bandcamp.com/album/...` pages.
pub struct BandcampSource {
    pool: Arc<HttpClientPool>,
}

impl BandcampSource {
    pub fn new(pool: Arc<HttpClientPool>) -> Self {
        Self { pool }
    }

    pub fn http_pool(&self) -> &Arc<HttpClientPool> {
        &self.pool
    }

    async fn resolve(&self, identifier: &str) -> Option<LoadResult> {
        let result = match classify(identifier) {
            Ok(BandcampUrl::Unrecognized) => return None,
            Ok(BandcampUrl::Track { root_url, .. }) => {
                self.load_track(identifier, &root_url).await
            }
            Ok(BandcampUrl::Album { root_url, .. }) => {
                self.load_album(identifier, &root_url).await
            }
            Err(e) => Err(e),
        };

        Some(match result {
            Ok(result) => result,
            Err(e) => {
                warn!("Failed to load Bandcamp item {}: {}", identifier, e);
                FriendlyError::from(e).into()
            }
        })
    }

    async fn load_track(&self, url: &str, root_url: &str) -> Result<LoadResult, BandcampError> {
        let Some(page) = self.fetch_page(url).await? else {
            return Ok(LoadResult::Empty {});
        };

        let payload = payload::read_tralbum(&page, PayloadKind::Track)?;
        let info = mapper::map_track(&payload, root_url)?;
        debug!("Resolved Bandcamp track '{}' by '{}'", info.title, info.author);

        Ok(LoadResult::Track(Track::new(info)?))
    }

    async fn load_album(&self, url: &str, root_url: &str) -> Result<LoadResult, BandcampError> {
        let Some(page) = self.fetch_page(url).await? else {
            return Ok(LoadResult::Empty {});
        };

        let payload = payload::read_tralbum(&page, PayloadKind::Album)?;
        let album = mapper::map_album(&payload, root_url)?;
        debug!(
            "Resolved Bandcamp album '{}' with {} tracks",
            album.title,
            album.tracks.len()
        );

        let tracks = album
            .tracks
            .into_iter()
            .map(Track::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LoadResult::Playlist(PlaylistData::new(album.title, tracks)))
    }

    /// Page text, or `None` for a 404.
    async fn fetch_page(&self, url: &str) -> Result<Option<String>, BandcampError> {
        let handle = self.pool.acquire()?;
        match handle.fetch_page(url).await? {
            PageResponse::Page(text) => Ok(Some(text)),
            PageResponse::NotFound => Ok(None),
        }
    }
}

#[async_trait]
impl SourcePlugin for BandcampSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn load(&self, identifier: &str) -> Option<LoadResult> {
        self.resolve(identifier).await
    }

    fn encode_track(
        &self,
        _track: &dyn PlayableTrack,
        _output: &mut dyn Write,
    ) -> Result<(), CodecError> {
        // No state beyond the common fields.
        Ok(())
    }

    fn decode_track(
        &self,
        info: TrackInfo,
        _input: &mut dyn Read,
    ) -> Result<BoxedTrack, CodecError> {
        Ok(Box::new(BandcampTrack::new(info, self.pool.clone())))
    }

    fn shutdown(&self) {
        self.pool.close();
    }
}

impl HttpConfigurable for BandcampSource {
    fn configure_requests(&self, configurator: RequestConfigurator) {
        self.pool.configure_requests(configurator);
    }

    fn configure_builder(&self, configurator: BuilderConfigurator) {
        self.pool.configure_builder(configurator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::HttpConfig;

    fn source() -> BandcampSource {
        BandcampSource::new(Arc::new(HttpClientPool::new(HttpConfig::default())))
    }

    #[tokio::test]
    async fn foreign_identifiers_are_not_applicable() {
        let source = source();
        // A closed pool would turn any fetch attempt into an error result.
        source.shutdown();

        for identifier in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://x.bandcamp.com/",
            "bcsearch:anything",
        ] {
            assert!(source.load(identifier).await.is_none(), "{identifier}");
        }
    }

    #[tokio::test]
    async fn closed_pool_is_a_fault() {
        let source = source();
        source.shutdown();
        source.shutdown();

        let Some(LoadResult::Error(err)) = source.load("https://x.bandcamp.com/track/t").await
        else {
            panic!("expected an error result");
        };
        assert_eq!(err.severity, Severity::Fault);
        assert_eq!(err.message.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(err.cause, "HTTP client pool is closed");
    }

    #[test]
    fn suspicious_errors_keep_their_message() {
        let friendly = FriendlyError::from(BandcampError::MissingPayload(PayloadKind::Album));
        assert_eq!(friendly.severity, Severity::Suspicious);
        assert_eq!(
            friendly.message,
            "Album information not found on the Bandcamp page."
        );

        let friendly = FriendlyError::from(BandcampError::BandInfoNotFound);
        assert_eq!(friendly.severity, Severity::Suspicious);
        assert_eq!(
            friendly.message,
            "Band information not found on the Bandcamp page."
        );
    }

    #[test]
    fn structural_errors_are_faults() {
        let friendly = FriendlyError::from(BandcampError::MissingField("artist"));
        assert_eq!(friendly.severity, Severity::Fault);
        assert_eq!(friendly.message, LOAD_FAILED_MESSAGE);
        assert_eq!(friendly.cause_description(), "page data has no 'artist' field");
    }

    #[test]
    fn unencodable_tracks_are_faults() {
        let err = BandcampError::from(CodecError::StringTooLong(70_000));
        assert_eq!(err.severity(), Severity::Fault);

        let friendly = FriendlyError::from(err);
        assert_eq!(friendly.message, LOAD_FAILED_MESSAGE);
        assert!(friendly.cause_description().contains("70000"));
    }

    #[test]
    fn decoded_tracks_share_the_source_pool() {
        let source = source();
        let info = TrackInfo {
            identifier: "https://x.bandcamp.com/track/t".to_string(),
            uri: Some("https://x.bandcamp.com/track/t".to_string()),
            is_stream: true,
            source_name: SOURCE_NAME.to_string(),
            ..Default::default()
        };

        let mut empty: &[u8] = &[];
        let track = source.decode_track(info.clone(), &mut empty).unwrap();
        assert_eq!(track.info(), &info);
        assert_eq!(track.source_name(), SOURCE_NAME);

        let bandcamp = BandcampTrack::new(info, source.http_pool().clone());
        assert_eq!(bandcamp.playback_url(), Some("https://x.bandcamp.com/track/t"));
        assert!(bandcamp.http_handle().is_ok());

        source.shutdown();
        assert!(matches!(bandcamp.http_handle(), Err(HttpError::Closed)));
    }
}
