use std::io::{Read, Write};

use async_trait::async_trait;

use crate::{
    common::HttpConfigurable,
    protocol::{CodecError, LoadResult, Track, TrackInfo},
};

pub type BoxedSource = Box<dyn SourcePlugin>;
pub type BoxedTrack = Box<dyn PlayableTrack>;

/// Trait that all source plugins must implement.
///
/// A source recognises its own identifiers, turns them into tracks or
/// playlists, and knows how to persist and restore the tracks it produced.
#[async_trait]
pub trait SourcePlugin: HttpConfigurable + Send + Sync {
    /// Unique identifier for this source, also stored in every track message.
    fn name(&self) -> &str;

    /// Resolve the identifier into track(s).
    ///
    /// Returns `None` when the identifier is not something this source
    /// handles, so the caller can try the next source. Failures and absence
    /// are reported inside the `LoadResult`.
    async fn load(&self, identifier: &str) -> Option<LoadResult>;

    fn is_track_encodable(&self, _track: &dyn PlayableTrack) -> bool {
        true
    }

    /// Writes the source-specific section of a track message.
    fn encode_track(
        &self,
        track: &dyn PlayableTrack,
        output: &mut dyn Write,
    ) -> Result<(), CodecError>;

    /// Rebuilds a track from the common fields plus the source-specific
    /// section written by [`SourcePlugin::encode_track`].
    fn decode_track(
        &self,
        info: TrackInfo,
        input: &mut dyn Read,
    ) -> Result<BoxedTrack, CodecError>;

    /// Releases held resources. Safe to call more than once.
    fn shutdown(&self);
}

/// A resolved track that a player can pick up later.
pub trait PlayableTrack: Send + Sync {
    fn info(&self) -> &TrackInfo;

    fn set_position(&mut self, position: u64);

    fn source_name(&self) -> &str {
        &self.info().source_name
    }

    /// Wire representation of the track.
    fn to_track(&self) -> Result<Track, CodecError> {
        Track::new(self.info().clone())
    }
}
