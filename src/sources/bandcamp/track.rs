use std::sync::Arc;

use crate::{
    common::{HttpClientPool, HttpError, HttpHandle},
    protocol::TrackInfo,
    sources::plugin::PlayableTrack,
};

/// A Bandcamp track as handed to a player. Holds only the common metadata;
/// the playback page is `info.uri`.
pub struct BandcampTrack {
    info: TrackInfo,
    pool: Arc<HttpClientPool>,
}

impl BandcampTrack {
    pub fn new(info: TrackInfo, pool: Arc<HttpClientPool>) -> Self {
        Self { info, pool }
    }

    pub fn playback_url(&self) -> Option<&str> {
        self.info.uri.as_deref()
    }

    /// HTTP handle from the source's pool for fetching the stream.
    pub fn http_handle(&self) -> Result<HttpHandle, HttpError> {
        self.pool.acquire()
    }
}

impl PlayableTrack for BandcampTrack {
    fn info(&self) -> &TrackInfo {
        &self.info
    }

    fn set_position(&mut self, position: u64) {
        self.info.position = position;
    }
}
