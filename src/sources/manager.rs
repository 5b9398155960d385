use std::sync::Arc;

use super::{
    bandcamp::BandcampSource,
    plugin::{BoxedSource, BoxedTrack, PlayableTrack, SourcePlugin},
};
use crate::{
    common::{BuilderConfigurator, HttpClientPool, HttpConfigurable, RequestConfigurator},
    configs::Config,
    protocol::{CodecError, LoadResult, MessageReader, MessageWriter},
};

/// Source Manager
pub struct SourceManager {
    pub sources: Vec<BoxedSource>,
    pool: Arc<HttpClientPool>,
}

impl SourceManager {
    /// Create a new SourceManager with every enabled source. Sources share
    /// one HTTP pool built from the `[http]` section.
    pub fn new(config: &Config) -> Self {
        let pool = Arc::new(HttpClientPool::new(config.http.clone()));
        let mut sources: Vec<BoxedSource> = Vec::new();

        if config.sources.bandcamp {
            tracing::info!("Loaded source: Bandcamp");
            sources.push(Box::new(BandcampSource::new(pool.clone())));
        }

        Self { sources, pool }
    }

    /// The HTTP pool shared by all sources.
    pub fn http_pool(&self) -> &Arc<HttpClientPool> {
        &self.pool
    }

    /// Load tracks using the first source that recognises the identifier.
    pub async fn load(&self, identifier: &str) -> LoadResult {
        for source in &self.sources {
            if let Some(result) = source.load(identifier).await {
                tracing::trace!("Loaded '{}' with source: {}", identifier, source.name());
                return result;
            }
        }

        tracing::debug!("No source could handle identifier: {}", identifier);
        LoadResult::Empty {}
    }

    /// Serialises a track into a base64 track message.
    pub fn encode_track(&self, track: &dyn PlayableTrack) -> Result<String, CodecError> {
        let source = self.source(track.source_name())?;
        if !source.is_track_encodable(track) {
            return Err(CodecError::NotEncodable(source.name().to_string()));
        }

        let mut writer = MessageWriter::new();
        writer.write_track_info(track.info())?;
        source.encode_track(track, &mut writer)?;
        writer.finish(track.info().position)
    }

    /// Restores a track from a message written by [`SourceManager::encode_track`].
    /// No network access is involved.
    pub fn decode_track(&self, encoded: &str) -> Result<BoxedTrack, CodecError> {
        let mut reader = MessageReader::new(encoded)?;
        let info = reader.read_track_info()?;
        let source = self.source(&info.source_name)?;

        let mut track = source.decode_track(info, &mut reader)?;
        track.set_position(reader.read_position());
        Ok(track)
    }

    fn source(&self, name: &str) -> Result<&BoxedSource, CodecError> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| CodecError::UnknownSource(name.to_string()))
    }

    /// Get names of all registered sources
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn shutdown(&self) {
        for source in &self.sources {
            tracing::debug!("Shutting down source: {}", source.name());
            source.shutdown();
        }
    }
}

impl HttpConfigurable for SourceManager {
    fn configure_requests(&self, configurator: RequestConfigurator) {
        self.pool.configure_requests(configurator);
    }

    fn configure_builder(&self, configurator: BuilderConfigurator) {
        self.pool.configure_builder(configurator);
    }
}
