pub mod bandcamp;
pub mod manager;
pub mod plugin;

pub use manager::SourceManager;
pub use plugin::{BoxedSource, BoxedTrack, PlayableTrack, SourcePlugin};
