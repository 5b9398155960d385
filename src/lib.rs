//! Resolves Bandcamp track and album pages into playable track metadata.
//!
//! The page is fetched once, the JSON embedded in its `data-tralbum`
//! attribute is parsed, and the entries are mapped into [`protocol::Track`]s.
//! Audio itself is never downloaded here.

pub mod common;
pub mod configs;
pub mod protocol;
pub mod sources;
