pub mod codec;
pub mod tracks;

pub use codec::{CodecError, MessageReader, MessageWriter};
pub use tracks::*;
