use std::io::{self, Cursor, Read, Write};

use base64::prelude::*;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::protocol::tracks::TrackInfo;

/// Header flag: a version byte follows the header.
const TRACK_INFO_VERSIONED: u32 = 1;
/// Version written by [`MessageWriter`].
pub const TRACK_INFO_VERSION: u8 = 3;

const SIZE_MASK: u32 = 0x3FFF_FFFF;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("malformed track message: {0}")]
    Io(#[from] io::Error),
    #[error("invalid UTF-8 in string field: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("string field of {0} bytes does not fit in a track message")]
    StringTooLong(usize),
    #[error("track message of {0} bytes is too large")]
    MessageTooLarge(usize),
    #[error("unsupported track message version {0}")]
    UnsupportedVersion(u8),
    #[error("no source named '{0}' is registered")]
    UnknownSource(String),
    #[error("tracks from source '{0}' cannot be encoded")]
    NotEncodable(String),
}

/// Builds one base64 track message.
///
/// Layout (Lavaplayer-compatible, version 3):
///   [u32 header: (payload_size) | (flags << 30)]
///   [u8  version = 3]
///   [utf title] [utf author] [u64 length ms] [utf identifier] [u8 is_stream]
///   [opt_utf uri] [opt_utf artwork_url] [opt_utf isrc]
///   [utf source_name]
///   [source-specific bytes]
///   [u64 position ms]
///
/// Callers write the common fields with [`MessageWriter::write_track_info`],
/// then hand the writer to the source for its own section, then
/// [`MessageWriter::finish`].
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl Default for MessageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageWriter {
    pub fn new() -> Self {
        Self {
            buf: vec![TRACK_INFO_VERSION],
        }
    }

    pub fn write_track_info(&mut self, info: &TrackInfo) -> Result<(), CodecError> {
        write_utf(&mut self.buf, &info.title)?;
        write_utf(&mut self.buf, &info.author)?;
        self.buf.write_u64::<BigEndian>(info.length)?;
        write_utf(&mut self.buf, &info.identifier)?;
        self.buf.write_u8(u8::from(info.is_stream))?;
        write_opt_utf(&mut self.buf, info.uri.as_deref())?;
        write_opt_utf(&mut self.buf, info.artwork_url.as_deref())?;
        write_opt_utf(&mut self.buf, info.isrc.as_deref())?;
        write_utf(&mut self.buf, &info.source_name)
    }

    pub fn finish(mut self, position: u64) -> Result<String, CodecError> {
        self.buf.write_u64::<BigEndian>(position)?;

        let size = self.buf.len();
        if size as u64 > SIZE_MASK as u64 {
            return Err(CodecError::MessageTooLarge(size));
        }

        let header = size as u32 | (TRACK_INFO_VERSIONED << 30);
        let mut out = Vec::with_capacity(size + 4);
        out.write_u32::<BigEndian>(header)?;
        out.extend_from_slice(&self.buf);

        Ok(BASE64_STANDARD.encode(&out))
    }
}

impl Write for MessageWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads a message produced by [`MessageWriter`]. Versions 1 to 3 are
/// accepted.
pub struct MessageReader {
    cursor: Cursor<Vec<u8>>,
    version: u8,
}

impl MessageReader {
    pub fn new(encoded: &str) -> Result<Self, CodecError> {
        let data = BASE64_STANDARD.decode(encoded.trim())?;
        let mut cursor = Cursor::new(data);

        let header = cursor.read_u32::<BigEndian>()?;
        let flags = (header >> 30) & 0x03;

        // Unversioned messages predate the version byte.
        let version = if flags & TRACK_INFO_VERSIONED != 0 {
            cursor.read_u8()?
        } else {
            1
        };

        if version == 0 || version > TRACK_INFO_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        Ok(Self { cursor, version })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Reads the common fields. `position` is left at 0; it comes last in the
    /// message, see [`MessageReader::read_position`].
    pub fn read_track_info(&mut self) -> Result<TrackInfo, CodecError> {
        let title = read_utf(&mut self.cursor)?;
        let author = read_utf(&mut self.cursor)?;
        let length = self.cursor.read_u64::<BigEndian>()?;
        let identifier = read_utf(&mut self.cursor)?;
        let is_stream = self.cursor.read_u8()? != 0;

        let uri = if self.version >= 2 {
            read_opt_utf(&mut self.cursor)?
        } else {
            None
        };

        let (artwork_url, isrc) = if self.version >= 3 {
            (
                read_opt_utf(&mut self.cursor)?,
                read_opt_utf(&mut self.cursor)?,
            )
        } else {
            (None, None)
        };

        let source_name = read_utf(&mut self.cursor)?;

        Ok(TrackInfo {
            identifier,
            is_seekable: !is_stream,
            author,
            length,
            is_stream,
            position: 0,
            title,
            uri,
            artwork_url,
            isrc,
            source_name,
        })
    }

    /// Trailing position; a message without one starts at 0.
    pub fn read_position(&mut self) -> u64 {
        self.cursor.read_u64::<BigEndian>().unwrap_or(0)
    }
}

impl Read for MessageReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

fn write_utf<W: Write>(w: &mut W, s: &str) -> Result<(), CodecError> {
    let bytes = s.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| CodecError::StringTooLong(bytes.len()))?;
    w.write_u16::<BigEndian>(len)?;
    w.write_all(bytes)?;
    Ok(())
}

fn write_opt_utf<W: Write>(w: &mut W, s: Option<&str>) -> Result<(), CodecError> {
    match s {
        Some(s) => {
            w.write_u8(1)?;
            write_utf(w, s)
        }
        None => Ok(w.write_u8(0)?),
    }
}

fn read_utf<R: Read>(r: &mut R) -> Result<String, CodecError> {
    let len = r.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn read_opt_utf<R: Read>(r: &mut R) -> Result<Option<String>, CodecError> {
    if r.read_u8()? != 0 {
        read_utf(r).map(Some)
    } else {
        Ok(None)
    }
}
