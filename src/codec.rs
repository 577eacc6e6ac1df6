//! Per-type codec contract and the default text codec.

use crate::frame::{FrameReader, FrameWriter};
use crate::{CodecError, Result};

/// Paired serialize/deserialize implementation for one type.
///
/// `serialize` may call back into the writer, including
/// [`FrameWriter::write_object`] for nested values, composing a tree of
/// frames. `deserialize` receives a reader scoped strictly to this frame's
/// payload: it must consume exactly the structure that was written, and any
/// attempt to read past the payload boundary fails with
/// [`CodecError::EndOfBuffer`] before it can touch neighboring frames.
pub trait ObjectCodec<T>: Send + Sync + 'static {
    fn serialize(&self, writer: &mut FrameWriter, value: &T) -> Result<()>;

    fn deserialize(&self, reader: &mut FrameReader) -> Result<T>;
}

/// The default text codec, bound to [`crate::STRING_SIGNATURE`] in every
/// registry so the framing format round-trips without user registration.
///
/// Canonical encoding: a code-point count followed by one 4-byte code point
/// per character. `"hi"` therefore occupies 12 payload bytes:
/// `[0,0,0,2, 0,0,0,'h', 0,0,0,'i']`.
pub struct StringCodec;

impl ObjectCodec<String> for StringCodec {
    fn serialize(&self, writer: &mut FrameWriter, value: &String) -> Result<()> {
        writer.write_i32(value.chars().count() as i32)?;
        for ch in value.chars() {
            writer.write_char(ch)?;
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut FrameReader) -> Result<String> {
        let count = reader.read_i32()?;
        if count < 0 {
            return Err(CodecError::InvalidElementCount(count));
        }
        let mut value = String::new();
        for _ in 0..count {
            value.push(reader.read_char()?);
        }
        Ok(value)
    }
}
