//! Frame decoding with registry dispatch.

use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use super::NULL_LENGTH;
use crate::cursor::ByteCursor;
use crate::registry::{CodecEntry, CodecRegistry};
use crate::{CodecError, Result};

/// Consumes self-describing frames and raw primitives from a byte buffer,
/// dispatching object reads through a [`CodecRegistry`].
///
/// Single-owner: a reader must not be shared across threads. Wrap it in
/// [`crate::SharedFrameReader`] for shared-buffer use.
pub struct FrameReader {
    registry: Arc<CodecRegistry>,
    cursor: ByteCursor,
}

impl FrameReader {
    pub fn new(registry: Arc<CodecRegistry>, bytes: Vec<u8>) -> Self {
        Self {
            registry,
            cursor: ByteCursor::from_bytes(bytes),
        }
    }

    /// Decode the next frame as a `T`. A `-1` length decodes as `None`.
    ///
    /// The frame's signature is validated against the registration for `T`;
    /// a disagreement fails with [`CodecError::SignatureMismatch`] rather
    /// than being skipped. The codec then runs against a sub-reader scoped
    /// to exactly this frame's payload, and its failures surface as
    /// [`CodecError::DeserializeFailed`] with the cause attached.
    pub fn read_object<T: Any>(&mut self) -> Result<Option<T>> {
        let entry = self.registry.entry_for::<T>()?;
        let signature = self.cursor.read_u16()?;
        if signature != entry.signature() {
            return Err(CodecError::SignatureMismatch {
                expected: entry.signature(),
                actual: signature,
                type_name: entry.type_name(),
            });
        }
        let value = self.read_frame_payload(&entry)?;
        Ok(value.map(|boxed| {
            *boxed
                .downcast::<T>()
                .expect("registry dispatched a value of the wrong type")
        }))
    }

    /// Decode the next frame by its signature alone; the caller downcasts.
    ///
    /// Fails with [`CodecError::UnknownSignature`] when the signature has no
    /// bound codec, as with a buffer from a different registry.
    pub fn read_object_any(&mut self) -> Result<Option<Box<dyn Any + Send>>> {
        let signature = self.cursor.read_u16()?;
        let entry = self.registry.lookup_by_signature(signature)?;
        self.read_frame_payload(&entry)
    }

    /// Decode the next frame through the default text codec.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        self.read_object::<String>()
    }

    /// Consume the next frame without materializing a value. Consumes the
    /// same byte span a `read_object` call would.
    pub fn skip_object(&mut self) -> Result<()> {
        let signature = self.cursor.read_u16()?;
        let length = self.cursor.read_i32()?;
        trace!(signature, length, "skipping frame");
        if length == NULL_LENGTH {
            return Ok(());
        }
        if length < 0 {
            return Err(CodecError::InvalidFrameLength(length));
        }
        self.cursor.skip(length as usize)
    }

    fn read_frame_payload(
        &mut self,
        entry: &Arc<CodecEntry>,
    ) -> Result<Option<Box<dyn Any + Send>>> {
        let length = self.cursor.read_i32()?;
        if length == NULL_LENGTH {
            return Ok(None);
        }
        if length < 0 {
            return Err(CodecError::InvalidFrameLength(length));
        }
        trace!(signature = entry.signature(), length, "reading frame");
        let payload = self.cursor.read_bytes(length as usize)?;
        let mut scoped = FrameReader::new(Arc::clone(&self.registry), payload);
        entry
            .deserialize_erased(&mut scoped)
            .map(Some)
            .map_err(|source| CodecError::DeserializeFailed {
                type_name: entry.type_name(),
                source: Box::new(source),
            })
    }

    /// Remaining unread bytes.
    pub fn available(&self) -> usize {
        self.cursor.available()
    }

    /// `true` while at least one unread byte remains.
    pub fn has_available(&self) -> bool {
        self.cursor.has_available()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.cursor.read_i8()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.cursor.read_i16()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor.read_i32()
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.cursor.read_i64()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.cursor.read_f32()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.cursor.read_f64()
    }

    /// Any value `>= 1` decodes as true.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.cursor.read_bool()
    }

    pub fn read_char(&mut self) -> Result<char> {
        self.cursor.read_char()
    }

    pub fn skip_i8(&mut self) -> Result<()> {
        self.cursor.skip(1)
    }

    pub fn skip_i16(&mut self) -> Result<()> {
        self.cursor.skip(2)
    }

    pub fn skip_i32(&mut self) -> Result<()> {
        self.cursor.skip(4)
    }

    pub fn skip_i64(&mut self) -> Result<()> {
        self.cursor.skip(8)
    }

    pub fn skip_f32(&mut self) -> Result<()> {
        self.cursor.skip(4)
    }

    pub fn skip_f64(&mut self) -> Result<()> {
        self.cursor.skip(8)
    }

    pub fn skip_bool(&mut self) -> Result<()> {
        self.cursor.skip(1)
    }

    pub fn skip_char(&mut self) -> Result<()> {
        self.cursor.skip(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameWriter;
    use crate::ObjectCodec;

    fn registry() -> Arc<CodecRegistry> {
        CodecRegistry::builder().build()
    }

    #[test]
    fn test_reads_code_point_frame() {
        let bytes = vec![
            0x00, 0x10, // signature
            0x00, 0x00, 0x00, 0x0C, // payload length: 12
            0x00, 0x00, 0x00, 0x02, // code-point count: 2
            0x00, 0x00, 0x00, 0x68, // 'h'
            0x00, 0x00, 0x00, 0x69, // 'i'
        ];
        let mut reader = registry().reader(bytes);
        assert_eq!(reader.read_string().unwrap(), Some("hi".to_owned()));
        assert!(!reader.has_available());
    }

    #[test]
    fn test_null_frame_reads_none() {
        let mut reader = registry().reader(vec![0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(reader.read_string().unwrap(), None);
        assert_eq!(reader.available(), 0);
    }

    #[test]
    fn test_unknown_signature() {
        let mut reader = registry().reader(vec![0xBE, 0xEF, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            reader.read_object_any(),
            Err(CodecError::UnknownSignature(0xBEEF))
        ));
    }

    struct Marker;

    struct MarkerCodec;

    impl ObjectCodec<Marker> for MarkerCodec {
        fn serialize(&self, _writer: &mut FrameWriter, _value: &Marker) -> Result<()> {
            Ok(())
        }

        fn deserialize(&self, _reader: &mut FrameReader) -> Result<Marker> {
            Ok(Marker)
        }
    }

    #[test]
    fn test_signature_mismatch_on_typed_read() {
        let registry = CodecRegistry::builder()
            .register(0xAA, 16, MarkerCodec)
            .unwrap()
            .build();
        let mut writer = registry.writer(64);
        writer.write_string("hi").unwrap();

        // The next frame is a string; reading it as Marker must fail loudly.
        let mut reader = registry.reader(writer.finish());
        assert!(matches!(
            reader.read_object::<Marker>(),
            Err(CodecError::SignatureMismatch {
                expected: 0xAA,
                actual: 0x10,
                ..
            })
        ));
    }

    #[test]
    fn test_negative_length_other_than_null_rejected() {
        // Length -2 is not a valid null marker.
        let mut reader = registry().reader(vec![0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFE]);
        assert!(matches!(
            reader.read_string(),
            Err(CodecError::InvalidFrameLength(-2))
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut reader = registry().reader(vec![0x00]);
        assert!(matches!(
            reader.read_object_any(),
            Err(CodecError::EndOfBuffer { requested: 2, .. })
        ));
    }

    #[test]
    fn test_codec_cannot_read_past_payload() {
        #[derive(Debug)]
        struct Greedy;

        struct GreedyCodec;

        impl ObjectCodec<Greedy> for GreedyCodec {
            fn serialize(&self, writer: &mut FrameWriter, _value: &Greedy) -> Result<()> {
                writer.write_i32(0)
            }

            fn deserialize(&self, reader: &mut FrameReader) -> Result<Greedy> {
                // Asks for more than the 4-byte payload holds.
                reader.read_i64()?;
                Ok(Greedy)
            }
        }

        let registry = CodecRegistry::builder()
            .register(0xAA, 16, GreedyCodec)
            .unwrap()
            .build();
        let mut writer = registry.writer(64);
        writer.write_object(&Greedy).unwrap();
        // More bytes follow the frame, but the payload boundary still holds.
        writer.write_i64(-1).unwrap();

        let mut reader = registry.reader(writer.finish());
        let err = reader.read_object::<Greedy>().unwrap_err();
        match err {
            CodecError::DeserializeFailed { source, .. } => {
                assert!(matches!(
                    *source,
                    CodecError::EndOfBuffer {
                        requested: 8,
                        used: 0,
                        capacity: 4,
                    }
                ));
            }
            other => panic!("expected DeserializeFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_object_spans_null_and_value_frames() {
        let registry = registry();
        let mut writer = registry.writer(128);
        writer.write_string("abc").unwrap();
        writer.write_null::<String>().unwrap();
        writer.write_string("d").unwrap();

        let mut reader = registry.reader(writer.finish());
        reader.skip_object().unwrap();
        reader.skip_object().unwrap();
        assert_eq!(reader.read_string().unwrap(), Some("d".to_owned()));
        assert!(!reader.has_available());
    }
}
