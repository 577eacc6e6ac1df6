//! Frame encoding over a bounded buffer.

use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use super::{FRAME_HEADER_SIZE, NULL_LENGTH};
use crate::cursor::ByteCursor;
use crate::registry::CodecRegistry;
use crate::{CodecError, Result, MAX_PAYLOAD_SIZE};

/// Appends self-describing frames and raw primitives to a fixed-capacity
/// buffer, dispatching object writes through a [`CodecRegistry`].
///
/// Single-owner: a writer must not be shared across threads. Wrap it in
/// [`crate::SharedFrameWriter`] for shared-buffer use.
pub struct FrameWriter {
    registry: Arc<CodecRegistry>,
    cursor: ByteCursor,
}

impl FrameWriter {
    pub fn new(registry: Arc<CodecRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            cursor: ByteCursor::with_capacity(capacity),
        }
    }

    /// Encode one value as a complete frame.
    ///
    /// The codec runs against a fresh scratch buffer sized to the
    /// registration's scratch budget; the parent buffer is only touched once
    /// the payload is complete and known to fit, so a failure at any point
    /// leaves the parent byte-for-byte unchanged.
    ///
    /// Fails with [`CodecError::UnregisteredType`] when `T` has no codec,
    /// and with [`CodecError::SerializeFailed`] (the underlying cause
    /// attached) when the codec itself fails, including by exceeding its
    /// scratch budget.
    pub fn write_object<T: Any>(&mut self, value: &T) -> Result<()> {
        let entry = self.registry.entry_for::<T>()?;
        let mut scratch = FrameWriter::new(Arc::clone(&self.registry), entry.scratch_capacity());
        entry
            .serialize_erased(&mut scratch, value)
            .map_err(|source| CodecError::SerializeFailed {
                type_name: entry.type_name(),
                source: Box::new(source),
            })?;
        let payload = scratch.finish();
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(CodecError::PayloadTooLarge(payload.len()));
        }
        self.cursor.ensure_writable(FRAME_HEADER_SIZE + payload.len())?;
        trace!(
            signature = entry.signature(),
            payload_len = payload.len(),
            "writing frame"
        );
        self.cursor.write_u16(entry.signature())?;
        self.cursor.write_i32(payload.len() as i32)?;
        self.cursor.write_bytes(&payload)
    }

    /// Encode a null frame for `T`: its signature and a `-1` length with no
    /// payload, [`FRAME_HEADER_SIZE`] bytes in total.
    pub fn write_null<T: Any>(&mut self) -> Result<()> {
        let entry = self.registry.entry_for::<T>()?;
        self.cursor.ensure_writable(FRAME_HEADER_SIZE)?;
        trace!(signature = entry.signature(), "writing null frame");
        self.cursor.write_u16(entry.signature())?;
        self.cursor.write_i32(NULL_LENGTH)
    }

    /// Encode text as a frame through the default codec.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_object(&value.to_owned())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.cursor.write_i8(value)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.cursor.write_i16(value)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.cursor.write_i32(value)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.cursor.write_i64(value)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.cursor.write_f32(value)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.cursor.write_f64(value)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.cursor.write_bool(value)
    }

    pub fn write_char(&mut self, value: char) -> Result<()> {
        self.cursor.write_char(value)
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Total buffer capacity.
    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    /// Writable bytes left.
    pub fn remaining_capacity(&self) -> usize {
        self.cursor.remaining_capacity()
    }

    /// Exactly the bytes written so far, not the full backing capacity.
    pub fn finish(self) -> Vec<u8> {
        self.cursor.into_bytes()
    }
}
