//! Mutex-guarded facades for shared-buffer use.
//!
//! Every public operation holds the instance lock for the duration of the
//! call: at most one in-flight read or write per shared instance, with no
//! atomicity across calls. Two threads looping over [`SharedFrameReader`]
//! each receive distinct, correctly-framed values, but which logical record
//! either thread sees requires external coordination.

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::frame::{FrameReader, FrameWriter};
use crate::registry::CodecRegistry;
use crate::Result;

/// [`FrameWriter`] behind an exclusive per-call lock.
pub struct SharedFrameWriter {
    inner: Mutex<FrameWriter>,
}

impl SharedFrameWriter {
    pub fn new(registry: Arc<CodecRegistry>, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(FrameWriter::new(registry, capacity)),
        }
    }

    pub fn from_writer(writer: FrameWriter) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrameWriter> {
        // Poisoning only marks a panic in another holder; the cursor itself
        // is still structurally valid.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write_object<T: Any>(&self, value: &T) -> Result<()> {
        self.lock().write_object(value)
    }

    pub fn write_null<T: Any>(&self) -> Result<()> {
        self.lock().write_null::<T>()
    }

    pub fn write_string(&self, value: &str) -> Result<()> {
        self.lock().write_string(value)
    }

    pub fn write_i8(&self, value: i8) -> Result<()> {
        self.lock().write_i8(value)
    }

    pub fn write_i16(&self, value: i16) -> Result<()> {
        self.lock().write_i16(value)
    }

    pub fn write_i32(&self, value: i32) -> Result<()> {
        self.lock().write_i32(value)
    }

    pub fn write_i64(&self, value: i64) -> Result<()> {
        self.lock().write_i64(value)
    }

    pub fn write_f32(&self, value: f32) -> Result<()> {
        self.lock().write_f32(value)
    }

    pub fn write_f64(&self, value: f64) -> Result<()> {
        self.lock().write_f64(value)
    }

    pub fn write_bool(&self, value: bool) -> Result<()> {
        self.lock().write_bool(value)
    }

    pub fn write_char(&self, value: char) -> Result<()> {
        self.lock().write_char(value)
    }

    pub fn position(&self) -> usize {
        self.lock().position()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.lock().remaining_capacity()
    }

    /// Exactly the bytes written so far. Consumes the wrapper, so all
    /// sharing must have ended.
    pub fn finish(self) -> Vec<u8> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .finish()
    }
}

/// [`FrameReader`] behind an exclusive per-call lock.
pub struct SharedFrameReader {
    inner: Mutex<FrameReader>,
}

impl SharedFrameReader {
    pub fn new(registry: Arc<CodecRegistry>, bytes: Vec<u8>) -> Self {
        Self {
            inner: Mutex::new(FrameReader::new(registry, bytes)),
        }
    }

    pub fn from_reader(reader: FrameReader) -> Self {
        Self {
            inner: Mutex::new(reader),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrameReader> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read_object<T: Any>(&self) -> Result<Option<T>> {
        self.lock().read_object::<T>()
    }

    pub fn read_object_any(&self) -> Result<Option<Box<dyn Any + Send>>> {
        self.lock().read_object_any()
    }

    pub fn read_string(&self) -> Result<Option<String>> {
        self.lock().read_string()
    }

    pub fn skip_object(&self) -> Result<()> {
        self.lock().skip_object()
    }

    pub fn available(&self) -> usize {
        self.lock().available()
    }

    pub fn has_available(&self) -> bool {
        self.lock().has_available()
    }

    pub fn read_i8(&self) -> Result<i8> {
        self.lock().read_i8()
    }

    pub fn read_i16(&self) -> Result<i16> {
        self.lock().read_i16()
    }

    pub fn read_i32(&self) -> Result<i32> {
        self.lock().read_i32()
    }

    pub fn read_i64(&self) -> Result<i64> {
        self.lock().read_i64()
    }

    pub fn read_f32(&self) -> Result<f32> {
        self.lock().read_f32()
    }

    pub fn read_f64(&self) -> Result<f64> {
        self.lock().read_f64()
    }

    pub fn read_bool(&self) -> Result<bool> {
        self.lock().read_bool()
    }

    pub fn read_char(&self) -> Result<char> {
        self.lock().read_char()
    }

    pub fn skip_i8(&self) -> Result<()> {
        self.lock().skip_i8()
    }

    pub fn skip_i16(&self) -> Result<()> {
        self.lock().skip_i16()
    }

    pub fn skip_i32(&self) -> Result<()> {
        self.lock().skip_i32()
    }

    pub fn skip_i64(&self) -> Result<()> {
        self.lock().skip_i64()
    }

    pub fn skip_f32(&self) -> Result<()> {
        self.lock().skip_f32()
    }

    pub fn skip_f64(&self) -> Result<()> {
        self.lock().skip_f64()
    }

    pub fn skip_bool(&self) -> Result<()> {
        self.lock().skip_bool()
    }

    pub fn skip_char(&self) -> Result<()> {
        self.lock().skip_char()
    }
}
