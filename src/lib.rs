//! Signature-framed binary object serialization.
//!
//! Application types are bound to fixed 16-bit signatures through a codec
//! registry, and values are encoded as self-describing, length-prefixed
//! frames in a fixed-capacity byte buffer. Frames nest, so whole object
//! trees serialize without external schema files.
//!
//! ```text
//! ┌────────────────────┬──────────────────────┬──────────────────────┐
//! │ Signature (2 bytes)│ Length (4 bytes, i32)│ Payload (Length bytes)│
//! └────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! All multi-byte fields are big-endian. A payload length of `-1` encodes a
//! logical null and is followed by no payload bytes.
//!
//! Codecs are registered once, during initialization, through
//! [`RegistryBuilder`]; the frozen [`CodecRegistry`] handle then dispatches
//! every [`FrameWriter::write_object`] and [`FrameReader::read_object`] call
//! to the matching codec by type or by signature.

use thiserror::Error;

pub mod codec;
pub mod cursor;
pub mod frame;
pub mod registry;
pub mod sync;

pub use codec::*;
pub use cursor::*;
pub use frame::*;
pub use registry::*;
pub use sync::*;

/// Signature of the default text codec, present in every registry.
pub const STRING_SIGNATURE: u16 = 0x10;

/// Scratch budget used when a registration does not supply its own.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 1024;

/// Largest payload representable in the signed 32-bit length field.
pub const MAX_PAYLOAD_SIZE: usize = i32::MAX as usize;

/// Serialization errors.
///
/// Every variant aborts the current encode or decode call; nothing is
/// retried internally and no partial value is ever returned.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("end of buffer: requested {requested} bytes with {used} of {capacity} used")]
    EndOfBuffer {
        requested: usize,
        used: usize,
        capacity: usize,
    },

    #[error("no codec registered for type {0}")]
    UnregisteredType(&'static str),

    #[error("unknown signature {0:#06x}")]
    UnknownSignature(u16),

    #[error("signature {signature:#06x} already bound to {existing}")]
    DuplicateSignature { signature: u16, existing: &'static str },

    #[error("type {0} already has a registered codec")]
    DuplicateType(&'static str),

    #[error("signature mismatch: expected {expected:#06x} for {type_name}, found {actual:#06x}")]
    SignatureMismatch {
        expected: u16,
        actual: u16,
        type_name: &'static str,
    },

    #[error("failed to serialize {type_name}")]
    SerializeFailed {
        type_name: &'static str,
        #[source]
        source: Box<CodecError>,
    },

    #[error("failed to deserialize {type_name}")]
    DeserializeFailed {
        type_name: &'static str,
        #[source]
        source: Box<CodecError>,
    },

    #[error("invalid frame length {0}")]
    InvalidFrameLength(i32),

    #[error("frame payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("invalid code point {0:#x}")]
    InvalidCodePoint(u32),

    #[error("invalid element count {0}")]
    InvalidElementCount(i32),

    #[error("{0}")]
    Custom(String),
}

impl CodecError {
    /// A codec-defined failure, surfaced through `SerializeFailed` or
    /// `DeserializeFailed` with the offending type attached.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, CodecError>;
