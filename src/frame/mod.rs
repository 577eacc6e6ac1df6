//! Self-describing object frames.
//!
//! Every value written through a codec becomes one frame:
//!
//! ```text
//! ┌────────────────────┬──────────────────────┬──────────────────────┐
//! │ Signature (2 bytes)│ Length (4 bytes, i32)│ Payload (Length bytes)│
//! └────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! Signature and length are big-endian. A length of [`NULL_LENGTH`] encodes
//! a logical null with no payload; other negative lengths are invalid. A
//! payload may itself contain zero or more complete frames, so object trees
//! nest without any outer bookkeeping.

pub mod reader;
pub mod writer;

pub use reader::FrameReader;
pub use writer::FrameWriter;

/// Signature (2 bytes) plus length (4 bytes).
pub const FRAME_HEADER_SIZE: usize = 6;

/// Length value that encodes a logical null.
pub const NULL_LENGTH: i32 = -1;
