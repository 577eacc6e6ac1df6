//! Codec registry: signature/type bindings and erased dispatch.
//!
//! Registration happens once, during initialization, through
//! [`RegistryBuilder`]; [`RegistryBuilder::build`] freezes the bindings into
//! an [`Arc<CodecRegistry>`] handle that writers and readers share. There is
//! no post-build mutation path, so lookups need no locking.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::codec::{ObjectCodec, StringCodec};
use crate::frame::{FrameReader, FrameWriter};
use crate::{CodecError, Result, DEFAULT_SCRATCH_CAPACITY, STRING_SIGNATURE};

type SerializeFn = dyn Fn(&mut FrameWriter, &dyn std::any::Any) -> Result<()> + Send + Sync;
type DeserializeFn = dyn Fn(&mut FrameReader) -> Result<Box<dyn std::any::Any + Send>> + Send + Sync;

/// One registered type: identity, wire signature, scratch budget and the
/// erased codec entry points. Immutable after registration; shared between
/// the by-type and by-signature indexes.
pub struct CodecEntry {
    type_id: TypeId,
    type_name: &'static str,
    signature: u16,
    scratch_capacity: usize,
    serialize: Box<SerializeFn>,
    deserialize: Box<DeserializeFn>,
}

impl CodecEntry {
    /// Wire signature this type encodes under.
    pub fn signature(&self) -> u16 {
        self.signature
    }

    /// Name of the bound Rust type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Upper bound, in bytes, for one serialized instance's payload.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch_capacity
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn serialize_erased(
        &self,
        writer: &mut FrameWriter,
        value: &dyn std::any::Any,
    ) -> Result<()> {
        (self.serialize)(writer, value)
    }

    pub(crate) fn deserialize_erased(
        &self,
        reader: &mut FrameReader,
    ) -> Result<Box<dyn std::any::Any + Send>> {
        (self.deserialize)(reader)
    }
}

impl fmt::Debug for CodecEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecEntry")
            .field("type_name", &self.type_name)
            .field("signature", &self.signature)
            .field("scratch_capacity", &self.scratch_capacity)
            .finish()
    }
}

/// Accumulates codec registrations before the registry is frozen.
///
/// Starts with [`StringCodec`] bound to [`STRING_SIGNATURE`] so the framing
/// format is self-validating without any user registration.
pub struct RegistryBuilder {
    by_type: HashMap<TypeId, Arc<CodecEntry>>,
    by_signature: HashMap<u16, Arc<CodecEntry>>,
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("codecs", &self.by_type.len())
            .finish()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            by_type: HashMap::new(),
            by_signature: HashMap::new(),
        };
        builder
            .insert::<String, _>(STRING_SIGNATURE, DEFAULT_SCRATCH_CAPACITY, StringCodec)
            .expect("default text codec cannot conflict in an empty registry");
        builder
    }

    /// Bind `T` (inferred from the codec's element type) to `signature` with
    /// a `scratch_capacity`-byte budget for one serialized instance.
    ///
    /// Fails with [`CodecError::DuplicateSignature`] if the signature is
    /// already bound to a different type, or [`CodecError::DuplicateType`]
    /// if `T` already has a codec. Bindings are permanent for the registry's
    /// lifetime.
    pub fn register<T, C>(mut self, signature: u16, scratch_capacity: usize, codec: C) -> Result<Self>
    where
        T: std::any::Any + Send,
        C: ObjectCodec<T>,
    {
        self.insert(signature, scratch_capacity, codec)?;
        Ok(self)
    }

    /// [`Self::register`] with the [`DEFAULT_SCRATCH_CAPACITY`] budget.
    pub fn register_with_default_scratch<T, C>(self, signature: u16, codec: C) -> Result<Self>
    where
        T: std::any::Any + Send,
        C: ObjectCodec<T>,
    {
        self.register(signature, DEFAULT_SCRATCH_CAPACITY, codec)
    }

    fn insert<T, C>(&mut self, signature: u16, scratch_capacity: usize, codec: C) -> Result<()>
    where
        T: std::any::Any + Send,
        C: ObjectCodec<T>,
    {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(existing) = self.by_signature.get(&signature) {
            if existing.type_id != type_id {
                return Err(CodecError::DuplicateSignature {
                    signature,
                    existing: existing.type_name,
                });
            }
        }
        if self.by_type.contains_key(&type_id) {
            return Err(CodecError::DuplicateType(type_name));
        }

        let codec = Arc::new(codec);
        let serialize = {
            let codec = Arc::clone(&codec);
            Box::new(move |writer: &mut FrameWriter, value: &dyn std::any::Any| {
                let value = value
                    .downcast_ref::<T>()
                    .expect("registry dispatched a value of the wrong type");
                codec.serialize(writer, value)
            }) as Box<SerializeFn>
        };
        let deserialize = Box::new(move |reader: &mut FrameReader| {
            codec
                .deserialize(reader)
                .map(|value| Box::new(value) as Box<dyn std::any::Any + Send>)
        }) as Box<DeserializeFn>;

        let entry = Arc::new(CodecEntry {
            type_id,
            type_name,
            signature,
            scratch_capacity,
            serialize,
            deserialize,
        });
        debug!(signature, type_name, scratch_capacity, "registered codec");
        self.by_signature.insert(signature, Arc::clone(&entry));
        self.by_type.insert(type_id, entry);
        Ok(())
    }

    /// Freeze the bindings into a shared, immutable registry handle.
    pub fn build(self) -> Arc<CodecRegistry> {
        debug!(codecs = self.by_type.len(), "codec registry frozen");
        Arc::new(CodecRegistry {
            by_type: self.by_type,
            by_signature: self.by_signature,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen signature/type bindings, read concurrently by any number of
/// encode and decode operations.
pub struct CodecRegistry {
    by_type: HashMap<TypeId, Arc<CodecEntry>>,
    by_signature: HashMap<u16, Arc<CodecEntry>>,
}

impl CodecRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The entry bound to `T`, if any.
    pub fn lookup_by_type<T: std::any::Any>(&self) -> Option<Arc<CodecEntry>> {
        self.by_type.get(&TypeId::of::<T>()).cloned()
    }

    /// The entry bound to `signature`.
    ///
    /// Fails with [`CodecError::UnknownSignature`] when no codec is bound,
    /// the path taken when decoding a buffer produced by a different
    /// registry, or a corrupted one.
    pub fn lookup_by_signature(&self, signature: u16) -> Result<Arc<CodecEntry>> {
        self.by_signature
            .get(&signature)
            .cloned()
            .ok_or(CodecError::UnknownSignature(signature))
    }

    pub(crate) fn entry_for<T: std::any::Any>(&self) -> Result<Arc<CodecEntry>> {
        self.lookup_by_type::<T>()
            .ok_or_else(|| CodecError::UnregisteredType(std::any::type_name::<T>()))
    }

    /// Number of registered codecs, the default text codec included.
    pub fn codec_count(&self) -> usize {
        self.by_type.len()
    }

    /// A [`FrameWriter`] over a fresh buffer of `capacity` bytes,
    /// dispatching through this registry.
    pub fn writer(self: &Arc<Self>, capacity: usize) -> FrameWriter {
        FrameWriter::new(Arc::clone(self), capacity)
    }

    /// A [`FrameReader`] over `bytes`, dispatching through this registry.
    pub fn reader(self: &Arc<Self>, bytes: Vec<u8>) -> FrameReader {
        FrameReader::new(Arc::clone(self), bytes)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.by_type.len())
            .finish()
    }
}
