//! Opaque ciphertext handles.
//!
//! A handle is a reference into the homomorphic engine's ciphertext table.
//! It carries no plaintext and must never be branched on by content — the
//! only thing the core may do with a handle is feed it back into engine
//! operations or record it in the access table. Two handles referring to
//! the same plaintext are not required to be equal as handles; `PartialEq`
//! here is handle *identity*, nothing more.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawHandle
// ---------------------------------------------------------------------------

/// Untyped handle identity. Used as the access-table key.
///
/// Id 0 is reserved for the null handle and is never issued by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RawHandle(pub u64);

impl RawHandle {
    /// The reserved never-issued handle backing sentinel records.
    pub const NULL: Self = Self(0);

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CtValue / CtScalar
// ---------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for bool {}
}

/// The ciphertext kind behind a handle, used by engines for type checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CtKind {
    Uint32,
    Uint64,
    Bool,
}

impl fmt::Display for CtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint32 => write!(f, "euint32"),
            Self::Uint64 => write!(f, "euint64"),
            Self::Bool => write!(f, "ebool"),
        }
    }
}

/// Plaintext types that can live behind a ciphertext handle.
///
/// Sealed: exactly `u32`, `u64`, and `bool`. Values cross the engine
/// boundary as width-masked 64-bit words.
pub trait CtValue: sealed::Sealed + Copy + fmt::Debug + Send + Sync + 'static {
    /// Plaintext width in bits.
    const BITS: u32;
    /// The engine-visible kind tag.
    const KIND: CtKind;

    fn to_word(self) -> u64;
    fn from_word(word: u64) -> Self;
}

/// Ciphertext types supporting scalar arithmetic and comparison.
pub trait CtScalar: CtValue {}

impl CtValue for u32 {
    const BITS: u32 = 32;
    const KIND: CtKind = CtKind::Uint32;

    fn to_word(self) -> u64 {
        u64::from(self)
    }

    fn from_word(word: u64) -> Self {
        (word & 0xFFFF_FFFF) as u32
    }
}

impl CtValue for u64 {
    const BITS: u32 = 64;
    const KIND: CtKind = CtKind::Uint64;

    fn to_word(self) -> u64 {
        self
    }

    fn from_word(word: u64) -> Self {
        word
    }
}

impl CtValue for bool {
    const BITS: u32 = 1;
    const KIND: CtKind = CtKind::Bool;

    fn to_word(self) -> u64 {
        u64::from(self)
    }

    fn from_word(word: u64) -> Self {
        word & 1 == 1
    }
}

impl CtScalar for u32 {}
impl CtScalar for u64 {}

// ---------------------------------------------------------------------------
// CtHandle
// ---------------------------------------------------------------------------

/// A typed opaque reference to an encrypted `T` held by the engine.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct CtHandle<T> {
    raw: RawHandle,
    _plaintext: PhantomData<fn() -> T>,
}

impl<T: CtValue> CtHandle<T> {
    /// Wrap a raw id issued by an engine. Engine-internal constructor.
    #[must_use]
    pub fn from_raw(raw: RawHandle) -> Self {
        Self {
            raw,
            _plaintext: PhantomData,
        }
    }

    /// The never-issued handle used by sentinel records. Any engine
    /// operation on it fails with `UnknownHandle`.
    #[must_use]
    pub fn null() -> Self {
        Self::from_raw(RawHandle::NULL)
    }

    /// Handle identity, for access-table keys and logs.
    #[must_use]
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}

// Manual impls: the phantom parameter must not drag bounds onto T.
impl<T> Clone for CtHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CtHandle<T> {}

impl<T> PartialEq for CtHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for CtHandle<T> {}

impl<T> Hash for CtHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: CtValue> fmt::Debug for CtHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CtHandle<{}>({})", T::KIND, self.raw)
    }
}

impl<T: CtValue> fmt::Display for CtHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
