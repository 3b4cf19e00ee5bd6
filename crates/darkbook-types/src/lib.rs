//! # darkbook-types
//!
//! Shared types, errors, and configuration for the **Darkbook** confidential
//! order book.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Principal`], [`OrderId`], [`RequestId`]
//! - **Ciphertext handles**: [`RawHandle`], [`CtHandle`], [`CtValue`], [`CtScalar`]
//! - **Order model**: [`Order`]
//! - **Events**: [`Event`], [`EventKind`]
//! - **Configuration**: [`PoolConfig`]
//! - **Errors**: [`DarkbookError`] with `DB_ERR_` prefix codes
//!
//! Everything numeric or directional about a balance or an order lives
//! behind a [`CtHandle`]; only identities, timestamps, and lifecycle flags
//! are ever plaintext.

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod handle;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use darkbook_types::{Principal, Order, CtHandle, DarkbookError, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use handle::*;
pub use ids::*;
pub use order::*;

// Constants are accessed via `darkbook_types::constants::FOO`
// (not re-exported to avoid name collisions).
