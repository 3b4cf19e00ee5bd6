//! Error types for the Darkbook confidential order book.
//!
//! All errors use the `DB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Admin / auth errors
//! - 2xx: Balance errors
//! - 3xx: Order errors
//! - 4xx: Match request errors
//! - 5xx: Engine / proof errors
//! - 9xx: General / internal errors
//!
//! Every error is a whole-operation abort: the caller's operation leaves no
//! partial writes behind and emits no event.

use thiserror::Error;

use crate::{CtKind, OrderId, Principal, RawHandle, RequestId};

/// Central error enum for all Darkbook operations.
#[derive(Debug, Error)]
pub enum DarkbookError {
    // =================================================================
    // Admin / Auth Errors (1xx)
    // =================================================================
    /// The operation is restricted to the current admin principal.
    #[error("DB_ERR_100: caller is not the pool admin")]
    OnlyAdmin,

    /// The null (all-zero) principal was supplied where an identity is
    /// required.
    #[error("DB_ERR_101: the zero principal is not a valid address")]
    InvalidAddress,

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Withdraw attempted before any deposit initialized the balance.
    #[error("DB_ERR_200: no balance initialized for {0}")]
    BalanceUninitialized(Principal),

    // =================================================================
    // Order Errors (3xx)
    // =================================================================
    /// The operation targets an order whose active flag is already false.
    #[error("DB_ERR_300: order {0} is not active")]
    OrderNotActive(OrderId),

    /// Cancel attempted by a principal other than the order's trader.
    #[error("DB_ERR_301: {caller} does not own order {id}")]
    NotOrderOwner { id: OrderId, caller: Principal },

    // =================================================================
    // Match Request Errors (4xx)
    // =================================================================
    /// No pending match request exists under this id.
    #[error("DB_ERR_400: match request {0} not found")]
    MatchRequestNotFound(RequestId),

    /// Expiry attempted before the request's TTL elapsed.
    #[error("DB_ERR_401: match request {0} has not timed out yet")]
    MatchRequestNotExpired(RequestId),

    // =================================================================
    // Engine / Proof Errors (5xx)
    // =================================================================
    /// The proof does not attest the ciphertext was formed for this
    /// caller/pool pair.
    #[error("DB_ERR_500: input proof rejected: {reason}")]
    ProofInvalid { reason: String },

    /// A handle was presented that the engine never issued.
    #[error("DB_ERR_501: unknown ciphertext handle {0}")]
    UnknownHandle(RawHandle),

    /// A handle of one ciphertext kind was used where another was expected.
    #[error("DB_ERR_502: ciphertext type mismatch: expected {expected}, got {actual}")]
    CiphertextTypeMismatch { expected: CtKind, actual: CtKind },

    /// Decryption requested by a principal with no grant on the handle.
    #[error("DB_ERR_503: {principal} has no decryption grant for {handle}")]
    AccessDenied {
        handle: RawHandle,
        principal: Principal,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("DB_ERR_900: internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DarkbookError>;
