//! Foundation types for the Supply Custody Ledger (SCL).
//!
//! This crate provides the identity, capability, and lifecycle types used
//! throughout the SCL system. Every other SCL crate depends on `scl-types`.
//!
//! # Key Types
//!
//! - [`AccountId`] — Persistent participant identity derived from genesis material
//! - [`Role`] — Closed set of supply-chain capabilities an account can hold
//! - [`BatchState`] — Custody lifecycle state with stable numeric codes
//! - [`Timestamp`] — Wall-clock milliseconds since the Unix epoch

pub mod account;
pub mod error;
pub mod role;
pub mod state;
pub mod time;

pub use account::{AccountId, AccountMaterial};
pub use error::TypeError;
pub use role::Role;
pub use state::BatchState;
pub use time::Timestamp;
