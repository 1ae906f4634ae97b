//! Expiration decision core for wardend
//!
//! This crate is the heart of wardend, containing:
//! - [`ExpirationVerdict`] — the immutable outcome of one expiration check
//! - [`ExpirationStrategy`] — the contract every criterion implements
//! - [`AllOf`] / [`AnyOf`] — composites that combine criteria into a tree
//! - [`strategies`] — the leaf criteria (idle timeout, low memory, version
//!   mismatch, explicit stop)
//! - [`DaemonState`] — the state the criteria evaluate
//! - [`Supervisor`] — owns the state and the strategy tree, ticked by the
//!   daemon's scheduler

mod compose;
mod daemon;
pub mod strategies;
mod strategy;
mod supervisor;
mod verdict;

pub use compose::*;
pub use daemon::*;
pub use strategy::*;
pub use supervisor::*;
pub use verdict::*;
