//! Procedure model and timeline synchronization.
//!
//! A procedure is an ordered list of tasks; each task binds actors to roles
//! with a per-actor duration. Loading a procedure links every actor's tasks
//! into a chain ([`chain`]) and then reconciles tasks shared by several
//! actors so they start together ([`sync`]). The result is a read-only
//! [`procedure::Procedure`] with a start and end for every binding.

pub mod chain;
pub mod columns;
pub mod config;
pub mod definition;
pub mod duration;
pub mod error;
pub mod io;
pub mod ipv;
pub mod paths;
pub mod procedure;
pub mod report;
pub mod sync;
pub mod task;

pub use duration::Duration;
pub use error::{MaestroError, Result};
pub use procedure::Procedure;
