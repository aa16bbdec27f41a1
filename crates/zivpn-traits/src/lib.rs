//! ZiVPN Traits - Shared error taxonomy and collaborator seams.
//!
//! This crate provides the interfaces used across the ZiVPN workspace:
//! - AdminError and ErrorKind
//! - SyncBackend (remote backup tool) and ServiceController (service restarts)
//! - Clock

pub mod clock;
pub mod error;
pub mod tool;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AdminError, ErrorKind, Result};
pub use tool::{ServiceController, SyncBackend, ToolOutput};
