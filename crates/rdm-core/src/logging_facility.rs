//! Structured logging for design commands
//!
//! - [`init`] installs a stderr subscriber for a [`Profile`]
//! - `log_op_start!`, `log_op_end!` and `log_op_error!` write the command
//!   boundary; [`crate::module::Module`] wraps every public command in one,
//!   and commands issued from inside another command do not log again
//! - [`test_capture`] keeps the lines in memory for assertions
//!
//! ```rust
//! use rdm_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use rdm_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
pub use test_capture::{init_test_capture, Boundary, CapturedEvent, TestCapture};
