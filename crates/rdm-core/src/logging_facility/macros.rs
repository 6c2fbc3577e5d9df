//! Command boundary macros
//!
//! [`crate::module::Module`] runs every public command through one boundary
//! that logs with these, so `op`, `event`, `duration_ms` and the error code
//! always land under the same keys. Extra `tracing` fields may follow.

/// Log the start of a command
///
/// ```
/// # use rdm_core::log_op_start;
/// log_op_start!("add_content");
/// log_op_start!("set_property", element_id = 7u64, property = "text");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Log the successful end of a command
///
/// ```
/// # use rdm_core::log_op_end;
/// log_op_end!("add_content", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Log a failed command with the stable kind and code of its error
///
/// ```
/// # use rdm_core::log_op_error;
/// # use rdm_core::errors::DesignError;
/// log_op_error!("undo", DesignError::NothingToUndo, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            $($($field)+)?
        )
    }};
}
