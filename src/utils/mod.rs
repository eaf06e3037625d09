//! Utility modules for common functionality.
//!
//! File logging setup and the drop guard used for terminal and PID-file
//! cleanup.

pub mod context;
pub mod logger;
