//! Command implementations for tls-trustcheck

pub mod batch;
pub mod check;

pub use batch::run_batch;
pub use check::run_check;
