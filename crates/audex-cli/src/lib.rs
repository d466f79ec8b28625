//! Library half of the `audex` binary: logging setup and record loading.

pub mod logging;
pub mod records;
