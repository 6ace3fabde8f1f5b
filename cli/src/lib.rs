//! git-bench command line library, exposed for unit tests

pub mod app;
pub mod commands;
pub mod work_area;
