pub mod archive;
pub mod batch;
pub mod cleanup;
pub mod collision;
pub mod config;
pub mod constants;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod utils;
