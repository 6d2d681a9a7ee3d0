pub mod archive;
pub mod config;
pub mod login_probe;
pub mod models;
