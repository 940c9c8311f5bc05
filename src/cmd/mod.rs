pub mod changelog;
pub mod config;
