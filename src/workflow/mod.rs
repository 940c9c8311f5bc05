pub mod changelog;
pub mod correlate;
