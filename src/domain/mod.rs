pub mod commit;
pub mod pattern;
pub mod ticket;
