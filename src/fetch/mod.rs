pub mod rate_limit;
pub mod single_flight;

pub use rate_limit::RateLimiter;
pub use single_flight::{FetchCache, FetchOutcome};
