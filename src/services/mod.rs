pub mod portfolio;
pub mod rate_limit;
