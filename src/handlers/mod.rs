pub mod fallback;
pub mod portfolio;
pub mod versions;
