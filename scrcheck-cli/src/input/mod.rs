//! Input handling module

pub mod glob_resolver;
pub mod range;

pub use glob_resolver::resolve_patterns;
pub use range::parse_range;
