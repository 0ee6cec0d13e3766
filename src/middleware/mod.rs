// Middleware for cross-origin requests

pub mod cors;

pub use cors::*;
