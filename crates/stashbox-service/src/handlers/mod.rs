//! HTTP request handlers.

pub mod credits;
pub mod files;
pub mod health;
pub mod payments;
pub mod profiles;
