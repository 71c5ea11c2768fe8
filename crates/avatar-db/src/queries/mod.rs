//! Database query modules.

pub mod users;
