//! Profile API: role-sensitive read and update of user records.

pub mod handlers;
pub mod models;
pub mod routes;
