//! API module for the HTTP surface of the backend.
//!
//! Each submodule owns the handlers and routes for one resource; `common`
//! holds the response envelope and error mapping shared by all of them.

pub mod common;
pub mod profile;
