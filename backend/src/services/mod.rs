//! Business logic services for the backend.

pub mod identity_provider;
pub mod profile_service;
