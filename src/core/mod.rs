//! Core library components.
//!
//! This module contains the reusable logic: the secrets document model,
//! credential validation, and the seams to the external identity provider
//! and secret store.

pub mod config;
pub mod constants;
pub mod credentials;
pub mod database;
pub mod document;
pub mod exec;
pub mod provider;
pub mod secrets;
pub mod store;
pub mod types;
