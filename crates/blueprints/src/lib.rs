//! Blueprints API Library
//!
//! Core components of the blueprints service: RS256 token issuance and
//! verification, the scope gate, and the HTTP API built on top of them.

pub mod api;
pub mod auth;
pub mod blueprint;
pub mod config;
