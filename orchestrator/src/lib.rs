//! Migration Orchestrator - HTTP backend for the migration dashboard
//!
//! This library provides the API surface, the dry-run scoring engine, the
//! scripted progress runner, and the wizard flow state machine.

pub mod api;
pub mod auth;
pub mod crypto;
pub mod entity;
pub mod scoring;
pub mod wizard;
