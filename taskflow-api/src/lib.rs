//! # TaskFlow API Server Library
//!
//! HTTP surface of TaskFlow: SSO sign-in, teams, projects, tasks and
//! comments, each guarded by the authorization engine in `taskflow-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
