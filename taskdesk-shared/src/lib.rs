//! # TaskDesk Shared Library
//!
//! This crate contains the domain types, persistence and business rules used
//! by the TaskDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks, checklist reconciliation and dashboard aggregation
//! - `auth`: Password hashing, JWT tokens, bearer extraction and authorization checks
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
