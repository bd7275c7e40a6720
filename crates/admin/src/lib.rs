//! Mahardika Admin library.
//!
//! This crate provides the admin portal as a library, allowing it to be tested
//! and reused by the CLI.
//!
//! # Data
//!
//! All records live in memory for the life of the process, seeded from the
//! built-in sample set or a YAML fixture file. Sign-in is simulated.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
