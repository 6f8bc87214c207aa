//! Core library for billdesk.
//!
//! This crate holds everything that is independent of the terminal front end:
//!
//! - `auth`: session lifecycle (store, verifier, durable credential cache)
//! - `gate`: route table and the access decision for each navigation
//! - `api`: REST client for the invoicing backend
//! - `cache`: local copies of dashboard data for instant display
//! - `config`: user configuration and directory locations
//! - `models`: templates, bills and the signed-in user's profile

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod gate;
pub mod models;
