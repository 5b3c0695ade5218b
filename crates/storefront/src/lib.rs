//! Bistro Storefront library.
//!
//! This crate provides the ordering site and admin panel as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`backend`] - HTTP client for the restaurant backend
//! - [`catalog`] - Shared menu cache
//! - [`storage`] - Per-visitor durable storage (session-backed)
//! - [`store`] - Per-request session, menu and cart state
//! - [`services`] - Ordering, confirmation, auth, reservations, contact, admin
//! - [`routes`] - Axum handlers and the application router

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;
