//! Core types for Bistro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod menu;
pub mod price;
pub mod status;

pub use id::*;
pub use menu::{ALL_CATEGORIES, MenuItem, categories, filter_by_category};
pub use price::{Price, PriceError};
pub use status::*;
