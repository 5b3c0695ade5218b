//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `order` - Order submission and the pending-order hand-off
//! - `confirmation` - Order lookup for the confirmation page
//! - `auth` - Customer/admin login and signup
//! - `reservation` - Table booking
//! - `contact` - Contact form
//! - `admin` - Dashboard stats, status changes, menu editing

pub mod admin;
pub mod auth;
pub mod confirmation;
pub mod contact;
pub mod order;
pub mod reservation;
