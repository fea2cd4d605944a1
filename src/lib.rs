//! Jibreel Storefront
//!
//! Bilingual (English/Arabic) clothing storefront with a small back office.
//!
//! ## Features
//! - Catalog search and filtering per language
//! - Per-session carts with variant and stock checks
//! - Checkout into pending orders
//! - Admin product and order management
//! - Product image uploads
//! - Domain events on NATS

pub mod api;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod session;
pub mod store;
pub mod upload;

pub use api::{router, AppState};
pub use config::{Config, ConfigError};
