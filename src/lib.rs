//! Payconfirm - payment confirmation service for the storefront checkout flow
//!
//! After the hosted payment page redirects the shopper back to the storefront,
//! this service resolves the redirect to an order, polls the backend until the
//! payment settles (or a retry budget runs out), and reports the outcome.

pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod reconciler;
pub mod state;
