//! Port traits for the purchase-order gateway.

pub mod repository;

pub use repository::OrderRepository;
