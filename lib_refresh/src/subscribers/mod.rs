//! # Built-in Subscribers
//!
//! Ready-made [`Subscriber`](crate::core::Subscriber) implementations.

/// Logs every delivery through the `log` facade.
pub mod log_subscriber;

pub use log_subscriber::LogSubscriber;
