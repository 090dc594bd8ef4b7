//! Reward reveal: phase timeline for the payment-success cashback animation.

pub mod config;
pub mod demo;
pub mod error;
pub mod render;
pub mod reveal;
