//! # Spam Model
//!
//! Toy online-learning spam classifier with synthetic data generation.
//!
//! This crate contains pure model logic:
//! - [`EmailGenerator`] produces fake emails with spam tactics that evolve
//!   over simulated days
//! - [`SpamDetector`] keeps a dynamic bag-of-words vocabulary and refits a
//!   logistic model over all accumulated data whenever it learns
//!
//! **No API concerns**: HTTP endpoints live in `api-rest`.

pub mod detector;
pub mod generator;

pub use detector::SpamDetector;
pub use generator::EmailGenerator;
