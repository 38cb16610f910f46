//! In-memory query engine over assembled defense views.
//!
//! # Responsibility
//! - Keep filtering, sorting and suggestion logic pure and synchronous.
//! - Shape raw records into presentation view models.

pub mod filter;
pub mod suggest;
pub mod view;
