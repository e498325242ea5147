//! # Tourney Overlap
//!
//! Finds the tournaments two sendou.ink players both entered.
//!
//! ## Architecture
//!
//! - **payload**: Reference resolution and record block discovery in the raw results array
//! - **extract**: Shape-based classification of record objects into tournaments
//! - **calculate**: History spans and the comparison window
//! - **reconcile**: Joining two histories and detecting teammates
//! - **compare**: Concurrent fetch and end-to-end comparison
//! - **fetch**: Results payload sources (HTTP, saved files)
//! - **models**: Core data structures
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod compare;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod payload;
pub mod reconcile;

pub use models::*;
