//! Configuration for the dataset indexer.
//!
//! [`Settings`] is resolved once at startup and passed by reference; nothing
//! below the dispatcher reads the environment.

pub mod dependencies;
pub mod settings;

pub use dependencies::Dependencies;
pub use settings::{Dataset, Settings};
