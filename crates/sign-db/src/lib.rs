#![deny(unsafe_code)]

//! `SQLite` repository implementations for the sign-translation backend.

pub mod factory;
pub mod repositories;
pub mod setup;

pub use factory::{RepoFactory, Repos};
pub use setup::setup_database;

#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
