//! cloudnote: a personal note-taking backend.
//!
//! Users register and log in to obtain a signed token, then manage their own
//! notes. Notes can be trashed and restored; trashed notes are removed by the
//! [`reaper`] once their retention window runs out.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reaper;
pub mod service;

pub use error::{Error, Result};
