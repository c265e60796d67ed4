//! Body mass index calculation, validation, and in-memory record stores.

pub mod calculator;
pub mod db;
pub mod debounce;
pub mod error;
pub mod form;
pub mod models;
pub mod seed;
pub mod service;
pub mod session;

pub use error::{Error, Result};
