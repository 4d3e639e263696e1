// src/lib.rs

pub mod db;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use pawket_common::error::Error;
pub use pawket_common::models;
