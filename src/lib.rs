//! Login-gated movie recommendations over a precomputed similarity matrix.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
