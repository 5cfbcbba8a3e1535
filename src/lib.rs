pub mod api;
pub mod commission;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod models;
pub mod observability;
pub mod repository;
pub mod state;
pub mod verification;
