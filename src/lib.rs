pub mod app;
pub mod auth;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod mealplans;
pub mod nutrition;
pub mod state;
