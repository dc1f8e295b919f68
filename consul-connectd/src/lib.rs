pub mod config;
pub mod catalog;
pub mod connection;
pub mod user;
pub mod provider;
pub mod api;
