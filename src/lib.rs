pub mod api;
pub mod cities;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod output;
pub mod progress;
