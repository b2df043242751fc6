pub mod auth;
pub mod backend;
pub mod calendar;
pub mod comparison;
pub mod config;
pub mod debounce;
pub mod demo_backend;
pub mod detail;
pub mod display;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod flags;
pub mod http_client;
pub mod models;
pub mod paging;
pub mod persist;
pub mod provider;
pub mod router;
pub mod state;
pub mod supabase;
