pub mod api;
pub mod config;
pub mod debouncer;
pub mod models;
pub mod service_container;
pub mod services;
pub mod state;
pub mod table_display;
pub mod utils;
