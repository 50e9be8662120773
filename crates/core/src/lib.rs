pub mod aggregate;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod paginator;
pub mod ports;
pub mod render;
pub mod thread;
pub mod utils;
