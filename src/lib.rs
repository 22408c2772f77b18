pub mod cache;
pub mod config;
pub mod feed;
pub mod model;
pub mod parse;
pub mod server;
