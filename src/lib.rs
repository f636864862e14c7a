pub mod config;
pub mod dispatch;
pub mod hits;
pub mod identity;
pub mod models;
pub mod tracker;
