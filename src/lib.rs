pub mod app;
pub mod auth;
pub mod config;
pub mod meals;
pub mod nutrition;
pub mod state;
pub mod storage;
pub mod users;
