pub mod app;
pub mod availability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod storage;
pub mod tmdb;
