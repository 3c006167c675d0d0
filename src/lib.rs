//! Library exports for the short-link service
//!
//! This module exposes internal components for testing and potential library usage.

pub mod config;
pub mod database;
pub mod error;
pub mod generator;
pub mod handler;
pub mod model;
pub mod route;
pub mod service;
pub mod store;
