//! Storage modules: settings

pub mod config;
