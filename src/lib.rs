// src/lib.rs

//! Social Collector Library

pub mod analysis;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
