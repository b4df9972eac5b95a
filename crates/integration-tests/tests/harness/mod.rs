#![allow(dead_code)]

pub mod config;
pub mod fakes;
pub mod mock_engine;
pub mod server;
pub mod workspace;
