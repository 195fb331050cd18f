#![allow(dead_code)]

pub mod authority;
pub mod config;
pub mod routes;
pub mod server;
