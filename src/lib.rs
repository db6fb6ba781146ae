// ABOUTME: Library crate for Aptos Flow exposing the wallet session manager and workflow store

pub mod chain;
pub mod config;
pub mod models;
pub mod runner;
pub mod wallet;
pub mod workflows;
