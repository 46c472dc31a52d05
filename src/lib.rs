// src/lib.rs
pub mod app;
pub mod cli;
pub mod data;
pub mod grid;
pub mod settings;
pub mod ui;
