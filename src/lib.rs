//! Business registry dashboard over the INEGI DENUE directory.
//!
//! The pipeline is `data::loader` → `dashboard::handle` (filter chain, CSV
//! export, cards) → `html` / `ui` for presentation. Everything below `app`,
//! `state` and `ui` is free of egui and can be driven directly.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod html;
pub mod state;
pub mod ui;
