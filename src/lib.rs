//! NoxX: the core of a multi-tab desktop browser shell.
//!
//! The library holds the tab registry, per-tab shadow history, render surface
//! bookkeeping, detached-window coordination and the notification channel to
//! the UI. Binaries and integration tests build on it.

pub mod app;
pub mod database;
pub mod engine;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod shell;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
