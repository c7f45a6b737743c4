//! Core of the video downloader front-end: format selection, the background
//! download worker and the UI-independent controller that drives it.

pub mod config;
pub mod controller;
pub mod download;
pub mod format;
pub mod localizations;
pub mod models;
pub mod registry;
pub mod worker;
