//! Paged list browsing for a point-of-sale backend.
//!
//! The core is UI-agnostic: [`pagination`] tracks page/size/total,
//! [`range`] compresses page numbers into a bounded strip, [`loading`]
//! tracks keyed async operation status and [`submit`] tracks a single form
//! submission whose success expires on its own. The remaining modules wire
//! these to a terminal client.

pub mod action;
pub mod app;
pub mod backend;
pub mod config;
pub mod demo;
pub mod error;
pub mod http;
pub mod loading;
pub mod pagination;
pub mod range;
pub mod submit;
pub mod tui;
pub mod types;
pub mod ui;
