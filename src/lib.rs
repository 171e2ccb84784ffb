#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub(crate) mod api;
pub mod app;
pub mod config;
pub mod localization;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod registry;
pub mod service;
