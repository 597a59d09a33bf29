//! Prometheus exporter for Redfish BMCs.
//!
//! `GET /redfish?target=<host>&group=<name>` runs one scrape of `target`
//! with the credentials of `group` and renders the samples in the text
//! exposition format.

pub mod api;
pub mod app;
pub mod config;
pub mod exposition;
pub mod logging;
pub mod metrics;
pub mod state;
