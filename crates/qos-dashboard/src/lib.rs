//! QoS Dashboard - client, operator console and API server for the QoS
//! testbed.
//!
//! The client side ([`DashboardClient`], [`PollLoop`]) drives backend
//! scripts and keeps a shared [`view::DashboardView`] fresh. The server side
//! ([`backend::Backend`], [`file_server`]) runs the scripts as child
//! processes and exposes their logs, the traffic CSV and the decision log.

pub mod api_client;
pub mod backend;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod file_server;
pub mod operator_console;
pub mod poll;
pub mod process;
pub mod view;

pub use api_client::ApiClient;
pub use dashboard::DashboardClient;
pub use error::DashboardError;
pub use poll::PollLoop;
