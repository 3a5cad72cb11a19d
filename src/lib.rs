//! FitnessBuddy demo backend.
//!
//! A REST API over in-memory collections of profiles, workouts, buddy connections,
//! goals, achievements and challenges, plus a client for it. Nothing is persisted:
//! the store is seeded with one profile and one workout at startup and lives as
//! long as the server.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod store;
pub mod util;

pub use client::{ApiClient, ClientError};
pub use config::Config;
pub use model::{Kind, Record};
pub use server::Server;
pub use store::Store;
