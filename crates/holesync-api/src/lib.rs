// holesync-api: Async Rust client for the Pi-hole v6 REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod groups;
pub mod lists;
pub mod models;
pub mod stats;
pub mod transport;

pub use auth::Session;
pub use client::{PiholeClient, SESSION_HEADER};
pub use error::Error;
pub use models::{
    ClientStats, GravityStats, GroupRecord, GroupUpdate, ListRecord, ListUpdate, QueryStats,
    StatsSummary,
};
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
