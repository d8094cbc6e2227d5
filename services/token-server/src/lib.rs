//! Credential intermediary for browser and embedded clients.
//!
//! Holds the long-lived provider key and hands out short-lived realtime
//! session secrets through `GET /api/get-token`. The binary in `bin/` is a
//! thin wrapper around [`router::create_router`].

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
