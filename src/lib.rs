//! # Music Gateway
//!
//! Discord music bot with per-guild playback scheduling and a blue/green
//! active switch, so two instances can share one token and hand over without
//! downtime.
//!
//! - [`audio`]: queue, scheduler, player integration and session registry
//! - [`sources`]: query/URL resolution through `yt-dlp`
//! - [`bot`]: Serenity event handler, slash and text commands
//! - [`active`]: blue/green gate and readiness marker
//! - [`health`]: `GET /health` endpoint reporting the active switch
//! - [`cache`]: TTL cache for autocomplete suggestions
//! - [`config`]: environment-driven configuration

pub mod active;
pub mod audio;
pub mod bot;
pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod sources;
