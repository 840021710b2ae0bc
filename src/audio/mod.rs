//! # Audio Module
//!
//! Per-guild playback scheduling for the music gateway.
//!
//! ## Architecture
//!
//! ### [`queue`] - Guild Queue
//! - FIFO of resolved [`PlaybackItem`]s with an autoplay flag
//! - Remembers the last played item and the last notification channel
//!
//! ### [`scheduler`] - Track Scheduler
//! - Decides what plays next after a natural end, a skip or a stop
//! - Serializes every mutation of one guild behind a single lock
//! - Runs the autoplay lookup outside the lock and discards stale replies
//!
//! ### [`player`] - Player Integration
//! - [`PlayerHandle`] abstraction plus the songbird-backed implementation
//! - Reports each track end exactly once through a [`TrackEndListener`]
//!
//! ### [`registry`] - Session Registry
//! - Lazily builds one queue + scheduler pair per guild
//!
//! ## Concurrency
//!
//! Guilds never contend with each other. Within a guild, `enqueue`, `skip`,
//! `clear`, `stop_all` and track-end handling are mutually exclusive.

pub mod channel;
pub mod player;
pub mod queue;
pub mod registry;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_utils;

pub use channel::{ChannelRef, NotificationChannel, TextChannelRef};
pub use player::{EndReason, PlayerFactory, PlayerHandle, SongbirdPlayerFactory};
pub use queue::{GuildQueue, PlaybackItem};
pub use registry::{GuildSession, SessionRegistry};
pub use scheduler::{EnqueueOutcome, PauseOutcome, PlaybackState, TrackEndListener, TrackScheduler};
