use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tracing::info;

use crate::{
    audio::{
        player::PlayerFactory,
        queue::GuildQueue,
        scheduler::{TrackEndListener, TrackScheduler},
    },
    sources::Resolver,
};

/// Cola y scheduler de un guild
#[derive(Clone)]
pub struct GuildSession {
    pub queue: Arc<GuildQueue>,
    pub scheduler: Arc<TrackScheduler>,
}

/// Sesiones de reproducción por guild, creadas en el primer acceso
pub struct SessionRegistry {
    sessions: DashMap<GuildId, GuildSession>,
    resolver: Arc<dyn Resolver>,
    players: Arc<dyn PlayerFactory>,
    default_autoplay: bool,
}

impl SessionRegistry {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        players: Arc<dyn PlayerFactory>,
        default_autoplay: bool,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            resolver,
            players,
            default_autoplay,
        }
    }

    /// Obtiene la sesión del guild o la crea de forma atómica
    pub fn get_or_create(&self, guild_id: GuildId) -> GuildSession {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                info!("🆕 Nueva sesión de reproducción para guild {}", guild_id);
                let queue = Arc::new(GuildQueue::new(self.default_autoplay));
                let scheduler = Arc::new_cyclic(|weak| {
                    let player = self
                        .players
                        .create_player(guild_id, TrackEndListener::new(weak.clone()));
                    TrackScheduler::new(guild_id, queue.clone(), player, self.resolver.clone())
                });
                GuildSession { queue, scheduler }
            })
            .clone()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<GuildSession> {
        self.sessions.get(&guild_id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
