use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::GuildId;
use songbird::{
    input::{File, Input, YoutubeDl},
    tracks::TrackHandle,
    Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    audio::{queue::PlaybackItem, scheduler::TrackEndListener},
    error::PlayerError,
    sources::is_url,
};

/// Motivo por el que terminó un track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Fin natural o skip: se puede avanzar al siguiente
    NaturalOrSkipped,
    /// Stop explícito: no se avanza ni se dispara autoplay
    ExplicitStop,
}

impl EndReason {
    pub fn may_start_next(self) -> bool {
        matches!(self, Self::NaturalOrSkipped)
    }
}

/// Sesión de reproducción de un guild.
///
/// El reproductor avisa el fin de cada track exactamente una vez a través del
/// [`TrackEndListener`] con el que fue creado, y nunca desde dentro de
/// `start_item` o `stop_current`.
pub trait PlayerHandle: Send + Sync {
    /// Comienza a reproducir `item`, reemplazando el actual
    fn start_item(&self, item: PlaybackItem) -> Result<(), PlayerError>;

    fn stop_current(&self, reason: EndReason) -> Result<(), PlayerError>;

    fn is_playing(&self) -> bool;

    fn set_paused(&self, paused: bool) -> Result<(), PlayerError>;

    fn is_paused(&self) -> bool;

    fn current_item(&self) -> Option<PlaybackItem>;
}

/// Crea el reproductor de un guild ligado a su scheduler
pub trait PlayerFactory: Send + Sync {
    fn create_player(&self, guild_id: GuildId, listener: TrackEndListener) -> Arc<dyn PlayerHandle>;
}

#[derive(Default)]
struct PlayerState {
    generation: u64,
    current: Option<PlaybackItem>,
    handle: Option<TrackHandle>,
    playing: bool,
    paused: bool,
    // generación cuyo fin todavía no se notificó
    pending_end: Option<u64>,
    stop_reason: Option<EndReason>,
}

/// Reproductor sobre una llamada de voz de songbird
pub struct SongbirdPlayer {
    guild_id: GuildId,
    songbird: Arc<Songbird>,
    http: reqwest::Client,
    listener: TrackEndListener,
    state: Arc<Mutex<PlayerState>>,
}

impl SongbirdPlayer {
    pub fn new(
        guild_id: GuildId,
        songbird: Arc<Songbird>,
        http: reqwest::Client,
        listener: TrackEndListener,
    ) -> Self {
        Self {
            guild_id,
            songbird,
            http,
            listener,
            state: Arc::new(Mutex::new(PlayerState::default())),
        }
    }

    fn input_for(&self, item: &PlaybackItem) -> Input {
        if is_url(&item.source_locator) {
            YoutubeDl::new(self.http.clone(), item.source_locator.clone()).into()
        } else {
            File::new(item.source_locator.clone()).into()
        }
    }
}

impl PlayerHandle for SongbirdPlayer {
    fn start_item(&self, item: PlaybackItem) -> Result<(), PlayerError> {
        let call = self
            .songbird
            .get(self.guild_id)
            .ok_or(PlayerError::NotConnected)?;

        let generation = {
            let mut st = self.state.lock();
            if let Some(old) = st.handle.take() {
                // su evento de fin queda descartado por la generación
                let _ = old.stop();
            }
            st.generation += 1;
            st.current = Some(item.clone());
            st.playing = true;
            st.paused = false;
            st.pending_end = Some(st.generation);
            st.stop_reason = None;
            st.generation
        };

        info!("🎵 Reproduciendo: {} en guild {}", item.title, self.guild_id);

        let input = self.input_for(&item);
        let state = self.state.clone();
        let listener = self.listener.clone();
        let guild_id = self.guild_id;

        tokio::spawn(async move {
            let handle = call.lock().await.play_input(input);

            let stopped_early = {
                let mut st = state.lock();
                if st.generation != generation {
                    debug!("Track reemplazado antes de arrancar en guild {}", guild_id);
                    let _ = handle.stop();
                    return;
                }
                if st.playing {
                    if st.paused {
                        let _ = handle.pause();
                    }
                    st.handle = Some(handle.clone());
                    None
                } else {
                    st.pending_end = None;
                    Some(st.stop_reason.take().unwrap_or(EndReason::NaturalOrSkipped))
                }
            };

            if let Some(reason) = stopped_early {
                let _ = handle.stop();
                listener.track_ended(reason).await;
                return;
            }

            let notifier = TrackEndNotifier {
                generation,
                state: state.clone(),
                listener,
            };

            if let Err(e) = handle.add_event(Event::Track(TrackEvent::Error), notifier.clone()) {
                warn!("⚠️ No se pudo registrar handler de error: {:?}", e);
            }
            if let Err(e) = handle.add_event(Event::Track(TrackEvent::End), notifier.clone()) {
                // el track ya terminó antes de registrar el handler
                warn!("⚠️ No se pudo registrar handler de fin: {:?}", e);
                notifier.deliver().await;
            }
        });

        Ok(())
    }

    fn stop_current(&self, reason: EndReason) -> Result<(), PlayerError> {
        let mut st = self.state.lock();
        if !st.playing {
            return Ok(());
        }

        st.playing = false;
        st.paused = false;
        st.current = None;
        st.stop_reason = Some(reason);

        if let Some(handle) = st.handle.as_ref() {
            handle
                .stop()
                .map_err(|e| PlayerError::Driver(e.to_string()))?;
        }

        info!("⏹️ Track detenido en guild {} ({:?})", self.guild_id, reason);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn set_paused(&self, paused: bool) -> Result<(), PlayerError> {
        let mut st = self.state.lock();
        if !st.playing {
            return Ok(());
        }

        st.paused = paused;
        if let Some(handle) = st.handle.as_ref() {
            let result = if paused { handle.pause() } else { handle.play() };
            result.map_err(|e| PlayerError::Driver(e.to_string()))?;
        }

        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn current_item(&self) -> Option<PlaybackItem> {
        self.state.lock().current.clone()
    }
}

/// Traduce los eventos de songbird al aviso de fin del scheduler
#[derive(Clone)]
struct TrackEndNotifier {
    generation: u64,
    state: Arc<Mutex<PlayerState>>,
    listener: TrackEndListener,
}

impl TrackEndNotifier {
    fn take_end(&self) -> Option<EndReason> {
        let mut st = self.state.lock();
        if st.pending_end != Some(self.generation) {
            return None;
        }

        st.pending_end = None;
        if st.generation == self.generation {
            st.playing = false;
            st.paused = false;
            st.current = None;
            st.handle = None;
        }

        Some(st.stop_reason.take().unwrap_or(EndReason::NaturalOrSkipped))
    }

    async fn deliver(&self) {
        if let Some(reason) = self.take_end() {
            self.listener.track_ended(reason).await;
        }
    }
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        if let Some(reason) = self.take_end() {
            debug!("Track terminado ({:?})", reason);
            // el avance puede esperar al resolver, no bloquear los eventos del driver
            let listener = self.listener.clone();
            tokio::spawn(async move {
                listener.track_ended(reason).await;
            });
        }

        None
    }
}

/// Fábrica de reproductores songbird
pub struct SongbirdPlayerFactory {
    songbird: Arc<Songbird>,
    http: reqwest::Client,
}

impl SongbirdPlayerFactory {
    pub fn new(songbird: Arc<Songbird>) -> Self {
        Self {
            songbird,
            http: reqwest::Client::new(),
        }
    }
}

impl PlayerFactory for SongbirdPlayerFactory {
    fn create_player(&self, guild_id: GuildId, listener: TrackEndListener) -> Arc<dyn PlayerHandle> {
        debug!("🎛️ Creando reproductor para guild {}", guild_id);
        Arc::new(SongbirdPlayer::new(
            guild_id,
            self.songbird.clone(),
            self.http.clone(),
            listener,
        ))
    }
}
