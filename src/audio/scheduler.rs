use parking_lot::Mutex;
use serenity::model::id::GuildId;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

use crate::{
    audio::{
        channel::ChannelRef,
        player::{EndReason, PlayerHandle},
        queue::{GuildQueue, PlaybackItem},
    },
    sources::{ResolveOutcome, Resolver},
};

/// Estado observable del scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    ResolvingAutoplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Playing,
    ResolvingAutoplay { ticket: u64 },
}

struct SchedulerState {
    phase: Phase,
    // cada transición lo incrementa; una respuesta de autoplay sólo se aplica si su ticket sigue vigente
    epoch: u64,
}

/// Búsqueda de autoplay pendiente, ejecutada fuera del lock
struct AutoplayRequest {
    ticket: u64,
    query: String,
}

/// Resultado de `enqueue`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// El reproductor estaba libre y arrancó este item
    Started(PlaybackItem),
    /// Quedó en la cola en la posición indicada (1 = siguiente)
    Queued { position: usize },
    /// El reproductor rechazó el arranque
    PlayerFailed,
}

/// Resultado de pausar o reanudar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    NothingPlaying,
    AlreadyInState,
    Changed,
}

/// Máquina de estados que decide qué suena a continuación en un guild.
///
/// Todas las mutaciones (enqueue, skip, clear, stop, fin de track) toman el
/// mismo lock por guild. La búsqueda de autoplay se hace sin el lock y su
/// resultado se descarta si otra operación invalidó el ticket mientras tanto.
pub struct TrackScheduler {
    guild_id: GuildId,
    queue: Arc<GuildQueue>,
    player: Arc<dyn PlayerHandle>,
    resolver: Arc<dyn Resolver>,
    state: Mutex<SchedulerState>,
}

impl TrackScheduler {
    pub fn new(
        guild_id: GuildId,
        queue: Arc<GuildQueue>,
        player: Arc<dyn PlayerHandle>,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        Self {
            guild_id,
            queue,
            player,
            resolver,
            state: Mutex::new(SchedulerState {
                phase: Phase::Idle,
                epoch: 0,
            }),
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn queue(&self) -> &Arc<GuildQueue> {
        &self.queue
    }

    pub fn state(&self) -> PlaybackState {
        match self.state.lock().phase {
            Phase::Idle => PlaybackState::Idle,
            Phase::Playing => PlaybackState::Playing,
            Phase::ResolvingAutoplay { .. } => PlaybackState::ResolvingAutoplay,
        }
    }

    pub fn now_playing(&self) -> Option<PlaybackItem> {
        self.player.current_item()
    }

    /// Agrega un item; si no hay nada sonando arranca la cabeza de la cola
    pub fn enqueue(
        &self,
        item: PlaybackItem,
        channel: Option<ChannelRef>,
    ) -> EnqueueOutcome {
        let mut state = self.state.lock();
        self.queue.enqueue(item, channel);

        if self.player.is_playing() {
            return EnqueueOutcome::Queued {
                position: self.queue.len(),
            };
        }

        state.epoch += 1;
        match self.queue.dequeue_next() {
            Some(next) => {
                if self.start_locked(&mut state, next.clone(), None) {
                    EnqueueOutcome::Started(next)
                } else {
                    EnqueueOutcome::PlayerFailed
                }
            }
            None => EnqueueOutcome::PlayerFailed,
        }
    }

    /// Aviso del reproductor: terminó el track actual
    pub async fn on_track_ended(&self, reason: EndReason) {
        let request = {
            let mut state = self.state.lock();

            if !reason.may_start_next() {
                debug!("⏹️ Fin por stop explícito en guild {}, sin avance", self.guild_id);
                return;
            }

            if state.phase != Phase::Playing {
                // stop_all (o un fallo de arranque) ya dejó la sesión en reposo
                debug!("Aviso de fin con la sesión en reposo en guild {}, sin avance", self.guild_id);
                return;
            }

            if self.player.is_playing() {
                // ya arrancó otro track desde que se emitió el aviso
                debug!("Aviso de fin obsoleto en guild {}", self.guild_id);
                return;
            }

            self.advance_locked(&mut state)
        };

        if let Some(request) = request {
            self.run_autoplay(request).await;
        }
    }

    /// Salta el track actual; el avance ocurre en el aviso de fin
    pub fn skip(&self) -> bool {
        let mut state = self.state.lock();

        if self.player.is_playing() {
            if let Err(e) = self.player.stop_current(EndReason::NaturalOrSkipped) {
                error!("❌ Error al saltar track en guild {}: {:?}", self.guild_id, e);
                return false;
            }
            info!("⏭️ Track saltado en guild {}", self.guild_id);
            return true;
        }

        if self.queue.is_empty() {
            return false;
        }

        // sin reproducción activa pero con items pendientes: avanzar directamente
        self.advance_locked(&mut state);
        true
    }

    /// Vacía la cola sin tocar el track actual
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        state.epoch += 1;
        if matches!(state.phase, Phase::ResolvingAutoplay { .. }) {
            state.phase = Phase::Idle;
        }
        self.queue.clear()
    }

    /// Detiene el track actual sin avance y vacía la cola
    pub fn stop_all(&self) {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.phase = Phase::Idle;
        self.queue.clear();

        if let Err(e) = self.player.stop_current(EndReason::ExplicitStop) {
            error!("❌ Error al detener reproducción en guild {}: {:?}", self.guild_id, e);
        }
        info!("⏹️ Reproducción detenida en guild {}", self.guild_id);
    }

    pub fn set_autoplay(&self, enabled: bool) {
        self.queue.set_autoplay(enabled);
    }

    pub fn set_paused(&self, paused: bool) -> PauseOutcome {
        let _state = self.state.lock();

        if self.player.current_item().is_none() {
            return PauseOutcome::NothingPlaying;
        }
        if self.player.is_paused() == paused {
            return PauseOutcome::AlreadyInState;
        }

        match self.player.set_paused(paused) {
            Ok(()) => PauseOutcome::Changed,
            Err(e) => {
                error!("❌ Error al cambiar pausa en guild {}: {:?}", self.guild_id, e);
                PauseOutcome::NothingPlaying
            }
        }
    }

    fn advance_locked(&self, state: &mut SchedulerState) -> Option<AutoplayRequest> {
        state.epoch += 1;

        if let Some(next) = self.queue.dequeue_next() {
            let announcement = format!("▶️ Reproduciendo: {}", next.title);
            self.start_locked(state, next, Some(announcement));
            return None;
        }

        if self.queue.is_autoplay() {
            if let Some(seed) = self.queue.last_played() {
                let ticket = state.epoch;
                state.phase = Phase::ResolvingAutoplay { ticket };
                info!("📻 Buscando recomendación para autoplay a partir de: {}", seed.title);
                return Some(AutoplayRequest {
                    ticket,
                    query: seed.autoplay_query(),
                });
            }
        }

        debug!("📭 Cola vacía en guild {}, en reposo", self.guild_id);
        state.phase = Phase::Idle;
        None
    }

    async fn run_autoplay(&self, request: AutoplayRequest) {
        let outcome = self.resolver.resolve(&request.query).await;

        let mut state = self.state.lock();
        if state.phase != (Phase::ResolvingAutoplay { ticket: request.ticket }) {
            debug!("🗑️ Resultado de autoplay descartado en guild {}", self.guild_id);
            return;
        }

        match outcome {
            ResolveOutcome::Failure(reason) => {
                warn!("❌ Falló la búsqueda de autoplay en guild {}: {}", self.guild_id, reason);
                state.phase = Phase::Idle;
                self.notify(format!("❌ Falló la carga de autoplay: {}", reason));
            }
            other => match other.first() {
                Some(item) => {
                    let announcement = format!("📻 Autoplay: {}", item.title);
                    state.epoch += 1;
                    self.start_locked(&mut state, item, Some(announcement));
                }
                None => {
                    info!("🔍 Sin recomendación de autoplay en guild {}", self.guild_id);
                    state.phase = Phase::Idle;
                    self.notify("❌ No se encontró una canción recomendada para autoplay".to_string());
                }
            },
        }
    }

    fn start_locked(
        &self,
        state: &mut SchedulerState,
        item: PlaybackItem,
        announcement: Option<String>,
    ) -> bool {
        match self.player.start_item(item.clone()) {
            Ok(()) => {
                self.queue.record_played(item);
                state.phase = Phase::Playing;
                if let Some(text) = announcement {
                    self.notify(text);
                }
                true
            }
            Err(e) => {
                error!("❌ No se pudo reproducir {} en guild {}: {:?}", item.title, self.guild_id, e);
                state.phase = Phase::Idle;
                self.notify(format!("❌ No se pudo reproducir {}: {}", item.title, e));
                false
            }
        }
    }

    fn notify(&self, text: String) {
        if let Some(channel) = self.queue.last_channel() {
            channel.post(text);
        }
    }
}

/// Canal por el que el reproductor avisa el fin de un track a su scheduler
#[derive(Clone)]
pub struct TrackEndListener {
    scheduler: Weak<TrackScheduler>,
}

impl TrackEndListener {
    pub fn new(scheduler: Weak<TrackScheduler>) -> Self {
        Self { scheduler }
    }

    pub async fn track_ended(&self, reason: EndReason) {
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.on_track_ended(reason).await,
            None => debug!("Scheduler ya liberado, aviso de fin ignorado"),
        }
    }
}
