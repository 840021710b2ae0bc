//! Dobles de prueba compartidos por los tests de `audio`.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    audio::{
        channel::NotificationChannel,
        player::{EndReason, PlayerHandle},
        queue::PlaybackItem,
    },
    error::PlayerError,
    sources::{ResolveOutcome, Resolver},
};

/// Canal que guarda cada aviso publicado
#[derive(Default)]
pub struct RecordingChannel {
    posts: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().clone()
    }
}

impl NotificationChannel for RecordingChannel {
    fn post(&self, text: String) {
        self.posts.lock().push(text);
    }
}

#[derive(Default)]
struct FakeState {
    started: Vec<PlaybackItem>,
    stops: Vec<EndReason>,
    current: Option<PlaybackItem>,
    playing: bool,
    paused: bool,
    pending_end: Option<EndReason>,
    fail_next_start: bool,
}

/// Reproductor en memoria; nunca avisa el fin por sí mismo, el test lo hace
/// con [`FakePlayer::take_end`] o [`FakePlayer::finish_naturally`]
#[derive(Default)]
pub struct FakePlayer {
    state: Mutex<FakeState>,
}

impl FakePlayer {
    pub fn started(&self) -> Vec<PlaybackItem> {
        self.state.lock().started.clone()
    }

    pub fn stops(&self) -> Vec<EndReason> {
        self.state.lock().stops.clone()
    }

    /// Hace fallar el próximo `start_item`
    pub fn fail_next_start(&self) {
        self.state.lock().fail_next_start = true;
    }

    /// Simula que el track actual llegó a su fin
    pub fn finish_naturally(&self) {
        let mut st = self.state.lock();
        st.playing = false;
        st.paused = false;
        st.current = None;
        st.pending_end = None;
    }

    /// Motivo del fin pendiente tras un `stop_current`
    pub fn take_end(&self) -> Option<EndReason> {
        self.state.lock().pending_end.take()
    }
}

impl PlayerHandle for FakePlayer {
    fn start_item(&self, item: PlaybackItem) -> Result<(), PlayerError> {
        let mut st = self.state.lock();
        if st.fail_next_start {
            st.fail_next_start = false;
            return Err(PlayerError::NotConnected);
        }

        st.started.push(item.clone());
        st.current = Some(item);
        st.playing = true;
        st.paused = false;
        Ok(())
    }

    fn stop_current(&self, reason: EndReason) -> Result<(), PlayerError> {
        let mut st = self.state.lock();
        st.stops.push(reason);
        if st.playing {
            st.playing = false;
            st.paused = false;
            st.current = None;
            st.pending_end = Some(reason);
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn set_paused(&self, paused: bool) -> Result<(), PlayerError> {
        self.state.lock().paused = paused;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn current_item(&self) -> Option<PlaybackItem> {
        self.state.lock().current.clone()
    }
}

/// Resolver que se bloquea hasta que el test lo libera
pub struct GatedResolver {
    outcome: ResolveOutcome,
    called: Notify,
    released: Notify,
}

impl GatedResolver {
    pub fn new(outcome: ResolveOutcome) -> Self {
        Self {
            outcome,
            called: Notify::new(),
            released: Notify::new(),
        }
    }

    pub async fn wait_called(&self) {
        self.called.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl Resolver for GatedResolver {
    async fn resolve(&self, _query: &str) -> ResolveOutcome {
        self.called.notify_one();
        self.released.notified().await;
        self.outcome.clone()
    }
}
