use parking_lot::Mutex;
use std::{collections::VecDeque, fmt};
use tracing::{debug, info};

use crate::audio::channel::ChannelRef;

/// Unidad reproducible ya resuelta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackItem {
    pub title: String,
    pub author: String,
    pub source_locator: String,
}

impl PlaybackItem {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        source_locator: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            source_locator: source_locator.into(),
        }
    }

    /// Texto de una línea para listados
    pub fn display_line(&self) -> String {
        format!("{} - {}", self.title, self.author)
    }

    /// Consulta de búsqueda usada como semilla de autoplay
    pub fn autoplay_query(&self) -> String {
        format!("{} {}", self.title, self.author)
    }
}

impl fmt::Display for PlaybackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<PlaybackItem>,
    autoplay: bool,
    last_played: Option<PlaybackItem>,
    last_channel: Option<ChannelRef>,
}

/// Cola FIFO de un guild.
///
/// Cada operación es atómica por sí sola. Las secuencias que combinan la cola
/// con el reproductor se serializan en [`TrackScheduler`](super::scheduler::TrackScheduler).
#[derive(Default)]
pub struct GuildQueue {
    inner: Mutex<QueueState>,
}

impl GuildQueue {
    pub fn new(autoplay: bool) -> Self {
        Self {
            inner: Mutex::new(QueueState {
                autoplay,
                ..QueueState::default()
            }),
        }
    }

    /// Agrega un item al final de la cola
    pub fn enqueue(&self, item: PlaybackItem, channel: Option<ChannelRef>) {
        let mut q = self.inner.lock();
        info!("➕ Agregado a la cola: {}", item.title);
        q.pending.push_back(item);
        if let Some(channel) = channel {
            q.last_channel = Some(channel);
        }
    }

    /// Saca el siguiente item (FIFO)
    pub fn dequeue_next(&self) -> Option<PlaybackItem> {
        let next = self.inner.lock().pending.pop_front();
        match &next {
            Some(item) => debug!("➡️ Siguiente en cola: {}", item.title),
            None => debug!("📭 Cola vacía"),
        }
        next
    }

    /// Vacía la cola y devuelve cuántos items se descartaron
    pub fn clear(&self) -> usize {
        let mut q = self.inner.lock();
        let removed = q.pending.len();
        q.pending.clear();
        info!("🗑️ Cola limpiada ({} items)", removed);
        removed
    }

    /// Copia de los items pendientes
    pub fn list(&self) -> Vec<PlaybackItem> {
        self.inner.lock().pending.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    pub fn set_autoplay(&self, enabled: bool) {
        self.inner.lock().autoplay = enabled;
        if enabled {
            info!("📻 Autoplay activado");
        } else {
            info!("➡️ Autoplay desactivado");
        }
    }

    pub fn is_autoplay(&self) -> bool {
        self.inner.lock().autoplay
    }

    pub fn last_played(&self) -> Option<PlaybackItem> {
        self.inner.lock().last_played.clone()
    }

    pub(crate) fn record_played(&self, item: PlaybackItem) {
        self.inner.lock().last_played = Some(item);
    }

    pub fn last_channel(&self) -> Option<ChannelRef> {
        self.inner.lock().last_channel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::test_utils::RecordingChannel;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn item(title: &str) -> PlaybackItem {
        PlaybackItem::new(title, "artista", format!("https://youtu.be/{title}"))
    }

    #[test]
    fn test_fifo_order() {
        let queue = GuildQueue::default();
        queue.enqueue(item("a"), None);
        queue.enqueue(item("b"), None);
        queue.enqueue(item("c"), None);

        assert_eq!(queue.list(), vec![item("a"), item("b"), item("c")]);
        assert_eq!(queue.dequeue_next(), Some(item("a")));
        assert_eq!(queue.list(), vec![item("b"), item("c")]);
    }

    #[test]
    fn test_dequeue_empty_is_none() {
        let queue = GuildQueue::default();
        assert_eq!(queue.dequeue_next(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_keeps_last_played() {
        let queue = GuildQueue::default();
        queue.record_played(item("actual"));
        queue.enqueue(item("a"), None);
        queue.enqueue(item("b"), None);

        assert_eq!(queue.clear(), 2);
        assert!(queue.list().is_empty());
        assert_eq!(queue.last_played(), Some(item("actual")));
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let queue = GuildQueue::default();
        queue.enqueue(item("a"), None);
        let snapshot = queue.list();
        queue.clear();

        assert_eq!(snapshot, vec![item("a")]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_channel_only_replaced_when_supplied() {
        let queue = GuildQueue::default();
        let first: ChannelRef = Arc::new(RecordingChannel::default());
        queue.enqueue(item("a"), Some(first.clone()));
        queue.enqueue(item("b"), None);

        let stored = queue.last_channel().expect("canal registrado");
        assert!(Arc::ptr_eq(&stored, &first));

        let second: ChannelRef = Arc::new(RecordingChannel::default());
        queue.enqueue(item("c"), Some(second.clone()));
        assert!(Arc::ptr_eq(&queue.last_channel().unwrap(), &second));
    }

    #[test]
    fn test_autoplay_flag() {
        let queue = GuildQueue::new(true);
        assert!(queue.is_autoplay());
        queue.set_autoplay(false);
        assert!(!queue.is_autoplay());
    }

    #[test]
    fn test_autoplay_query_uses_title_and_author() {
        let seed = PlaybackItem::new("Song", "Band", "https://youtu.be/x");
        assert_eq!(seed.autoplay_query(), "Song Band");
        assert_eq!(seed.display_line(), "Song - Band");
    }
}
