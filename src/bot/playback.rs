//! Flujo compartido entre comandos slash y de texto: qué hacer con el
//! resultado de una búsqueda y cómo responderle al usuario.

use tracing::info;

use crate::{
    audio::{ChannelRef, EnqueueOutcome, PauseOutcome, PlaybackItem, TrackScheduler},
    sources::{is_url, ResolveOutcome},
};

/// Consulta que se entrega al resolver: las URLs pasan tal cual
pub fn build_query(input: &str) -> String {
    let input = input.trim();
    if is_url(input) {
        input.to_string()
    } else {
        input.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Encola el resultado de una búsqueda y devuelve la respuesta para el usuario
pub fn apply_resolved(
    scheduler: &TrackScheduler,
    outcome: ResolveOutcome,
    channel: ChannelRef,
    query: &str,
) -> String {
    match outcome {
        ResolveOutcome::Single(item) => {
            let title = item.title.clone();
            match scheduler.enqueue(item, Some(channel)) {
                EnqueueOutcome::Started(started) => format!("▶️ Reproduciendo: {}", started.title),
                EnqueueOutcome::Queued { position } => {
                    format!("➕ Agregado a la cola (#{}): {}", position, title)
                }
                EnqueueOutcome::PlayerFailed => format!("❌ No se pudo reproducir {}", title),
            }
        }
        ResolveOutcome::Multiple(items) => {
            let total = items.len();
            info!("📋 Agregando {} canciones a la cola", total);
            for item in items {
                scheduler.enqueue(item, Some(channel.clone()));
            }
            format!("📋 Agregadas {} canciones a la cola", total)
        }
        ResolveOutcome::NoMatch => format!("❌ No se encontraron resultados para: {}", query),
        ResolveOutcome::Failure(reason) => format!("❌ No se pudo cargar: {}", reason),
    }
}

pub fn pause_reply(outcome: PauseOutcome, paused: bool) -> &'static str {
    match (outcome, paused) {
        (PauseOutcome::NothingPlaying, true) => "⏸️ No hay nada reproduciéndose",
        (PauseOutcome::NothingPlaying, false) => "▶️ No hay nada para reanudar",
        (PauseOutcome::AlreadyInState, true) => "⚠️ La reproducción ya está pausada",
        (PauseOutcome::AlreadyInState, false) => "⚠️ La reproducción no está pausada",
        (PauseOutcome::Changed, true) => "⏸️ Reproducción pausada",
        (PauseOutcome::Changed, false) => "▶️ Reproducción reanudada",
    }
}

/// Texto de la cola, mostrando como máximo `limit` entradas
pub fn format_queue(now_playing: Option<&PlaybackItem>, pending: &[PlaybackItem], limit: usize) -> String {
    let mut lines = Vec::new();

    if let Some(current) = now_playing {
        lines.push(format!("🎵 Sonando: {}", current.display_line()));
    }

    if pending.is_empty() {
        lines.push("📭 La cola está vacía".to_string());
        return lines.join("\n");
    }

    lines.push(format!("🎶 En cola ({}):", pending.len()));
    lines.extend(
        pending
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item.display_line())),
    );

    if pending.len() > limit {
        lines.push(format!("… y {} más", pending.len() - limit));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{
            test_utils::{FakePlayer, RecordingChannel},
            GuildQueue,
        },
        sources::MockResolver,
    };
    use pretty_assertions::assert_eq;
    use serenity::model::id::GuildId;
    use std::sync::Arc;

    fn item(title: &str) -> PlaybackItem {
        PlaybackItem::new(title, "autor", format!("https://youtu.be/{title}"))
    }

    fn scheduler(player: Arc<FakePlayer>) -> TrackScheduler {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().never();
        TrackScheduler::new(
            GuildId::new(1),
            Arc::new(GuildQueue::new(false)),
            player,
            Arc::new(resolver),
        )
    }

    #[test]
    fn test_build_query() {
        assert_eq!(build_query(" https://youtu.be/x "), "https://youtu.be/x");
        assert_eq!(build_query("  lofi   hip hop "), "lofi hip hop");
    }

    #[test]
    fn test_single_result_starts_or_queues() {
        let player = Arc::new(FakePlayer::default());
        let scheduler = scheduler(player.clone());
        let channel: ChannelRef = Arc::new(RecordingChannel::default());

        let first = apply_resolved(&scheduler, ResolveOutcome::Single(item("a")), channel.clone(), "a");
        let second = apply_resolved(&scheduler, ResolveOutcome::Single(item("b")), channel, "b");

        assert_eq!(first, "▶️ Reproduciendo: a");
        assert_eq!(second, "➕ Agregado a la cola (#1): b");
        assert_eq!(player.started(), vec![item("a")]);
    }

    #[test]
    fn test_started_reply_names_the_item_that_started() {
        let player = Arc::new(FakePlayer::default());
        let scheduler = scheduler(player.clone());
        let channel: ChannelRef = Arc::new(RecordingChannel::default());

        // quedó "pendiente" en cola tras un arranque fallido
        player.fail_next_start();
        scheduler.enqueue(item("falla"), None);
        scheduler.queue().enqueue(item("pendiente"), None);

        let reply = apply_resolved(&scheduler, ResolveOutcome::Single(item("nueva")), channel, "nueva");

        assert_eq!(reply, "▶️ Reproduciendo: pendiente");
        assert_eq!(player.started(), vec![item("pendiente")]);
        assert_eq!(scheduler.queue().list(), vec![item("nueva")]);
    }

    #[test]
    fn test_multiple_results_enqueue_in_order() {
        let player = Arc::new(FakePlayer::default());
        let scheduler = scheduler(player.clone());
        let channel: ChannelRef = Arc::new(RecordingChannel::default());

        let reply = apply_resolved(
            &scheduler,
            ResolveOutcome::Multiple(vec![item("a"), item("b"), item("c")]),
            channel,
            "playlist",
        );

        assert_eq!(reply, "📋 Agregadas 3 canciones a la cola");
        assert_eq!(player.started(), vec![item("a")]);
        assert_eq!(scheduler.queue().list(), vec![item("b"), item("c")]);
    }

    #[test]
    fn test_no_match_and_failure_leave_queue_alone() {
        let player = Arc::new(FakePlayer::default());
        let scheduler = scheduler(player.clone());
        let channel: ChannelRef = Arc::new(RecordingChannel::default());

        let reply = apply_resolved(&scheduler, ResolveOutcome::NoMatch, channel.clone(), "zzz");
        assert_eq!(reply, "❌ No se encontraron resultados para: zzz");

        let reply = apply_resolved(&scheduler, ResolveOutcome::Failure("timeout".into()), channel, "zzz");
        assert_eq!(reply, "❌ No se pudo cargar: timeout");

        assert!(player.started().is_empty());
        assert!(scheduler.queue().is_empty());
        assert!(scheduler.queue().last_channel().is_none());
    }

    #[test]
    fn test_format_queue() {
        let pending = vec![item("a"), item("b"), item("c")];

        assert_eq!(
            format_queue(Some(&item("x")), &pending, 2),
            "🎵 Sonando: x - autor\n🎶 En cola (3):\n1. a - autor\n2. b - autor\n… y 1 más"
        );
        assert_eq!(format_queue(None, &[], 30), "📭 La cola está vacía");
    }

    #[test]
    fn test_pause_replies_are_distinct() {
        let outcomes = [PauseOutcome::NothingPlaying, PauseOutcome::AlreadyInState, PauseOutcome::Changed];
        let mut replies: Vec<&str> = outcomes
            .iter()
            .flat_map(|o| [pause_reply(*o, true), pause_reply(*o, false)])
            .collect();
        replies.sort();
        replies.dedup();

        assert_eq!(replies.len(), 6);
    }
}
