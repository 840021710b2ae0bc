//! # Bot Module
//!
//! Discord-facing side of the music gateway.
//!
//! - [`MusicBot`] implements Serenity's [`EventHandler`] and owns the
//!   [`SessionRegistry`], the resolver and the autocomplete search.
//! - Every event except `ready` is dropped while this instance is on standby
//!   (see [`ActiveSwitch`]).
//! - Slash commands ([`handlers`]) and `!` text commands ([`text_commands`])
//!   share the same operations, so both surfaces behave identically.

use anyhow::Result;
use serenity::{
    all::{ChannelId, Context, EventHandler, GuildId, Interaction, Message, Ready, UserId},
    async_trait,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, error, info, warn};

pub mod commands;
pub mod handlers;
pub mod playback;
pub mod search;
pub mod text_commands;

use crate::{
    active::ActiveSwitch,
    audio::{PlaybackItem, SessionRegistry, TextChannelRef},
    config::Config,
    sources::Resolver,
};
use search::AutocompleteSearch;

/// Main Discord bot handler.
///
/// All fields are shared (`Arc`) or internally synchronized, so the handler
/// can serve events from every shard concurrently.
pub struct MusicBot {
    config: Arc<Config>,
    switch: ActiveSwitch,
    registry: Arc<SessionRegistry>,
    resolver: Arc<dyn Resolver>,
    autocomplete: Arc<AutocompleteSearch>,
    maintenance_started: AtomicBool,
}

impl MusicBot {
    pub fn new(
        config: Arc<Config>,
        switch: ActiveSwitch,
        registry: Arc<SessionRegistry>,
        resolver: Arc<dyn Resolver>,
        autocomplete: Arc<AutocompleteSearch>,
    ) -> Self {
        Self {
            config,
            switch,
            registry,
            resolver,
            autocomplete,
            maintenance_started: AtomicBool::new(false),
        }
    }

    pub fn autocomplete(&self) -> &AutocompleteSearch {
        &self.autocomplete
    }

    /// Registers slash commands with Discord.
    ///
    /// Uses the development guild when `DISCORD_DEV_GUILD_ID` is set (commands
    /// show up within seconds); otherwise registers them globally.
    async fn register_commands(&self, ctx: &Context) -> Result<()> {
        info!("📝 Registrando comandos slash...");

        match self.config.dev_guild_id {
            Some(guild_id) => {
                let guild_id = GuildId::new(guild_id);
                info!("🏠 Registrando comandos para guild específica: {}", guild_id);
                commands::register_guild_commands(ctx, guild_id).await?;
                info!("✅ Comandos de guild registrados para: {}", guild_id);
            }
            None => {
                info!("🌐 Registrando comandos globalmente");
                commands::register_global_commands(ctx).await?;
                info!("✅ Comandos globales registrados");
            }
        }

        Ok(())
    }

    /// Conecta el bot al canal de voz del usuario
    pub async fn join(&self, ctx: &Context, guild_id: GuildId, user_id: UserId) -> String {
        let channel_id = match user_voice_channel(ctx, guild_id, user_id) {
            Some(channel_id) => channel_id,
            None => return "⚠️ Primero entra a un canal de voz".to_string(),
        };

        match self.join_voice_channel(ctx, guild_id, channel_id).await {
            Ok(()) => "🔊 Conectado al canal de voz".to_string(),
            Err(e) => {
                error!("❌ Error al conectar en guild {}: {:?}", guild_id, e);
                format!("❌ No se pudo entrar al canal de voz: {}", e)
            }
        }
    }

    pub async fn leave(&self, ctx: &Context, guild_id: GuildId) -> String {
        let manager = match songbird::get(ctx).await {
            Some(manager) => manager,
            None => return "❌ Songbird no inicializado".to_string(),
        };

        if manager.get(guild_id).is_none() {
            return "⚠️ El bot no está en un canal de voz".to_string();
        }

        if let Some(session) = self.registry.get(guild_id) {
            session.scheduler.stop_all();
        }

        match manager.remove(guild_id).await {
            Ok(()) => {
                info!("👋 Desconectado del canal de voz en guild {}", guild_id);
                "👋 Desconectado del canal de voz".to_string()
            }
            Err(e) => {
                error!("❌ Error al desconectar en guild {}: {:?}", guild_id, e);
                format!("❌ Error al salir del canal de voz: {}", e)
            }
        }
    }

    /// Busca `input` y lo agrega a la cola del guild
    pub async fn play(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
        text_channel: ChannelId,
        input: &str,
        autoplay: Option<bool>,
    ) -> String {
        let query = playback::build_query(input);
        if query.is_empty() {
            return "❗ Uso: `/play query:<búsqueda o URL>`".to_string();
        }

        if let Some(reply) = self.ensure_voice(ctx, guild_id, user_id).await {
            return reply;
        }

        let session = self.registry.get_or_create(guild_id);
        if let Some(enabled) = autoplay {
            session.scheduler.set_autoplay(enabled);
        }

        let outcome = self.resolver.resolve(&query).await;
        let channel = TextChannelRef::shared(ctx.http.clone(), text_channel);
        playback::apply_resolved(&session.scheduler, outcome, channel, &query)
    }

    /// Encola un efecto de sonido local
    pub async fn play_sfx(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
        text_channel: ChannelId,
        name: &str,
    ) -> String {
        let file = match commands::sfx_file(name) {
            Some(file) => file,
            None => return format!("❌ Efecto desconocido: {}", name),
        };

        if let Some(reply) = self.ensure_voice(ctx, guild_id, user_id).await {
            return reply;
        }

        let path = self.config.sfx_dir.join(file);
        let item = PlaybackItem::new(name.trim(), "SFX", path.to_string_lossy());
        let session = self.registry.get_or_create(guild_id);
        let channel = TextChannelRef::shared(ctx.http.clone(), text_channel);
        session.scheduler.enqueue(item, Some(channel));

        format!("🔊 Efecto de sonido: {}", file)
    }

    pub fn stop(&self, guild_id: GuildId) -> String {
        self.registry.get_or_create(guild_id).scheduler.stop_all();
        "⏹️ Reproducción detenida y cola limpiada".to_string()
    }

    pub fn skip(&self, guild_id: GuildId) -> String {
        if self.registry.get_or_create(guild_id).scheduler.skip() {
            "⏭️ Canción saltada".to_string()
        } else {
            "⚠️ No hay nada para saltar".to_string()
        }
    }

    pub fn clear(&self, guild_id: GuildId) -> String {
        let removed = self.registry.get_or_create(guild_id).scheduler.clear();
        format!("🧹 Cola limpiada ({} canciones)", removed)
    }

    pub fn queue(&self, guild_id: GuildId) -> String {
        let session = self.registry.get_or_create(guild_id);
        let now_playing = session.scheduler.now_playing();
        let pending = session.queue.list();
        playback::format_queue(now_playing.as_ref(), &pending, self.config.queue_display_limit)
    }

    pub fn set_paused(&self, guild_id: GuildId, paused: bool) -> String {
        let outcome = self.registry.get_or_create(guild_id).scheduler.set_paused(paused);
        playback::pause_reply(outcome, paused).to_string()
    }

    pub fn set_autoplay(&self, guild_id: GuildId, enabled: bool) -> String {
        self.registry.get_or_create(guild_id).scheduler.set_autoplay(enabled);
        if enabled {
            "📻 Autoplay activado".to_string()
        } else {
            "📻 Autoplay desactivado".to_string()
        }
    }

    /// Se une al canal del usuario si hace falta; devuelve la respuesta de error
    async fn ensure_voice(&self, ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<String> {
        let channel_id = match user_voice_channel(ctx, guild_id, user_id) {
            Some(channel_id) => channel_id,
            None => return Some("⚠️ Primero entra a un canal de voz".to_string()),
        };

        match self.join_voice_channel(ctx, guild_id, channel_id).await {
            Ok(()) => None,
            Err(e) => {
                error!("❌ Error al conectar en guild {}: {:?}", guild_id, e);
                Some(format!("❌ No se pudo entrar al canal de voz: {}", e))
            }
        }
    }

    /// Connects (or moves) the bot to a voice channel.
    async fn join_voice_channel(
        &self,
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<()> {
        let manager = songbird::get(ctx)
            .await
            .ok_or_else(|| anyhow::anyhow!("Songbird no inicializado"))?;

        if let Some(call) = manager.get(guild_id) {
            let current = call.lock().await.current_channel();
            if current.map(|c| c.0.get()) == Some(channel_id.get()) {
                return Ok(());
            }
        }

        manager.join(guild_id, channel_id).await?;
        info!("🔊 Conectado al canal de voz en guild {}", guild_id);
        Ok(())
    }
}

/// Canal de voz en el que está el usuario, según la caché
fn user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = guild_id.to_guild_cached(&ctx.cache)?;
    let channel_id = guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id);
    channel_id
}

#[async_trait]
impl EventHandler for MusicBot {
    /// Always handled, even on standby, so both colors keep their commands registered.
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea! (color {})", ready.user.name, self.switch.color());
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("Error al registrar comandos: {:?}", e);
        }

        self.switch.mark_ready();

        if !self.maintenance_started.swap(true, Ordering::SeqCst) {
            let autocomplete = self.autocomplete.clone();
            tokio::spawn(async move {
                maintenance_tasks(autocomplete).await;
            });
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if !self.switch.is_active() {
            debug!("💤 Instancia en espera, interacción ignorada");
            return;
        }

        match interaction {
            Interaction::Command(command) => {
                if let Err(e) = handlers::handle_command(&ctx, command, self).await {
                    error!("Error manejando comando: {:?}", e);
                }
            }
            Interaction::Autocomplete(autocomplete) => {
                if let Err(e) = handlers::handle_autocomplete(&ctx, autocomplete, self).await {
                    // la interacción pudo expirar; no hay a quién avisar
                    debug!("Autocompletado sin respuesta: {:?}", e);
                }
            }
            _ => {}
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !self.switch.is_active() {
            return;
        }

        if let Err(e) = handlers::handle_message(&ctx, &msg, self).await {
            error!("Error manejando mensaje: {:?}", e);
        }
    }
}

/// Runs periodic maintenance tasks in the background.
///
/// Every hour: purges expired autocomplete entries and checks that `yt-dlp`
/// is still callable.
async fn maintenance_tasks(autocomplete: Arc<AutocompleteSearch>) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600)); // Cada hora

    loop {
        interval.tick().await;

        let removed = autocomplete.cache().cleanup_expired();
        debug!("🧹 {} sugerencias expiradas eliminadas", removed);

        if let Err(e) = verify_dependencies().await {
            warn!("Error verificando dependencias: {:?}", e);
        }

        info!("🧹 Tareas de mantenimiento completadas");
    }
}

/// Verifica que yt-dlp y ffmpeg respondan
pub async fn verify_dependencies() -> Result<()> {
    let yt_dlp = async_process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .await?;

    let ffmpeg = async_process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await?;

    if yt_dlp.status.success() && ffmpeg.status.success() {
        Ok(())
    } else {
        anyhow::bail!("Dependencias faltantes");
    }
}
