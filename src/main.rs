use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

use music_gateway::{
    active::ActiveSwitch,
    audio::{SessionRegistry, SongbirdPlayerFactory},
    bot::{search::AutocompleteSearch, verify_dependencies, MusicBot},
    config::Config,
    health,
    sources::YtDlpResolver,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("music_gateway=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Music Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;
    let switch = ActiveSwitch::from_config(&config);

    // Manejar health check si es necesario
    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check(&switch);
    }

    info!("{}", config.summary());

    // Health check HTTP durante toda la vida del proceso
    let health_switch = switch.clone();
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(health_switch, health_port).await {
            error!("❌ Servidor de health check detenido: {:?}", e);
        }
    });

    if let Err(e) = verify_dependencies().await {
        warn!("⚠️ Dependencias externas no disponibles: {:?}", e);
    }

    let config = Arc::new(config);
    let resolver = Arc::new(YtDlpResolver::new());
    let songbird = Songbird::serenity();

    let registry = Arc::new(SessionRegistry::new(
        resolver.clone(),
        Arc::new(SongbirdPlayerFactory::new(songbird.clone())),
        config.default_autoplay,
    ));
    let autocomplete = Arc::new(AutocompleteSearch::new(
        resolver.clone(),
        Duration::from_secs(config.autocomplete_ttl_secs),
        config.autocomplete_limit,
    ));

    // Configurar intents mínimos necesarios
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    // Crear handler del bot
    let handler = MusicBot::new(config.clone(), switch, registry, resolver, autocomplete);

    // Construir cliente
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    // Manejar shutdown graceful
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error al registrar Ctrl+C: {:?}", e);
            return;
        }
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        shard_manager.shutdown_all().await;
    });

    // Iniciar bot
    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}

/// Imprime el estado en JSON; falla si la instancia todavía no está lista
fn health_check(switch: &ActiveSwitch) -> Result<()> {
    let report = switch.health();
    println!("{}", serde_json::to_string(&report)?);

    if !report.ready {
        anyhow::bail!("La instancia {} todavía no está lista", report.color);
    }

    Ok(())
}
