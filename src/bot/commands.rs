use anyhow::Result;
use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{application::CommandOptionType, id::GuildId},
    prelude::Context,
};

/// Efectos de sonido disponibles: nombre visible y archivo dentro de `SFX_DIR`
pub const SFX_CHOICES: &[(&str, &str)] = &[("gsuck", "gsuck.mp3"), ("smbj", "smbj.mp3")];

/// Archivo del efecto, aceptando el nombre o el archivo
pub fn sfx_file(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    SFX_CHOICES
        .iter()
        .find(|(label, file)| *label == name || *file == name)
        .map(|(_, file)| *file)
}

fn all_commands() -> Vec<CreateCommand> {
    vec![
        join_command(),
        leave_command(),
        play_command(),
        stop_command(),
        skip_command(),
        queue_command(),
        clear_command(),
        pause_command(),
        resume_command(),
        sfx_command(),
        autoplay_command(),
    ]
}

/// Registra comandos globales
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    for command in all_commands() {
        ctx.http.create_global_command(&command).await?;
    }

    Ok(())
}

/// Registra comandos para una guild específica (desarrollo)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    guild_id.set_commands(&ctx.http, all_commands()).await?;

    Ok(())
}

// Comandos de reproducción

fn play_command() -> CreateCommand {
    CreateCommand::new("play")
        .description("Reproduce una canción o playlist")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "query",
                "URL o término de búsqueda",
            )
            .required(true)
            .set_autocomplete(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "autoplay",
            "Reproducir recomendaciones cuando la cola se vacíe",
        ))
}

fn sfx_command() -> CreateCommand {
    let mut option = CreateCommandOption::new(CommandOptionType::String, "name", "Efecto a reproducir")
        .required(true);
    for (label, file) in SFX_CHOICES {
        option = option.add_string_choice(*label, *file);
    }

    CreateCommand::new("sfx")
        .description("Reproduce un efecto de sonido local")
        .add_option(option)
}

// Comandos de control

fn pause_command() -> CreateCommand {
    CreateCommand::new("pause").description("Pausa la reproducción actual")
}

fn resume_command() -> CreateCommand {
    CreateCommand::new("resume").description("Reanuda la reproducción pausada")
}

fn skip_command() -> CreateCommand {
    CreateCommand::new("skip").description("Salta a la siguiente canción")
}

fn stop_command() -> CreateCommand {
    CreateCommand::new("stop").description("Detiene la reproducción y limpia la cola")
}

fn autoplay_command() -> CreateCommand {
    CreateCommand::new("autoplay")
        .description("Activa o desactiva el autoplay")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Boolean, "enabled", "Estado del autoplay")
                .required(true),
        )
}

// Comandos de cola

fn queue_command() -> CreateCommand {
    CreateCommand::new("queue").description("Muestra la cola de reproducción")
}

fn clear_command() -> CreateCommand {
    CreateCommand::new("clear").description("Limpia la cola (la canción actual sigue sonando)")
}

// Comandos de conexión

fn join_command() -> CreateCommand {
    CreateCommand::new("join").description("Une el bot a tu canal de voz")
}

fn leave_command() -> CreateCommand {
    CreateCommand::new("leave").description("Desconecta el bot del canal de voz")
}
