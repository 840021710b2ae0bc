use anyhow::Result;
use serenity::{
    builder::{
        CreateAutocompleteResponse, CreateInteractionResponse, CreateInteractionResponseMessage,
        EditInteractionResponse,
    },
    model::{application::CommandInteraction, channel::Message},
    prelude::Context,
};
use tracing::info;

use crate::bot::{text_commands::{self, TextCommand}, MusicBot};

/// Maneja comandos slash
pub async fn handle_command(ctx: &Context, command: CommandInteraction, bot: &MusicBot) -> Result<()> {
    let Some(guild_id) = command.guild_id else {
        return reply(ctx, &command, "❌ Este comando solo funciona dentro de un servidor", true).await;
    };

    info!(
        "📝 Comando /{} usado por {} en guild {}",
        command.data.name, command.user.name, guild_id
    );

    let user_id = command.user.id;
    let channel_id = command.channel_id;

    match command.data.name.as_str() {
        "join" => {
            defer(ctx, &command, true).await?;
            let text = bot.join(ctx, guild_id, user_id).await;
            edit(ctx, &command, text).await?;
        }
        "leave" => {
            let text = bot.leave(ctx, guild_id).await;
            reply(ctx, &command, &text, false).await?;
        }
        "play" => {
            let query = string_option(&command, "query").unwrap_or_default();
            let autoplay = bool_option(&command, "autoplay").unwrap_or(false);

            defer(ctx, &command, false).await?;
            let text = bot
                .play(ctx, guild_id, user_id, channel_id, &query, Some(autoplay))
                .await;
            edit(ctx, &command, text).await?;
        }
        "sfx" => {
            let name = string_option(&command, "name").unwrap_or_default();

            defer(ctx, &command, true).await?;
            let text = bot.play_sfx(ctx, guild_id, user_id, channel_id, &name).await;
            edit(ctx, &command, text).await?;
        }
        "stop" => reply(ctx, &command, &bot.stop(guild_id), true).await?,
        "skip" => reply(ctx, &command, &bot.skip(guild_id), true).await?,
        "queue" => reply(ctx, &command, &bot.queue(guild_id), true).await?,
        "clear" => reply(ctx, &command, &bot.clear(guild_id), false).await?,
        "pause" => reply(ctx, &command, &bot.set_paused(guild_id, true), true).await?,
        "resume" => reply(ctx, &command, &bot.set_paused(guild_id, false), true).await?,
        "autoplay" => {
            let enabled = bool_option(&command, "enabled").unwrap_or(false);
            reply(ctx, &command, &bot.set_autoplay(guild_id, enabled), false).await?;
        }
        _ => reply(ctx, &command, "❌ Comando no reconocido", true).await?,
    }

    Ok(())
}

/// Responde el autocompletado de `/play query`
pub async fn handle_autocomplete(
    ctx: &Context,
    interaction: CommandInteraction,
    bot: &MusicBot,
) -> Result<()> {
    let typed = match interaction.data.autocomplete() {
        Some(option)
            if interaction.guild_id.is_some()
                && interaction.data.name == "play"
                && option.name == "query" =>
        {
            option.value.to_string()
        }
        _ => String::new(),
    };

    let choices = bot.autocomplete().choices(&typed).await;

    let mut response = CreateAutocompleteResponse::new();
    for choice in choices {
        response = response.add_string_choice(choice.name, choice.value);
    }

    interaction
        .create_response(&ctx.http, CreateInteractionResponse::Autocomplete(response))
        .await?;

    Ok(())
}

/// Maneja los comandos de texto con prefijo `!`
pub async fn handle_message(ctx: &Context, msg: &Message, bot: &MusicBot) -> Result<()> {
    let Some(command) = text_commands::parse(&msg.content) else {
        return Ok(());
    };

    let Some(guild_id) = msg.guild_id else {
        msg.channel_id
            .say(&ctx.http, "❌ Este comando solo funciona dentro de un servidor")
            .await?;
        return Ok(());
    };

    info!("💬 Comando de texto {:?} de {} en guild {}", command, msg.author.name, guild_id);

    let user_id = msg.author.id;
    let channel_id = msg.channel_id;

    let text = match command {
        TextCommand::Join => bot.join(ctx, guild_id, user_id).await,
        TextCommand::Leave => bot.leave(ctx, guild_id).await,
        TextCommand::Play { query, autoplay } => {
            bot.play(ctx, guild_id, user_id, channel_id, &query, autoplay).await
        }
        TextCommand::Stop => bot.stop(guild_id),
        TextCommand::Skip => bot.skip(guild_id),
        TextCommand::List => bot.queue(guild_id),
        TextCommand::Clear => bot.clear(guild_id),
        TextCommand::Pause => bot.set_paused(guild_id, true),
        TextCommand::Resume => bot.set_paused(guild_id, false),
        TextCommand::Sfx { name } => bot.play_sfx(ctx, guild_id, user_id, channel_id, &name).await,
        TextCommand::Usage(usage) => usage.to_string(),
    };

    msg.channel_id.say(&ctx.http, text).await?;
    Ok(())
}

// Funciones auxiliares

fn string_option(command: &CommandInteraction, name: &str) -> Option<String> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_str())
        .map(str::to_string)
}

fn bool_option(command: &CommandInteraction, name: &str) -> Option<bool> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_bool())
}

async fn reply(ctx: &Context, command: &CommandInteraction, text: &str, ephemeral: bool) -> Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(ephemeral),
            ),
        )
        .await?;

    Ok(())
}

async fn defer(ctx: &Context, command: &CommandInteraction, ephemeral: bool) -> Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(ephemeral)),
        )
        .await?;

    Ok(())
}

async fn edit(ctx: &Context, command: &CommandInteraction, text: String) -> Result<()> {
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(text))
        .await?;

    Ok(())
}
