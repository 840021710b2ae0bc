use crate::bot::commands::SFX_CHOICES;

/// Prefijo de los comandos de texto
pub const PREFIX: char = '!';

/// Comando de texto ya interpretado
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    Join,
    Leave,
    Play { query: String, autoplay: Option<bool> },
    Stop,
    Skip,
    List,
    Clear,
    Pause,
    Resume,
    Sfx { name: String },
    /// Comando conocido con argumentos inválidos
    Usage(&'static str),
}

/// Alias coreanos que funcionan sin prefijo
const BARE_ALIASES: &[(&str, &str)] = &[
    ("들어와", "join"),
    ("나와", "join"),
    ("퇴장", "leave"),
    ("나가", "leave"),
    ("노래", "play"),
    ("정지", "stop"),
    ("스킵", "skip"),
];

/// Interpreta un mensaje; `None` si no es un comando del bot
pub fn parse(content: &str) -> Option<TextCommand> {
    let content = content.trim();

    let (name, args) = match content.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (content, ""),
    };

    let name = match name.strip_prefix(PREFIX) {
        Some(name) => name.to_lowercase(),
        None => BARE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| canonical.to_string())?,
    };

    let command = match name.as_str() {
        "join" => TextCommand::Join,
        "leave" => TextCommand::Leave,
        "play" => parse_play(args),
        "stop" => TextCommand::Stop,
        "skip" => TextCommand::Skip,
        "list" => TextCommand::List,
        "clear" => TextCommand::Clear,
        "pause" => TextCommand::Pause,
        "resume" => TextCommand::Resume,
        "sfx" if args.is_empty() => TextCommand::Usage("❗ Uso: `!sfx <nombre>`"),
        "sfx" => TextCommand::Sfx {
            name: args.to_string(),
        },
        // `!gsuck`, `!smbj`
        sfx if SFX_CHOICES.iter().any(|(label, _)| *label == sfx) => TextCommand::Sfx {
            name: sfx.to_string(),
        },
        _ => return None,
    };

    Some(command)
}

fn parse_play(args: &str) -> TextCommand {
    let mut autoplay = None;
    let words: Vec<&str> = args
        .split_whitespace()
        .filter(|word| {
            if *word == "-l" {
                autoplay = Some(true);
                false
            } else {
                true
            }
        })
        .collect();

    if words.is_empty() {
        return TextCommand::Usage("❗ Uso: `!play <búsqueda o URL> [-l]`");
    }

    TextCommand::Play {
        query: words.join(" "),
        autoplay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("!join"), Some(TextCommand::Join));
        assert_eq!(parse("  !LEAVE  "), Some(TextCommand::Leave));
        assert_eq!(parse("!stop"), Some(TextCommand::Stop));
        assert_eq!(parse("!skip"), Some(TextCommand::Skip));
        assert_eq!(parse("!list"), Some(TextCommand::List));
        assert_eq!(parse("!clear"), Some(TextCommand::Clear));
        assert_eq!(parse("!pause"), Some(TextCommand::Pause));
        assert_eq!(parse("!resume"), Some(TextCommand::Resume));
    }

    #[test]
    fn test_play_with_query() {
        assert_eq!(
            parse("!play never gonna   give you up"),
            Some(TextCommand::Play {
                query: "never gonna give you up".to_string(),
                autoplay: None,
            })
        );
        assert_eq!(
            parse("!play https://youtu.be/dQw4w9WgXcQ"),
            Some(TextCommand::Play {
                query: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                autoplay: None,
            })
        );
    }

    #[test]
    fn test_play_autoplay_flag() {
        assert_eq!(
            parse("!play -l lofi beats"),
            Some(TextCommand::Play {
                query: "lofi beats".to_string(),
                autoplay: Some(true),
            })
        );
        assert_eq!(
            parse("!play lofi beats -l"),
            Some(TextCommand::Play {
                query: "lofi beats".to_string(),
                autoplay: Some(true),
            })
        );
    }

    #[test]
    fn test_play_without_query_is_usage() {
        assert!(matches!(parse("!play"), Some(TextCommand::Usage(_))));
        assert!(matches!(parse("!play -l"), Some(TextCommand::Usage(_))));
    }

    #[test]
    fn test_sfx() {
        assert_eq!(
            parse("!sfx gsuck"),
            Some(TextCommand::Sfx {
                name: "gsuck".to_string()
            })
        );
        assert!(matches!(parse("!sfx"), Some(TextCommand::Usage(_))));
    }

    #[test]
    fn test_sfx_shortcuts() {
        assert_eq!(
            parse("!gsuck"),
            Some(TextCommand::Sfx {
                name: "gsuck".to_string()
            })
        );
        assert_eq!(
            parse("!SMBJ"),
            Some(TextCommand::Sfx {
                name: "smbj".to_string()
            })
        );
    }

    #[test]
    fn test_bare_aliases() {
        assert_eq!(parse("들어와"), Some(TextCommand::Join));
        assert_eq!(parse("나와"), Some(TextCommand::Join));
        assert_eq!(parse("퇴장"), Some(TextCommand::Leave));
        assert_eq!(parse("나가"), Some(TextCommand::Leave));
        assert_eq!(parse("정지"), Some(TextCommand::Stop));
        assert_eq!(parse("스킵"), Some(TextCommand::Skip));
        assert_eq!(
            parse("노래 아이유 -l"),
            Some(TextCommand::Play {
                query: "아이유".to_string(),
                autoplay: Some(true),
            })
        );
        assert!(matches!(parse("노래"), Some(TextCommand::Usage(_))));
        // sólo la primera palabra cuenta como alias
        assert_eq!(parse("hola 노래"), None);
    }

    #[test]
    fn test_non_commands_are_ignored() {
        assert_eq!(parse("hola"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("!"), None);
        assert_eq!(parse("!desconocido"), None);
        assert_eq!(parse("play algo"), None);
    }
}
