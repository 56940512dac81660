//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session without sending a prompt to the
//! coach.

/// A parsed chat command.
///
/// These commands control the chat session and are never sent to the coach
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Clear the in-memory conversation.
    Clear,

    /// Reload and display the persisted conversation history.
    History,

    /// Show the canned prompt suggestions.
    Suggest,

    /// Show the player profile and tracked games.
    Profile,

    /// Save the profile with the given username and mark setup complete.
    Setup(String),

    /// Track a game on the profile.
    AddGame(String),

    /// Stop tracking a game.
    RemoveGame(String),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be sent to the coach as a prompt.
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "history" => ChatCommand::History,
        "suggest" => ChatCommand::Suggest,
        "profile" => ChatCommand::Profile,
        "setup" => match argument {
            Some(username) => ChatCommand::Setup(username.to_string()),
            None => ChatCommand::Invalid("/setup requires a username".to_string()),
        },
        "game" => parse_game_command(argument),
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        other => ChatCommand::Invalid(format!("unknown command: /{other}")),
    };

    Some(result)
}

fn parse_game_command(argument: Option<&str>) -> ChatCommand {
    let Some(argument) = argument else {
        return ChatCommand::Invalid("/game requires 'add <name>' or 'remove <name>'".to_string());
    };
    let mut parts = argument.splitn(2, ' ');
    let action = parts.next().unwrap_or_default().to_lowercase();
    let name = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match (action.as_str(), name) {
        ("add", Some(name)) => ChatCommand::AddGame(name.to_string()),
        ("remove", Some(name)) => ChatCommand::RemoveGame(name.to_string()),
        ("add" | "remove", None) => {
            ChatCommand::Invalid("/game add|remove requires a game name".to_string())
        }
        _ => ChatCommand::Invalid("/game requires 'add <name>' or 'remove <name>'".to_string()),
    }
}

/// Returns the help text describing all commands.
pub fn help_text() -> &'static str {
    "Available commands:\n\
     /help, /?            Show this help\n\
     /clear               Clear the on-screen conversation\n\
     /history             Reload the persisted conversation history\n\
     /suggest             Show suggested questions\n\
     /profile             Show your profile and tracked games\n\
     /setup <username>    Save your profile username\n\
     /game add <name>     Track a game on your profile\n\
     /game remove <name>  Stop tracking a game\n\
     /quit, /exit, /q     Exit"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_input_is_not_a_command() {
        assert!(parse_command("How do I rank up?").is_none());
        assert!(parse_command("  plain text  ").is_none());
    }

    #[test]
    fn simple_commands_parse() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/suggest"), Some(ChatCommand::Suggest));
        assert_eq!(parse_command("/profile"), Some(ChatCommand::Profile));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/Quit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn setup_takes_a_username() {
        assert_eq!(
            parse_command("/setup clutch_or_kick"),
            Some(ChatCommand::Setup("clutch_or_kick".to_string()))
        );
        assert!(matches!(
            parse_command("/setup"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn game_subcommands_parse() {
        assert_eq!(
            parse_command("/game add Apex Legends"),
            Some(ChatCommand::AddGame("Apex Legends".to_string()))
        );
        assert_eq!(
            parse_command("/game remove Valorant"),
            Some(ChatCommand::RemoveGame("Valorant".to_string()))
        );
        assert!(matches!(
            parse_command("/game"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/game add"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/game rename Valorant"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn unknown_commands_are_invalid() {
        assert!(matches!(
            parse_command("/model haiku"),
            Some(ChatCommand::Invalid(_))
        ));
    }
}
