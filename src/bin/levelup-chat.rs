//! Interactive terminal chat with the LevelUp AI gaming coach.
//!
//! This binary provides a streaming REPL on top of the levelup client
//! library. Conversation history is persisted to a local SQLite database,
//! scoped to the user id the session is signed in as.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage; endpoint settings come from the environment
//! LEVELUP_BASE_URL=https://backend.example.com \
//! LEVELUP_PUBLISHABLE_KEY=pk_... levelup-chat
//!
//! # Keep history across runs by fixing the user id
//! levelup-chat --user 3f9f9b0a-6a7e-4d0e-9a4e-7dbb0c4c6f01
//!
//! # Disable colors (useful for piping output)
//! levelup-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear the on-screen conversation
//! - `/history` - Reload persisted history
//! - `/profile` - Show your profile and tracked games
//! - `/quit` - Exit the application

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use uuid::Uuid;

use levelup::chat::{ChatArgs, ChatCommand, ChatConfig, help_text, parse_command};
use levelup::store::ProfileStore;
use levelup::{
    CoachClient, CoachSession, Notice, Notify, PlayerProfile, SUGGESTED_PROMPTS, SessionContext,
    SqliteStore, Turn, UserGame,
};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

/// Prints notices to stderr, red when colors are enabled.
struct StderrNotifier {
    use_color: bool,
}

impl Notify for StderrNotifier {
    fn notify(&mut self, notice: Notice) {
        if self.use_color {
            eprintln!("{ANSI_RED}{notice}{ANSI_RESET}");
        } else {
            eprintln!("{notice}");
        }
    }
}

/// Main entry point for the levelup-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("levelup-chat [OPTIONS]");
    let config = ChatConfig::resolve(args)?;
    let use_color = config.use_color;

    let client = CoachClient::new(config.coach.clone())?;
    let store = SqliteStore::connect(&config.db_path).await?;

    let user_id = match config.user {
        Some(user_id) => user_id,
        None => {
            let user_id = Uuid::new_v4();
            println!("Signed in as new user {user_id}");
            println!("Pass --user {user_id} next time to keep this history.\n");
            user_id
        }
    };
    let context = SessionContext::sign_in(user_id);
    let notifier = StderrNotifier { use_color };
    let mut session = CoachSession::new(client, store, notifier, context);

    session.load_history().await?;
    for turn in session.conversation().turns() {
        print_turn(turn, use_color);
    }
    if session.conversation().is_empty() {
        print_suggestions(use_color);
    }

    // Ctrl+C never aborts an in-flight stream; it requests an exit that
    // takes effect at the next prompt.
    let exit_requested = Arc::new(AtomicBool::new(false));
    let exit_handler = exit_requested.clone();
    ctrlc::set_handler(move || {
        exit_handler.store(true, Ordering::Relaxed);
    })?;

    let mut rl = DefaultEditor::new()?;

    loop {
        if exit_requested.load(Ordering::Relaxed) {
            println!("Goodbye!");
            break;
        }

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            print_info("Conversation cleared.", use_color);
                        }
                        ChatCommand::History => {
                            if let Err(err) = session.load_history().await {
                                print_error(&err.to_string(), use_color);
                            } else {
                                for turn in session.conversation().turns() {
                                    print_turn(turn, use_color);
                                }
                                if session.conversation().is_empty() {
                                    print_info("No saved history yet.", use_color);
                                }
                            }
                        }
                        ChatCommand::Suggest => {
                            print_suggestions(use_color);
                        }
                        ChatCommand::Profile => {
                            print_profile(&session).await;
                        }
                        ChatCommand::Setup(username) => {
                            let identity = session.context().identity();
                            let mut profile = match session.store().profile(identity).await {
                                Ok(profile) => profile.unwrap_or_default(),
                                Err(err) => {
                                    print_error(&err.to_string(), use_color);
                                    continue;
                                }
                            };
                            profile.username = username;
                            profile.setup_completed = true;
                            match session.store().upsert_profile(identity, &profile).await {
                                Ok(()) => print_info("Profile saved.", use_color),
                                Err(err) => print_error(&err.to_string(), use_color),
                            }
                        }
                        ChatCommand::AddGame(name) => {
                            let identity = session.context().identity();
                            let game = UserGame::new(name);
                            match session.store().add_game(identity, &game).await {
                                Ok(()) => {
                                    print_info(&format!("Now tracking {}.", game.game_name), use_color)
                                }
                                Err(err) => print_error(&err.to_string(), use_color),
                            }
                        }
                        ChatCommand::RemoveGame(name) => {
                            let identity = session.context().identity();
                            match session.store().remove_game(identity, &name).await {
                                Ok(()) => {
                                    print_info(&format!("No longer tracking {name}."), use_color)
                                }
                                Err(err) => print_error(&err.to_string(), use_color),
                            }
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {line}");
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            print_error(&message, use_color);
                        }
                    }
                    continue;
                }

                // Regular prompt - stream the coach's reply.
                println!("Coach:");
                let mut stdout = std::io::stdout();
                let result = session
                    .send(line, |delta| {
                        print!("{delta}");
                        let _ = stdout.flush();
                    })
                    .await;
                println!();
                // Failed exchanges already surfaced a notice via the
                // notifier; only busy rejections need printing here.
                if let Err(err) = result {
                    if err.is_busy() {
                        print_error(&err.to_string(), use_color);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                print_error(&format!("Input error: {err}"), use_color);
                break;
            }
        }
    }

    session.sign_out();
    Ok(())
}

fn print_turn(turn: &Turn, use_color: bool) {
    let speaker = if turn.is_user() { "You" } else { "Coach" };
    if use_color && turn.is_assistant() {
        println!("{ANSI_CYAN}{speaker}:{ANSI_RESET} {}", turn.content);
    } else {
        println!("{speaker}: {}", turn.content);
    }
}

fn print_suggestions(use_color: bool) {
    print_info("Try asking:", use_color);
    for prompt in SUGGESTED_PROMPTS {
        println!("    - {prompt}");
    }
}

async fn print_profile<T, N>(session: &CoachSession<T, SqliteStore, N>)
where
    T: levelup::ChatTransport,
    N: Notify,
{
    let identity = session.context().identity();
    match session.store().profile(identity).await {
        Ok(Some(profile)) => print_profile_fields(&profile),
        Ok(None) => println!("    No profile yet. Use /setup <username> to create one."),
        Err(err) => eprintln!("{err}"),
    }
    match session.store().games(identity).await {
        Ok(games) if games.is_empty() => println!("    No games tracked."),
        Ok(games) => {
            println!("    Games:");
            for game in games {
                if game.rank.is_empty() {
                    println!("      - {} ({} hours)", game.game_name, game.hours_played);
                } else {
                    println!(
                        "      - {} [{}] ({} hours)",
                        game.game_name, game.rank, game.hours_played
                    );
                }
            }
        }
        Err(err) => eprintln!("{err}"),
    }
}

fn print_profile_fields(profile: &PlayerProfile) {
    println!("    Username: {}", profile.username);
    if !profile.region.is_empty() {
        println!("    Region: {}", profile.region);
    }
    if !profile.playstyle.is_empty() {
        println!("    Playstyle: {}", profile.playstyle);
    }
    if !profile.main_role.is_empty() {
        println!("    Main role: {}", profile.main_role);
    }
    println!(
        "    Setup: {}",
        if profile.setup_completed {
            "complete"
        } else {
            "incomplete"
        }
    );
}

fn print_info(info: &str, use_color: bool) {
    if use_color {
        println!("{ANSI_DIM}{info}{ANSI_RESET}");
    } else {
        println!("{info}");
    }
}

fn print_error(error: &str, use_color: bool) {
    if use_color {
        eprintln!("{ANSI_RED}{error}{ANSI_RESET}");
    } else {
        eprintln!("{error}");
    }
}
