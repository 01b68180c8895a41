use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use engine::HeadlessRunner;
use env_logger::Env;
use log::info;

use tile2048::agent::{MergeAction, MergeGame};
use tile2048::moves::parse_moves;
use tile2048::persist;
use tile2048::settings::{PlayerSettings, SettingsStore};
use tile2048::{Direction, GameSession, SpawnMode, TurnOutcome};

#[derive(Debug, Parser)]
#[command(name = "tile2048")]
#[command(about = "Headless driver for the 2048 rule engine")]
struct Cli {
    /// Settings JSON (defaults to $XDG_CONFIG_HOME/tile2048/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    /// Spawn new tiles deterministically instead of randomly
    #[arg(long, default_value_t = false)]
    deterministic: bool,
    #[arg(long)]
    save_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read line commands from stdin (`h` lists them)
    Play,
    /// Start a new game, apply a move string such as `LLURD`, print the result
    Replay {
        moves: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print a save file as JSON
    Inspect { path: Option<PathBuf> },
    /// Print the resolved settings, optionally persisting them
    Config {
        #[arg(long, default_value_t = false)]
        write: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move(Direction),
    NewGame,
    Undo,
    Save,
    Load,
    Mode(SpawnMode),
    Print,
    Help,
    Quit,
}

const HELP: &str = "\
l/r/u/d    move left/right/up/down
n          new game
z          undo (up to three moves)
s / o      save / load
det / rand deterministic / random spawning
p          print board
q          quit";

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let store = cli
        .settings
        .clone()
        .map(SettingsStore::new)
        .unwrap_or_else(SettingsStore::from_env);
    let settings = apply_overrides(store.load(), &cli);
    info!("using settings from {}", store.path().display());

    match cli.command {
        Commands::Play => cmd_play(&settings),
        Commands::Replay { moves, json } => cmd_replay(&settings, &moves, json),
        Commands::Inspect { path } => {
            let path = path.unwrap_or_else(|| settings.storage.save_path.clone());
            cmd_inspect(&path)
        }
        Commands::Config { write } => cmd_config(&store, &settings, write),
    }
}

fn apply_overrides(mut settings: PlayerSettings, cli: &Cli) -> PlayerSettings {
    if cli.deterministic {
        settings.gameplay.spawn_mode = SpawnMode::Deterministic;
    }
    if let Some(seed) = cli.seed {
        settings.gameplay.seed = Some(seed);
    }
    if let Some(path) = &cli.save_path {
        settings.storage.save_path = path.clone();
    }
    settings
}

fn cmd_play(settings: &PlayerSettings) -> Result<()> {
    let mode = settings.gameplay.spawn_mode;
    let mut session = match settings.gameplay.seed {
        Some(seed) => GameSession::with_seed(mode, seed),
        None => GameSession::new(mode),
    };
    session.start_new_game(mode);

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    print_session(&mut out, &session, "")?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command from stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(command) = parse_command(trimmed) else {
            writeln!(out, "Unknown command `{trimmed}` (h for help).")?;
            continue;
        };
        if command == Command::Quit {
            break;
        }
        let message = run_command(&mut session, command, &settings.storage.save_path);
        print_session(&mut out, &session, &message)?;
    }
    Ok(())
}

fn run_command(session: &mut GameSession, command: Command, save_path: &Path) -> String {
    match command {
        Command::Move(dir) => match session.play_turn(dir) {
            TurnOutcome::GameOver => "Game over!".to_string(),
            TurnOutcome::Moved | TurnOutcome::Unchanged => String::new(),
        },
        Command::NewGame => {
            session.start_new_game(session.spawn_mode());
            String::new()
        }
        Command::Undo => {
            if session.undo() {
                String::new()
            } else {
                "No undos available.".to_string()
            }
        }
        Command::Save => {
            if session.save_to_file(save_path) {
                "Game saved.".to_string()
            } else {
                "Error saving game!".to_string()
            }
        }
        Command::Load => {
            if session.load_from_file(save_path) {
                "Game loaded.".to_string()
            } else {
                "Error loading game!".to_string()
            }
        }
        Command::Mode(SpawnMode::Deterministic) => {
            session.set_spawn_mode(SpawnMode::Deterministic);
            "New tiles spawn deterministically.".to_string()
        }
        Command::Mode(SpawnMode::Random) => {
            session.set_spawn_mode(SpawnMode::Random);
            "New tiles spawn randomly.".to_string()
        }
        Command::Help => HELP.to_string(),
        Command::Print | Command::Quit => String::new(),
    }
}

fn parse_command(text: &str) -> Option<Command> {
    let command = match text.to_ascii_lowercase().as_str() {
        "l" | "left" => Command::Move(Direction::Left),
        "r" | "right" => Command::Move(Direction::Right),
        "u" | "up" => Command::Move(Direction::Up),
        "d" | "down" => Command::Move(Direction::Down),
        "n" | "new" => Command::NewGame,
        "z" | "undo" => Command::Undo,
        "s" | "save" => Command::Save,
        "o" | "load" => Command::Load,
        "det" => Command::Mode(SpawnMode::Deterministic),
        "rand" => Command::Mode(SpawnMode::Random),
        "p" | "print" => Command::Print,
        "h" | "help" => Command::Help,
        "q" | "quit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn print_session(out: &mut impl Write, session: &GameSession, message: &str) -> Result<()> {
    write!(out, "{}", session.board())?;
    let status = if session.is_game_over() {
        " (game over)"
    } else {
        ""
    };
    writeln!(out, "score {}{status}", session.current_score())?;
    if !message.is_empty() {
        writeln!(out, "{message}")?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_replay(settings: &PlayerSettings, moves: &str, json: bool) -> Result<()> {
    let directions =
        parse_moves(moves).map_err(|bad| anyhow!("Invalid move `{bad}` in `{moves}`"))?;
    let seed = settings.gameplay.seed.unwrap_or(0);
    let mut runner = HeadlessRunner::new(MergeGame::new(seed, settings.gameplay.spawn_mode));
    runner.run(directions.into_iter().map(MergeAction::Move));

    let session = runner.into_state();
    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        print!("{}", session.board());
        println!("score {}", session.current_score());
        println!("sha256 {}", session.state_digest()?);
    }
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let state = persist::read_save_file(path)
        .with_context(|| format!("Failed to read save file {}", path.display()))?;
    let mut session = GameSession::with_seed(SpawnMode::default(), 0);
    session.restore(state);
    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    println!("sha256 {}", session.state_digest()?);
    Ok(())
}

fn cmd_config(store: &SettingsStore, settings: &PlayerSettings, write: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    if write {
        store
            .save(settings)
            .with_context(|| format!("Failed to write settings to {}", store.path().display()))?;
        info!("settings written to {}", store.path().display());
    }
    Ok(())
}
