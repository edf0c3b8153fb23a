mod console;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use env_logger::Env;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use hub_core::config::DEFAULT_STAGE_COUNT;
use hub_core::model::StageIndex;
use hub_core::unlock::{SelectOutcome, UnlockOutcome};
use hub_core::{Clock, HubConfig, TurnConfig};
use services::{
    DEFAULT_TICK_INTERVAL, HubPresenter, ProgressionService, SeededRandom, SessionCommand,
    SessionController, SessionDriver, SessionOutcome,
};
use storage::Storage;

use crate::console::ConsolePresenter;

const DEFAULT_SNAPSHOT_PATH: &str = "GameData.json";

#[derive(Debug, Clone)]
struct Args {
    snapshot: PathBuf,
    stage_count: usize,
    seed: Option<u64>,
    tick: Duration,
    in_memory: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidStages { raw: String },
    InvalidSeed { raw: String },
    InvalidTickMs { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStages { raw } => write!(f, "invalid --stages value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidTickMs { raw } => write!(f, "invalid --tick-ms value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_stages(raw: &str) -> Result<usize, ArgsError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| ArgsError::InvalidStages { raw: raw.to_owned() })
}

fn parse_seed(raw: &str) -> Result<u64, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ArgsError::InvalidSeed { raw: raw.to_owned() })
}

fn parse_tick_ms(raw: &str) -> Result<Duration, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| ArgsError::InvalidTickMs { raw: raw.to_owned() })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut snapshot = std::env::var("HUB_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_PATH));
        let mut stage_count = match std::env::var("HUB_STAGE_COUNT") {
            Ok(raw) => parse_stages(&raw)?,
            Err(_) => DEFAULT_STAGE_COUNT,
        };
        let mut seed = match std::env::var("HUB_SEED") {
            Ok(raw) => Some(parse_seed(&raw)?),
            Err(_) => None,
        };
        let mut tick = match std::env::var("HUB_TICK_MS") {
            Ok(raw) => parse_tick_ms(&raw)?,
            Err(_) => DEFAULT_TICK_INTERVAL,
        };
        let mut in_memory = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--snapshot" => {
                    snapshot = PathBuf::from(require_value(&mut args, "--snapshot")?);
                }
                "--stages" => {
                    let value = require_value(&mut args, "--stages")?;
                    stage_count = parse_stages(&value)?;
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    seed = Some(parse_seed(&value)?);
                }
                "--tick-ms" => {
                    let value = require_value(&mut args, "--tick-ms")?;
                    tick = parse_tick_ms(&value)?;
                }
                "--memory" => in_memory = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            snapshot,
            stage_count,
            seed,
            tick,
            in_memory,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --snapshot <path>         Save file (default: GameData.json)");
    eprintln!("  --stages <n>              Number of stages on the hub (default: 3)");
    eprintln!("  --seed <u64>              Fixed seed for the weight draws");
    eprintln!("  --tick-ms <ms>            Session tick interval (default: 50)");
    eprintln!("  --memory                  Keep progress in memory only");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  HUB_SNAPSHOT_PATH, HUB_STAGE_COUNT, HUB_SEED, HUB_TICK_MS");
}

/// Line commands accepted at the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HubCommand {
    Status,
    Unlock(StageIndex),
    Select(StageIndex),
    Play,
    Claim(u32),
    Save,
    Load,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidStage(String),
    InvalidAmount(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "type a command, or `help`"),
            CommandError::Unknown(word) => write!(f, "unknown command: {word}"),
            CommandError::MissingArgument(command) => write!(f, "{command} needs a number"),
            CommandError::InvalidStage(raw) => write!(f, "not a stage number: {raw}"),
            CommandError::InvalidAmount(raw) => write!(f, "not a coin amount: {raw}"),
        }
    }
}

/// Stages are typed 1-based.
fn parse_stage(raw: Option<&str>, command: &'static str) -> Result<StageIndex, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument(command))?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(StageIndex::new(n - 1)),
        _ => Err(CommandError::InvalidStage(raw.to_owned())),
    }
}

fn parse_hub_command(line: &str) -> Result<HubCommand, CommandError> {
    let mut words = line.split_whitespace();
    let word = words.next().ok_or(CommandError::Empty)?;
    let command = match word.to_ascii_lowercase().as_str() {
        "status" | "s" => HubCommand::Status,
        "unlock" | "u" => HubCommand::Unlock(parse_stage(words.next(), "unlock")?),
        "select" => HubCommand::Select(parse_stage(words.next(), "select")?),
        "play" | "p" => HubCommand::Play,
        "claim" => {
            let raw = words.next().ok_or(CommandError::MissingArgument("claim"))?;
            let coins = raw
                .parse::<u32>()
                .map_err(|_| CommandError::InvalidAmount(raw.to_owned()))?;
            HubCommand::Claim(coins)
        }
        "save" => HubCommand::Save,
        "load" => HubCommand::Load,
        "help" | "h" | "?" => HubCommand::Help,
        "quit" | "q" | "exit" => HubCommand::Quit,
        _ => return Err(CommandError::Unknown(word.to_owned())),
    };
    Ok(command)
}

/// Bears are typed 1-based; anything else is a pause/resume/exit word.
fn parse_session_command(line: &str) -> Option<SessionCommand> {
    let word = line.trim().to_ascii_lowercase();
    match word.as_str() {
        "pause" => Some(SessionCommand::Pause),
        "resume" => Some(SessionCommand::Resume),
        "exit" | "quit" | "q" => Some(SessionCommand::Exit),
        _ => match word.parse::<usize>() {
            Ok(n) if n > 0 => Some(SessionCommand::Guess(n - 1)),
            _ => None,
        },
    }
}

fn print_hub_help() {
    println!("Hub commands:");
    println!("  status            show keys, coins and stages");
    println!("  unlock <n>        spend keys on stage n");
    println!("  select <n>        choose an unlocked stage");
    println!("  play              start the selected stage");
    println!("  claim <coins>     add coins to the total");
    println!("  save / load       write or re-read the save file");
    println!("  quit              leave without saving");
}

fn print_status(controller: &SessionController<SeededRandom>) {
    let progression = controller.progression();
    let state = progression.state();
    println!("Keys: {}  Coins: {}", state.keys(), state.coins());
    for index in 0..state.stage_count() {
        let stage = StageIndex::new(index);
        let marker = if progression.selected_stage() == Some(stage) {
            '>'
        } else {
            ' '
        };
        if state.is_unlocked(stage) == Some(true) {
            let best = state.score_for(stage).unwrap_or(0);
            println!("{marker} Stage {}: unlocked, last score {best}", stage.ordinal());
        } else {
            println!(
                "{marker} Stage {}: locked ({} keys)",
                stage.ordinal(),
                progression.stage_cost()
            );
        }
    }
}

/// Forward stdin lines into a channel so they can be awaited alongside timers.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("stdin read failed: {err}");
                    break;
                }
            }
        }
    });
    rx
}

async fn play(
    controller: &mut SessionController<SeededRandom>,
    lines: &mut mpsc::Receiver<String>,
    driver: SessionDriver,
) -> Result<SessionOutcome, Box<dyn std::error::Error>> {
    controller.play_selected()?;

    let (cmd_tx, mut cmd_rx) = mpsc::channel(16);
    let mut cmd_tx = Some(cmd_tx);
    let run = driver.run(controller, &mut cmd_rx);
    tokio::pin!(run);

    loop {
        tokio::select! {
            outcome = &mut run => return Ok(outcome?),

            line = lines.recv(), if cmd_tx.is_some() => match line {
                Some(line) => match parse_session_command(&line) {
                    Some(command) => {
                        let sent = match &cmd_tx {
                            Some(tx) => tx.send(command).await.is_ok(),
                            None => false,
                        };
                        if !sent {
                            cmd_tx = None;
                        }
                    }
                    None => println!("type a bear number, pause, resume or exit"),
                },
                // Input closed: dropping the sender makes the driver exit.
                None => cmd_tx = None,
            },
        }
    }
}

/// Apply an action that changes the progression. Returns `true` when the
/// whole status should be shown again.
async fn apply_hub_action(hub: &mut ProgressionService, action: HubCommand) -> bool {
    match action {
        HubCommand::Unlock(stage) => match hub.unlock_stage(stage) {
            UnlockOutcome::Unlocked(_) => {}
            UnlockOutcome::AlreadyUnlocked => {
                println!("Stage {} is already open.", stage.ordinal());
            }
            UnlockOutcome::InsufficientFunds { keys, cost } => {
                println!("Not enough keys: have {keys}, need {cost}.");
            }
            UnlockOutcome::InvalidIndex => println!("There is no stage {}.", stage.ordinal()),
        },
        HubCommand::Select(stage) => match hub.select_stage(stage) {
            SelectOutcome::Selected(_) => {}
            SelectOutcome::Locked => println!("Stage {} is locked.", stage.ordinal()),
            SelectOutcome::InvalidIndex => println!("There is no stage {}.", stage.ordinal()),
        },
        HubCommand::Claim(coins) => hub.claim_reward(coins),
        HubCommand::Load => match hub.reload().await {
            Ok(()) => return true,
            Err(err) => println!("{err}"),
        },
        HubCommand::Status
        | HubCommand::Play
        | HubCommand::Save
        | HubCommand::Help
        | HubCommand::Quit => {}
    }
    false
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let config = HubConfig::new(
        args.stage_count,
        hub_core::unlock::STAGE_COST,
        TurnConfig::default(),
    )?;
    let storage = if args.in_memory {
        info!("keeping progress in memory");
        Storage::in_memory()
    } else {
        info!("using save file {}", args.snapshot.display());
        Storage::json_file(&args.snapshot)
    };

    let presenter: Arc<dyn HubPresenter> = Arc::new(ConsolePresenter);
    let progression =
        ProgressionService::open(storage.progression.clone(), presenter.clone(), &config).await?;
    let rng = match args.seed {
        Some(seed) => SeededRandom::from_seed(seed),
        None => SeededRandom::from_os(),
    };
    let mut controller =
        SessionController::new(progression, config, Clock::system(), rng, presenter);
    let driver = SessionDriver::new(args.tick);

    print_hub_help();
    print_status(&controller);

    let mut lines = spawn_stdin_reader();
    while let Some(line) = lines.recv().await {
        let command = match parse_hub_command(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            HubCommand::Status => print_status(&controller),
            HubCommand::Play => match play(&mut controller, &mut lines, driver).await {
                Ok(_) => print_status(&controller),
                Err(err) => println!("{err}"),
            },
            HubCommand::Save => {
                if let Err(err) = controller.progression().save().await {
                    println!("{err}");
                }
            }
            HubCommand::Help => print_hub_help(),
            HubCommand::Quit => break,
            action => match controller.progression_mut() {
                Ok(hub) => {
                    if apply_hub_action(hub, action).await {
                        print_status(&controller);
                    }
                }
                Err(err) => println!("{err}"),
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
