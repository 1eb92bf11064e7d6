use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use weekly_bingo::config::Config;
use weekly_bingo::renderer;
use weekly_bingo::{BingoSession, CandidatePool, Celebration, EngineEvent, FileStore, InteractionState, TapOutcome};

const USAGE: &str = "usage: weekly-bingo [show | tap <0-24> | reroll <0-24> | new | next-monday]";

enum Command {
    Show,
    Tap(usize),
    Reroll(usize),
    NewBoard,
    NextMonday,
}

fn parse_command(args: &[String]) -> Option<Command> {
    let index = |arg: Option<&String>| arg.and_then(|a| a.parse::<usize>().ok());
    match args.first().map(String::as_str) {
        None | Some("show") => Some(Command::Show),
        Some("tap") => index(args.get(1)).map(Command::Tap),
        Some("reroll") => index(args.get(1)).map(Command::Reroll),
        Some("new") => Some(Command::NewBoard),
        Some("next-monday") => Some(Command::NextMonday),
        Some(_) => None,
    }
}

fn print_event(event: &EngineEvent) {
    match event {
        EngineEvent::BoardChanged(board) => {
            println!("Marked {}/{} tiles", board.checked_count(), board.tiles().len());
        }
        EngineEvent::StatusChanged(message) if !message.is_empty() => println!("{message}"),
        EngineEvent::StatusChanged(_) => {}
        EngineEvent::Celebrate(Celebration::Bingo) => println!("🎊 🎊 🎊"),
        EngineEvent::Celebrate(Celebration::Golden) => println!("✨🏆✨ 🎊 🎊 🎊 ✨🏆✨"),
        EngineEvent::GoldenCountChanged(count) => println!("Golden bingos so far: {count}"),
        EngineEvent::RerollBalanceChanged(balance) => println!("Rerolls left: {balance}"),
    }
}

fn run(command: Command, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let now = chrono::Local::now();

    if let Command::NextMonday = command {
        let (hour, minute) = config.notify_at;
        match weekly_bingo::next_monday_at(&now, hour, minute) {
            Some(at) => println!("Next board reminder: {}", at.format("%A %Y-%m-%d %H:%M")),
            None => println!("No valid reminder time for {hour:02}:{minute:02} next Monday"),
        }
        return Ok(());
    }

    let pool = CandidatePool::from_json_file(&config.options_path)?;
    let store = FileStore::open_in(&config.data_dir)?;
    let mut session = BingoSession::open(&now, pool, store)?;
    let mut ui = InteractionState::default();

    match command {
        Command::Tap(index) => {
            session.tap(&mut ui, index)?;
        }
        Command::Reroll(index) => {
            ui.toggle_reroll_mode();
            if let TapOutcome::Rerolled(done) = session.tap(&mut ui, index)? {
                println!("\"{}\" -> \"{}\"", done.previous, done.text);
            }
        }
        Command::NewBoard => session.request_new_board(),
        Command::Show | Command::NextMonday => {}
    }

    println!("Week: {}", session.week());
    for event in session.drain_events() {
        print_event(&event);
    }

    let caption = format!("Week {}", session.week());
    renderer::render_board_to_png(session.board(), &caption, config.font_path.as_deref(), &config.output_path)?;
    println!("Bingo board image written to {}", config.output_path.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let config = Config::from_env();
    if let Err(e) = run(command, &config) {
        eprintln!("Failed to update bingo board: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
