//! Play command - hot-seat game in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), open_session(), play_loop()
//! - Level 3: parse_command(), apply_command(), save_progress()
//! - Level 4: board rendering and formatting utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexflood_core::{
    clear_recovery, load_recovery, save_recovery, Color, FileStore, GameConfig, GameEvent,
    GameObserver, GameState, Hex, LocalSession, Palette, Player, PlayerSlot, Winner,
    DEFAULT_BOARD_SIZE,
};

/// Store key for the hot-seat game in progress
const RECOVERY_KEY: &str = "hot-seat";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Board edge length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    pub size: usize,

    /// Number of palette colors
    #[arg(long, default_value = "6")]
    pub colors: usize,

    /// Name of the first player
    #[arg(long, default_value = "Player 1")]
    pub player_one: String,

    /// Name of the second player
    #[arg(long, default_value = "Player 2")]
    pub player_two: String,

    /// Directory for recovery snapshots; progress is saved after every move
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Continue the game saved in --save-dir instead of starting a new one
    #[arg(long, requires = "save_dir")]
    pub resume: bool,
}

/// What the player typed
#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Play(Color),
    Undo,
    Redo,
    Forfeit,
    Help,
    Quit,
}

/// Logs session events for `RUST_LOG=debug` runs
struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameOver { winner, .. } => tracing::info!("Game over: {:?}", winner),
            other => tracing::debug!("Event: {}", other.name()),
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Build the game config
/// 2. Start or resume the session
/// 3. Read commands until the game ends
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed)?;
    let mut store = match &args.save_dir {
        Some(dir) => Some(FileStore::open(dir)?),
        None => None,
    };

    let mut session = open_session(&args, &config, store.as_ref())?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let winner = play_loop(&mut session, stdin.lock(), &mut stdout, store.as_mut())?;

    if winner.is_some() {
        tracing::info!("Finished after {} turns", session.state().turn_number());
    } else {
        tracing::info!("Game left unfinished");
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Game config from arguments; a missing seed draws a fresh board
fn build_config(args: &PlayArgs, seed: Option<u64>) -> Result<GameConfig> {
    let seed = seed.unwrap_or_else(rand::random);
    let config = GameConfig::new(args.size, seed)
        .with_colors(args.colors)
        .context("Invalid palette size")?;
    config.validate().context("Invalid board settings")?;
    Ok(config)
}

/// Resume from the store when asked and possible, otherwise start fresh
fn open_session(
    args: &PlayArgs,
    config: &GameConfig,
    store: Option<&FileStore>,
) -> Result<LocalSession<TracingObserver>> {
    if args.resume {
        if let Some(snapshot) = store.and_then(|s| load_recovery(s, RECOVERY_KEY)) {
            let session = LocalSession::resume(&snapshot, TracingObserver)?;
            tracing::info!("Resumed saved game from {}", snapshot.timestamp);
            return Ok(session);
        }
        tracing::warn!("No saved game found, starting a new one");
    }

    let players = [
        Player::new("one", args.player_one.as_str()),
        Player::new("two", args.player_two.as_str()),
    ];
    LocalSession::start(config, players, TracingObserver)
}

/// Read commands until the game ends, the input runs dry or a player quits.
///
/// Returns the winner when the game finished.
fn play_loop<O, R, W>(
    session: &mut LocalSession<O>,
    input: R,
    out: &mut W,
    mut store: Option<&mut FileStore>,
) -> Result<Option<Winner>>
where
    O: GameObserver,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", render_board(session.state()))?;
    writeln!(out, "{}", status_line(session.state()))?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line, session.state().palette()) {
            Some(command) => command,
            None => {
                writeln!(out, "Unknown command '{}'. Type 'help' for options.", line.trim())?;
                continue;
            }
        };

        match command {
            Command::Quit => return Ok(None),
            Command::Help => {
                writeln!(out, "{}", help_text(session.state().palette()))?;
                continue;
            }
            other => apply_command(session, other, out)?,
        }

        if let Some(store) = store.as_deref_mut() {
            save_progress(session, store);
        }

        writeln!(out, "{}", render_board(session.state()))?;
        if let Some(winner) = session.state().winner() {
            writeln!(out, "{}", winner_line(session.state(), winner))?;
            return Ok(Some(winner.clone()));
        }
        writeln!(out, "{}", status_line(session.state()))?;
    }

    Ok(None)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Keywords first, then a palette name or index
fn parse_command(input: &str, palette: &Palette) -> Option<Command> {
    let word = input.trim();
    match word.to_ascii_lowercase().as_str() {
        "undo" | "u" => Some(Command::Undo),
        "redo" | "r" => Some(Command::Redo),
        "forfeit" | "resign" => Some(Command::Forfeit),
        "help" | "?" => Some(Command::Help),
        "quit" | "q" | "exit" => Some(Command::Quit),
        _ => palette.parse(word).map(Command::Play),
    }
}

/// Apply one state-changing command for the player to move
fn apply_command<O: GameObserver, W: Write>(
    session: &mut LocalSession<O>,
    command: Command,
    out: &mut W,
) -> Result<()> {
    let mover = session.state().current_player().id.clone();

    match command {
        Command::Play(color) => {
            let response = session.request_move(&mover, color);
            if let Some(reason) = response.reason {
                writeln!(out, "Move rejected: {}", reason)?;
            } else {
                writeln!(out, "Captured {} tiles.", response.captured.len())?;
            }
        }
        Command::Undo => {
            if !session.undo()? {
                writeln!(out, "Nothing to undo.")?;
            }
        }
        Command::Redo => {
            if !session.redo()? {
                writeln!(out, "Nothing to redo.")?;
            }
        }
        Command::Forfeit => {
            if let Err(reason) = session.forfeit(&mover) {
                writeln!(out, "Cannot forfeit: {}", reason)?;
            }
        }
        Command::Help | Command::Quit => {}
    }

    Ok(())
}

/// Keep the store in step with the session; failures only warn
fn save_progress<O: GameObserver>(session: &LocalSession<O>, store: &mut FileStore) {
    let result = if session.state().is_over() {
        clear_recovery(store, RECOVERY_KEY)
    } else {
        session
            .recovery_snapshot()
            .map_err(anyhow::Error::from)
            .and_then(|snapshot| save_recovery(store, RECOVERY_KEY, &snapshot))
    };

    if let Err(e) = result {
        tracing::warn!("Could not update recovery snapshot: {:#}", e);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// One glyph per color: name initials when they are distinct, else indices
fn glyphs(palette: &Palette) -> Vec<char> {
    let initials: Vec<char> = palette
        .colors()
        .map(|c| {
            palette
                .name(c)
                .and_then(|n| n.chars().next())
                .unwrap_or('?')
                .to_ascii_lowercase()
        })
        .collect();

    let mut seen = initials.clone();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() == initials.len() {
        return initials;
    }

    palette
        .colors()
        .map(|c| std::char::from_digit(c.0 as u32 % 36, 36).unwrap_or('?'))
        .collect()
}

/// Rhombus view of the board, one row per `r`.
///
/// Unowned tiles show a lowercase glyph, owned tiles the owner's digit and
/// an uppercase glyph.
fn render_board(state: &GameState) -> String {
    let board = state.board();
    let glyphs = glyphs(state.palette());
    let size = board.size() as i32;
    let mut out = String::new();

    for r in 0..size {
        out.push_str(&"  ".repeat(r as usize));
        for q in 0..size {
            let Some(tile) = board.get(Hex::new(q, r)) else {
                continue;
            };
            let glyph = glyphs.get(tile.color.index()).copied().unwrap_or('?');
            let cell = match tile.owner {
                None => format!(" {}  ", glyph),
                Some(PlayerSlot::One) => format!("1{}  ", glyph.to_ascii_uppercase()),
                Some(PlayerSlot::Two) => format!("2{}  ", glyph.to_ascii_uppercase()),
            };
            out.push_str(&cell);
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }

    out
}

/// Scores, the player to move and their legal colors
fn status_line(state: &GameState) -> String {
    let [one, two] = state.players();
    let mover = state.current_player();
    let legal: Vec<&str> = state
        .legal_colors(&mover.id)
        .into_iter()
        .filter_map(|c| state.palette().name(c))
        .collect();

    format!(
        "Turn {}: {} {} - {} {}. {} to move ({}), legal: {}",
        state.turn_number() + 1,
        one.name,
        one.score,
        two.score,
        two.name,
        mover.name,
        state.palette().name(mover.color).unwrap_or("?"),
        if legal.is_empty() {
            "none".to_string()
        } else {
            legal.join(", ")
        }
    )
}

fn winner_line(state: &GameState, winner: &Winner) -> String {
    let [one, two] = state.players();
    let result = match winner {
        Winner::Draw => "Draw".to_string(),
        Winner::Player(id) => {
            let name = state
                .slot_of(id)
                .map(|slot| state.player(slot).name.as_str())
                .unwrap_or("?");
            format!("{} wins", name)
        }
    };
    format!(
        "=== {} === ({} {} - {} {})",
        result, one.name, one.score, two.score, two.name
    )
}

fn help_text(palette: &Palette) -> String {
    let colors: Vec<String> = palette
        .colors()
        .map(|c| format!("{} ({})", palette.name(c).unwrap_or("?"), c.0))
        .collect();
    format!(
        "Enter a color name or index: {}\nOther commands: undo, redo, forfeit, help, quit",
        colors.join(", ")
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hexflood_core::{choose_color, EventLog, Strategy};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn args() -> PlayArgs {
        PlayArgs {
            size: 5,
            colors: 4,
            player_one: "Ann".into(),
            player_two: "Bo".into(),
            save_dir: None,
            resume: false,
        }
    }

    fn session() -> LocalSession<EventLog> {
        let config = build_config(&args(), Some(7)).unwrap();
        LocalSession::hot_seat(&config, ["Ann", "Bo"]).unwrap()
    }

    fn legal_name(state: &GameState) -> String {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let color = choose_color(Strategy::Greedy, state, &mut rng).unwrap();
        state.palette().name(color).unwrap().to_string()
    }

    #[test]
    fn test_parse_command() {
        let palette = Palette::default();
        assert_eq!(parse_command(" UNDO ", &palette), Some(Command::Undo));
        assert_eq!(parse_command("q", &palette), Some(Command::Quit));
        assert_eq!(parse_command("Blue", &palette), Some(Command::Play(Color(4))));
        assert_eq!(parse_command("2", &palette), Some(Command::Play(Color(2))));
        assert_eq!(parse_command("42", &palette), None);
        assert_eq!(parse_command("teal", &palette), None);
    }

    #[test]
    fn test_build_config_uses_seed() {
        let config = build_config(&args(), Some(99)).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.size, 5);
        assert_eq!(config.palette.len(), 4);

        let mut bad = args();
        bad.size = 1;
        assert!(build_config(&bad, Some(1)).is_err());
    }

    #[test]
    fn test_glyphs_fall_back_to_indices() {
        assert_eq!(glyphs(&Palette::default()), vec!['r', 'o', 'y', 'g', 'b', 'p']);
        let palette = Palette::new(["cyan", "crimson", "gold"]).unwrap();
        assert_eq!(glyphs(&palette), vec!['0', '1', '2']);
    }

    #[test]
    fn test_render_board_marks_owners() {
        let session = session();
        let text = render_board(session.state());
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 5);
        // Player one starts at (0, size-1): first cell of the last row
        assert!(rows[4].trim_start().starts_with('1'));
        // Player two starts at (size-1, 0): last cell of the first row
        let first_row: Vec<&str> = rows[0].split_whitespace().collect();
        assert!(first_row.last().unwrap().starts_with('2'));
    }

    #[test]
    fn test_play_loop_moves_and_undo() {
        let mut session = session();
        let first = legal_name(session.state());
        let script = format!("{}\nundo\nredo\nquit\n", first);
        let mut out = Vec::new();

        let winner = play_loop(&mut session, script.as_bytes(), &mut out, None).unwrap();

        assert_eq!(winner, None);
        assert_eq!(session.state().turn_number(), 1);
        assert_eq!(session.history().len(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Captured"));
    }

    #[test]
    fn test_play_loop_reports_rejections() {
        let mut session = session();
        let mut out = Vec::new();
        let script = "magenta\nundo\n";

        play_loop(&mut session, script.as_bytes(), &mut out, None).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Unknown command 'magenta'"));
        assert!(text.contains("Nothing to undo."));
        assert_eq!(session.state().turn_number(), 0);
    }

    #[test]
    fn test_forfeit_ends_game() {
        let mut session = session();
        let mut out = Vec::new();

        let winner = play_loop(&mut session, "forfeit\n".as_bytes(), &mut out, None).unwrap();

        assert_eq!(winner, Some(Winner::Player("two".into())));
        assert!(session.state().is_over());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=== Bo wins ==="));
    }

    #[test]
    fn test_progress_saved_and_resumed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let mut session = session();
        let script = format!("{}\n", legal_name(session.state()));
        let mut out = Vec::new();

        play_loop(&mut session, script.as_bytes(), &mut out, Some(&mut store)).unwrap();

        let mut resume_args = args();
        resume_args.save_dir = Some(dir.path().to_path_buf());
        resume_args.resume = true;
        let config = build_config(&resume_args, Some(7)).unwrap();
        let resumed = open_session(&resume_args, &config, Some(&store)).unwrap();
        assert_eq!(resumed.state(), session.state());
        assert_eq!(resumed.history().len(), 1);
    }

    #[test]
    fn test_finished_game_clears_recovery() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let mut session = session();
        let mut out = Vec::new();

        play_loop(&mut session, "forfeit\n".as_bytes(), &mut out, Some(&mut store)).unwrap();

        assert!(load_recovery(&store, RECOVERY_KEY).is_none());
    }
}
