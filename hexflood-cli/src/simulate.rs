//! Simulate command - play many games between computer players
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_batch(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use hexflood_core::{
    play_game, AiPlayer, GameConfig, GameState, Player, PlayerId, PlayerSlot, Strategy, Winner,
    DEFAULT_BOARD_SIZE,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of games to play (sides alternate who moves first)
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Board edge length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    pub size: usize,

    /// Number of palette colors
    #[arg(long, default_value = "6")]
    pub colors: usize,

    /// Strategy for side A (random, greedy)
    #[arg(long, default_value = "greedy")]
    pub strategy: Strategy,

    /// Strategy for side B; same as side A when absent
    #[arg(long)]
    pub opponent: Option<Strategy>,

    /// Moves after which a game is abandoned as unfinished
    #[arg(long, default_value = "500")]
    pub max_turns: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// How one game ended, by side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    SideA,
    SideB,
    Draw,
    Unfinished,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    /// Side A moved first
    a_first: bool,
    outcome: Outcome,
    turns: u32,
    /// Final tiles for side A and side B
    scores: [usize; 2],
}

/// Aggregated batch results
#[derive(Clone, Debug)]
struct SimulationResults {
    games: Vec<GameRecord>,
    a_wins: usize,
    b_wins: usize,
    draws: usize,
    unfinished: usize,
    first_mover_wins: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// This function reads like a table of contents:
/// 1. Build the board settings
/// 2. Play all games in parallel
/// 3. Report results
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args)?;
    let opponent = args.opponent.unwrap_or(args.strategy);

    tracing::info!(
        "Simulating {} games: {} vs {} on {}x{} with {} colors",
        args.games,
        args.strategy,
        opponent,
        args.size,
        args.size,
        args.colors
    );

    let base_seed = create_rng(seed).gen::<u64>();
    let results = play_batch(&config, [args.strategy, opponent], &args, base_seed)?;

    report_results(&results, [args.strategy, opponent], &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Board settings shared by every game; seeds are set per game
fn build_config(args: &SimulateArgs) -> Result<GameConfig> {
    let config = GameConfig::new(args.size, 0)
        .with_colors(args.colors)
        .context("Invalid palette size")?;
    config.validate().context("Invalid board settings")?;
    Ok(config)
}

/// Play all games across the rayon pool
fn play_batch(
    config: &GameConfig,
    sides: [Strategy; 2],
    args: &SimulateArgs,
    base_seed: u64,
) -> Result<SimulationResults> {
    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.games as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let games: Vec<GameRecord> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let record = play_single_game(
                config,
                sides,
                i + 1,
                base_seed.wrapping_add(i as u64),
                args.max_turns,
            );
            progress.inc(1);
            record
        })
        .collect::<Result<_>>()?;

    progress.finish_with_message("done");

    Ok(compute_statistics(games))
}

/// Report batch results
fn report_results(results: &SimulationResults, sides: [Strategy; 2], args: &SimulateArgs) {
    if args.json {
        print_json_results(results, sides);
    } else {
        print_text_results(results, sides);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game; odd-numbered games seat side A first
fn play_single_game(
    config: &GameConfig,
    sides: [Strategy; 2],
    game_number: usize,
    seed: u64,
    max_turns: u32,
) -> Result<GameRecord> {
    let a_first = game_number % 2 == 1;
    let (first, second) = if a_first {
        (sides[0], sides[1])
    } else {
        (sides[1], sides[0])
    };

    // AI seeds follow from the board seed so each game replays exactly
    let mut seeder = ChaCha8Rng::seed_from_u64(seed);
    let mut players = [
        AiPlayer::with_seed(first, seeder.gen()),
        AiPlayer::with_seed(second, seeder.gen()),
    ];

    let state = GameState::new(
        &config.clone().with_seed(seed),
        [
            Player::new("first", first.name()),
            Player::new("second", second.name()),
        ],
    )?;
    let (final_state, colors) = play_game(state, &mut players, max_turns);

    let first_score = final_state.player(PlayerSlot::One).score;
    let second_score = final_state.player(PlayerSlot::Two).score;
    let first_won = |id: &PlayerId| id.as_str() == "first";

    let outcome = match final_state.winner() {
        None => Outcome::Unfinished,
        Some(Winner::Draw) => Outcome::Draw,
        Some(Winner::Player(id)) if first_won(id) == a_first => Outcome::SideA,
        Some(Winner::Player(_)) => Outcome::SideB,
    };

    tracing::debug!(
        "Game {}: {:?} after {} turns ({} - {})",
        game_number,
        outcome,
        colors.len(),
        first_score,
        second_score
    );

    Ok(GameRecord {
        game_number,
        seed,
        a_first,
        outcome,
        turns: final_state.turn_number(),
        scores: if a_first {
            [first_score, second_score]
        } else {
            [second_score, first_score]
        },
    })
}

/// Compute aggregate statistics from game records
fn compute_statistics(mut games: Vec<GameRecord>) -> SimulationResults {
    games.sort_by_key(|g| g.game_number);

    let count = |outcome: Outcome| games.iter().filter(|g| g.outcome == outcome).count();
    let a_wins = count(Outcome::SideA);
    let b_wins = count(Outcome::SideB);
    let draws = count(Outcome::Draw);
    let unfinished = count(Outcome::Unfinished);

    let first_mover_wins = games
        .iter()
        .filter(|g| {
            matches!(
                (g.outcome, g.a_first),
                (Outcome::SideA, true) | (Outcome::SideB, false)
            )
        })
        .count();

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    SimulationResults {
        games,
        a_wins,
        b_wins,
        draws,
        unfinished,
        first_mover_wins,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn rate(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &SimulationResults, sides: [Strategy; 2]) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        seed: u64,
        a_first: bool,
        outcome: String,
        turns: u32,
        a_score: usize,
        b_score: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        generated_at: String,
        side_a: String,
        side_b: String,
        total_games: usize,
        a_wins: usize,
        b_wins: usize,
        draws: usize,
        unfinished: usize,
        first_mover_wins: usize,
        avg_turns: f32,
        a_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        side_a: sides[0].to_string(),
        side_b: sides[1].to_string(),
        total_games: total,
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        draws: results.draws,
        unfinished: results.unfinished,
        first_mover_wins: results.first_mover_wins,
        avg_turns: results.avg_turns,
        a_win_rate: rate(results.a_wins, total),
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                seed: g.seed,
                a_first: g.a_first,
                outcome: format!("{:?}", g.outcome),
                turns: g.turns,
                a_score: g.scores[0],
                b_score: g.scores[1],
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &SimulationResults, sides: [Strategy; 2]) {
    let total = results.games.len();

    println!("\n=== Simulation Results ===");
    println!("Side A: {}   Side B: {}", sides[0], sides[1]);
    println!("Total games: {}", total);
    println!(
        "A wins:      {} ({:.1}%)",
        results.a_wins,
        rate(results.a_wins, total) * 100.0
    );
    println!(
        "B wins:      {} ({:.1}%)",
        results.b_wins,
        rate(results.b_wins, total) * 100.0
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        rate(results.draws, total) * 100.0
    );
    if results.unfinished > 0 {
        println!(
            "Unfinished:  {} (hit the turn limit)",
            results.unfinished
        );
    }
    println!(
        "First mover: {} wins ({:.1}%)",
        results.first_mover_wins,
        rate(results.first_mover_wins, total) * 100.0
    );
    println!("Avg turns:   {:.1}", results.avg_turns);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(games: usize) -> SimulateArgs {
        SimulateArgs {
            games,
            size: 6,
            colors: 4,
            strategy: Strategy::Greedy,
            opponent: Some(Strategy::Random),
            max_turns: 200,
            json: true,
        }
    }

    fn record(game_number: usize, a_first: bool, outcome: Outcome, turns: u32) -> GameRecord {
        GameRecord {
            game_number,
            seed: game_number as u64,
            a_first,
            outcome,
            turns,
            scores: [0, 0],
        }
    }

    #[test]
    fn test_compute_statistics() {
        let results = compute_statistics(vec![
            record(2, false, Outcome::SideA, 10),
            record(1, true, Outcome::SideA, 20),
            record(3, true, Outcome::SideB, 30),
            record(4, false, Outcome::Unfinished, 40),
        ]);

        assert_eq!(results.a_wins, 2);
        assert_eq!(results.b_wins, 1);
        assert_eq!(results.draws, 0);
        assert_eq!(results.unfinished, 1);
        // Game 1: A moved first and won
        assert_eq!(results.first_mover_wins, 1);
        assert!((results.avg_turns - 25.0).abs() < 1e-6);
        let order: Vec<usize> = results.games.iter().map(|g| g.game_number).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_statistics() {
        let results = compute_statistics(Vec::new());
        assert_eq!(results.avg_turns, 0.0);
        assert_eq!(rate(results.a_wins, 0), 0.0);
    }

    #[test]
    fn test_single_game_is_reproducible() {
        let args = args(1);
        let config = build_config(&args).unwrap();
        let sides = [Strategy::Greedy, Strategy::Random];

        let a = play_single_game(&config, sides, 1, 77, args.max_turns).unwrap();
        let b = play_single_game(&config, sides, 1, 77, args.max_turns).unwrap();

        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.scores, b.scores);
        assert!(a.a_first);
        assert!(a.turns <= args.max_turns);
    }

    #[test]
    fn test_sides_alternate() {
        let args = args(1);
        let config = build_config(&args).unwrap();
        let sides = [Strategy::Greedy, Strategy::Greedy];

        assert!(play_single_game(&config, sides, 1, 5, 200).unwrap().a_first);
        assert!(!play_single_game(&config, sides, 2, 5, 200).unwrap().a_first);
    }

    #[test]
    fn test_batch_counts_every_game() {
        let args = args(6);
        let config = build_config(&args).unwrap();

        let results =
            play_batch(&config, [Strategy::Greedy, Strategy::Random], &args, 1234).unwrap();

        assert_eq!(results.games.len(), 6);
        assert_eq!(
            results.a_wins + results.b_wins + results.draws + results.unfinished,
            6
        );
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (1234..1240).collect::<Vec<u64>>());
    }

    #[test]
    fn test_build_config_rejects_bad_settings() {
        let mut bad = args(1);
        bad.colors = 1;
        assert!(build_config(&bad).is_err());
    }
}
