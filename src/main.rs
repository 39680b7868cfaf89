use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use matchling::config::Config;
use matchling::engine::achievements::{ALL_ACHIEVEMENTS, progress_percent};
use matchling::generator::round::RoundSpec;
use matchling::session::game::{GameState, MatchGame};
use matchling::session::observer::SessionLog;
use matchling::session::outcome::{GameSummary, Outcome};
use matchling::store::json_store::JsonStore;
use matchling::store::schema::{ExportData, ProfileSnapshotData};

#[derive(Parser)]
#[command(
    name = "matchling",
    version,
    about = "Matching game with adaptive difficulty for young players"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, help = "Difficulty mode (easy, normal, adaptive)")]
    difficulty: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Play in the terminal
    Play,
    /// Run seeded bot games and print aggregate statistics
    Simulate {
        #[arg(long, default_value_t = 20)]
        games: u32,
        #[arg(long, default_value_t = 0.85, help = "Bot hit probability per tap")]
        accuracy: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 5, help = "Stop a run after this many levels")]
        max_levels: u32,
    },
    /// Show lifetime stats and achievements
    Stats,
    /// Write progress and settings to a JSON bundle
    Export { path: PathBuf },
    /// Restore progress and settings from a JSON bundle
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
        config.validate();
    }

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => play(&config),
        Command::Simulate {
            games,
            accuracy,
            seed,
            max_levels,
        } => simulate(&config, games, accuracy, seed, max_levels),
        Command::Stats => show_stats(),
        Command::Export { path } => export(&config, &path),
        Command::Import { path } => import(&path),
    }
}

// --- Interactive play ---

fn play(config: &Config) -> Result<()> {
    let mut game = MatchGame::new(config);
    let log = Rc::new(RefCell::new(SessionLog::new()));
    game.add_observer(log.clone());

    println!("matchling: find all the matching items!");
    println!("Type a cell number and press Enter. 'q' quits.\n");

    let mut round = game.start_new_game()?;
    let stdin = io::stdin();

    let summary = 'game: loop {
        print_round(&round, &game.get_game_state());
        let mut matched_cells: HashSet<usize> = HashSet::new();

        loop {
            print!("> ");
            io::stdout().flush()?;
            let asked_at = Instant::now();

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break 'game game.end_game()?;
            }
            let input = line.trim();
            if input.eq_ignore_ascii_case("q") {
                break 'game game.end_game()?;
            }

            let cell = match input.parse::<usize>() {
                Ok(n) if (1..=round.candidates.len()).contains(&n) => n - 1,
                _ => {
                    println!("  pick a number from 1 to {}", round.candidates.len());
                    continue;
                }
            };
            if matched_cells.contains(&cell) {
                println!("  already matched that one");
                continue;
            }

            let response_ms = asked_at.elapsed().as_secs_f64() * 1000.0;
            let correct = round.candidates[cell].is_match;
            if correct {
                matched_cells.insert(cell);
            }

            match game.process_answer(correct, response_ms)? {
                Outcome::Continue { success: true } => println!("  ✓ nice!"),
                Outcome::Continue { success: false } => {
                    println!("  ✗ not that one, {} left", stars(game.get_game_state().stars));
                }
                Outcome::RoundComplete { next_round } => {
                    println!("  ✓ round complete!");
                    round = next_round;
                    continue 'game;
                }
                Outcome::LevelComplete {
                    new_level,
                    bonus_score,
                } => {
                    println!("  🎉 level {new_level}! +{bonus_score} bonus");
                    round = game.generate_round()?;
                    continue 'game;
                }
                Outcome::GameOver(summary) => {
                    println!("  ✗ out of stars!");
                    break 'game summary;
                }
            }
        }
    };

    println!(
        "\nGame over: score {} | level {} | accuracy {}% | {:.0}s played",
        summary.final_score, summary.level, summary.accuracy_percent, summary.play_time_secs
    );
    record_progress(config, &game, &summary, &log.borrow());
    Ok(())
}

fn print_round(round: &RoundSpec, state: &GameState) {
    println!();
    println!(
        "Level {}  round {}/{}  score {}  {}",
        state.level,
        state.round,
        state.max_rounds,
        state.score,
        stars(state.stars)
    );
    println!(
        "Find {} × {} ({})",
        round.correct_matches, round.target.glyph, round.target.name
    );
    let cells: Vec<String> = round
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}", i + 1, c.item.glyph))
        .collect();
    println!("{}", cells.join("  "));
}

fn stars(count: u32) -> String {
    "★".repeat(count as usize)
}

/// Fold the finished game into the progress store. Failures are warnings;
/// the game result on screen never depends on storage.
fn record_progress(config: &Config, game: &MatchGame, summary: &GameSummary, log: &SessionLog) {
    let store = match JsonStore::new() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("warning: progress store unavailable: {e}");
            return;
        }
    };

    let mut progress = store.load_progress();
    progress
        .stats
        .record_game(summary, log, config.fast_match_ms);
    let newly_unlocked = progress.achievements.check(&progress.stats);

    if let Err(e) = store.save_progress(&progress) {
        eprintln!("warning: could not save progress: {e}");
    }
    let snapshot = ProfileSnapshotData {
        profile: game.profile().clone(),
        ..ProfileSnapshotData::default()
    };
    if let Err(e) = store.save_profile_snapshot(&snapshot) {
        eprintln!("warning: could not save adaptive profile: {e}");
    }

    for id in newly_unlocked {
        if let Some(def) = ALL_ACHIEVEMENTS.iter().find(|d| d.id == id) {
            println!("Achievement unlocked: {} {}", def.icon, id.to_key());
        }
    }
}

// --- Bot simulation ---

fn simulate(
    config: &Config,
    games: u32,
    accuracy: f64,
    seed: Option<u64>,
    max_levels: u32,
) -> Result<()> {
    let accuracy = accuracy.clamp(0.0, 1.0);
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut total_score = 0u64;
    let mut total_level = 0u64;
    let mut total_accuracy = 0u64;

    for game_idx in 1..=games {
        let game_rng = SmallRng::from_rng(&mut rng).unwrap();
        let mut game = MatchGame::with_rng(config, game_rng);
        game.start_new_game()?;

        let summary = loop {
            let correct = rng.gen_bool(accuracy);
            let response_ms = rng.gen_range(300.0..2500.0);
            match game.process_answer(correct, response_ms)? {
                Outcome::Continue { .. } | Outcome::RoundComplete { .. } => {}
                Outcome::LevelComplete { new_level, .. } => {
                    if new_level > max_levels {
                        break game.end_game()?;
                    }
                    game.generate_round()?;
                }
                Outcome::GameOver(summary) => break summary,
            }
        };

        total_score += summary.final_score;
        total_level += summary.level as u64;
        total_accuracy += summary.accuracy_percent as u64;
        println!(
            "game {game_idx:>3}: score {:>6}  level {}  accuracy {:>3}%  difficulty {:.1}",
            summary.final_score,
            summary.level,
            summary.accuracy_percent,
            game.profile().difficulty_level()
        );
    }

    if games > 0 {
        println!(
            "\n{} games: avg score {}, avg level {:.1}, avg accuracy {}%",
            games,
            total_score / games as u64,
            total_level as f64 / games as f64,
            total_accuracy / games as u64
        );
    }
    Ok(())
}

// --- Stats / export / import ---

fn show_stats() -> Result<()> {
    let store = JsonStore::new()?;
    let progress = store.load_progress();
    let stats = &progress.stats;

    println!("Games played:   {}", stats.games_played);
    println!("Total score:    {}", stats.total_score);
    println!("Average score:  {}", stats.average_score());
    println!("Highest level:  {}", stats.highest_level);
    println!("Stars earned:   {}", stats.total_stars);
    println!("Perfect rounds: {}", stats.perfect_rounds);
    println!("Fast matches:   {}", stats.fast_matches);
    println!("Play time:      {:.0}s", stats.total_play_secs);

    println!("\nAchievements:");
    for def in ALL_ACHIEVEMENTS {
        let marker = if progress.achievements.is_unlocked(def.id) {
            "✔"
        } else {
            " "
        };
        println!(
            "  [{marker}] {} {:<15} {:>5.0}%",
            def.icon,
            def.id.to_key(),
            progress_percent(def, stats)
        );
    }
    Ok(())
}

fn export(config: &Config, path: &Path) -> Result<()> {
    let store = JsonStore::new()?;
    let data = store.export_all(config);
    fs::write(path, serde_json::to_string_pretty(&data)?)?;
    println!("Exported progress to {}", path.display());
    Ok(())
}

fn import(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let data: ExportData = serde_json::from_str(&content)?;
    let store = JsonStore::new()?;
    store.import_all(&data)?;
    data.config.save()?;
    println!("Imported progress from {}", path.display());
    Ok(())
}
