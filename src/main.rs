use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use chopsticks_ai::*;

mod game_board;
use game_board::*;

#[derive(Parser, Debug)]
#[command(
    name = "chopsticks",
    version,
    about = "Play and analyse the hand game Chopsticks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate every game that finishes within a move bound and write the game log
    Explore {
        /// Bound on the game length in full moves (one move per player)
        #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_MOVES)]
        max_moves: usize,
        /// Game log to write
        #[arg(short = 'o', long = "log", value_name = "FILE", default_value = GAME_LOG_PATH)]
        log: PathBuf,
        /// Completed games between flushes of the game log
        #[arg(long, default_value_t = CHECKPOINT_INTERVAL)]
        checkpoint_interval: usize,
        /// Don't show the progress spinner
        #[arg(long)]
        no_progress: bool,
    },
    /// Build the move database from a game log
    Build {
        /// Game log to read
        #[arg(short = 'l', long = "log", value_name = "FILE", default_value = GAME_LOG_PATH)]
        log: PathBuf,
        /// Database file to write
        #[arg(short = 'd', long, value_name = "FILE", default_value = DATABASE_PATH)]
        database: PathBuf,
    },
    /// Play against the AI
    Play {
        #[arg(short = 'd', long, value_name = "FILE", default_value = DATABASE_PATH)]
        database: PathBuf,
        #[arg(short = 'l', long = "log", value_name = "FILE", default_value = GAME_LOG_PATH)]
        log: PathBuf,
        /// novice, intermediate or master
        #[arg(long, default_value_t = Difficulty::Master)]
        difficulty: Difficulty,
        /// Let the AI make the first move
        #[arg(long)]
        ai_first: bool,
        /// Seed for the AI's random choices
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the AI's move for a position, e.g. "= 1-1 | 1-2"
    Suggest {
        state: String,
        /// Player to move, P1 or P2
        #[arg(long, default_value_t = Player::One)]
        mover: Player,
        #[arg(long, default_value_t = Difficulty::Master)]
        difficulty: Difficulty,
        /// Search to this depth instead, ignoring the database
        #[arg(long)]
        depth: Option<u32>,
        #[arg(short = 'd', long, value_name = "FILE", default_value = DATABASE_PATH)]
        database: PathBuf,
        #[arg(short = 'l', long = "log", value_name = "FILE", default_value = GAME_LOG_PATH)]
        log: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Explore {
            max_moves,
            log,
            checkpoint_interval,
            no_progress,
        } => explore(max_moves, log, checkpoint_interval, !no_progress),
        Command::Build { log, database } => build(log, database),
        Command::Play {
            database,
            log,
            difficulty,
            ai_first,
            seed,
        } => play(database, log, difficulty, ai_first, seed),
        Command::Suggest {
            state,
            mover,
            difficulty,
            depth,
            database,
            log,
            seed,
        } => suggest(&state, mover, difficulty, depth, database, log, seed),
    }
}

fn explore(
    max_moves: usize,
    log: PathBuf,
    checkpoint_interval: usize,
    progress: bool,
) -> Result<()> {
    println!("Finding all unique games ending in under {} moves", max_moves);

    let mut writer = GameLogWriter::create(&log)?.with_checkpoint_interval(checkpoint_interval);
    let summary = Explorer::new(max_moves)
        .with_progress(progress)
        .explore(&mut writer)?;
    writer.finish()?;

    println!("Wrote {} games to {}", summary.games, log.display());
    println!("\n--- Dataset Metadata ---\n{}", summary);
    Ok(())
}

fn build(log: PathBuf, database: PathBuf) -> Result<()> {
    let builder = DatabaseBuilder::from_log_file(&log)?;
    if builder.is_empty() {
        return Err(anyhow!("no usable games found in {}", log.display()));
    }
    let built = builder.build();
    built.save(&database)?;
    println!(
        "Built database with {} positions from {} games ({} rows skipped)",
        built.len(),
        builder.games(),
        builder.skipped_rows()
    );
    Ok(())
}

fn selector(database: PathBuf, log: PathBuf, seed: Option<u64>) -> MoveSelector {
    let selector = MoveSelector::new(MoveDatabase::load_or_build(database, log));
    match seed {
        Some(seed) => selector.with_seed(seed),
        None => selector,
    }
}

fn suggest(
    state: &str,
    mover: Player,
    difficulty: Difficulty,
    depth: Option<u32>,
    database: PathBuf,
    log: PathBuf,
    seed: Option<u64>,
) -> Result<()> {
    let position = Position::from_notation(state, mover)?;
    let history = History::new(&position);

    if let Some(depth) = depth {
        let mut searcher = Searcher::new().with_history(history);
        if let Some(seed) = seed {
            searcher = searcher.with_seed(seed);
        }
        let (best_move, score) = searcher.best_move(&position, depth);
        match best_move {
            Some(mv) => println!("{}\t{}\tsearch", PlayerMove::on(&position, mv), score),
            None => println!("no move\t{}", score),
        }
        info!(nodes = searcher.node_count, depth, "search finished");
        return Ok(());
    }

    let selection = selector(database, log, seed).select(&position, &history, difficulty)?;
    println!(
        "{}\t{}\t{}",
        selection.notation(&position),
        selection.score,
        if selection.perfect { "perfect" } else { "search" }
    );
    Ok(())
}

// asks a yes/no question until it gets an answer
fn confirm(question: &str) -> Result<bool> {
    loop {
        print!("{}\ny/n: ", question);
        stdout().flush().expect("failed to flush to stdout!");

        let mut buffer = String::new();
        stdin().read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn play(
    database: PathBuf,
    log: PathBuf,
    difficulty: Difficulty,
    ai_first: bool,
    seed: Option<u64>,
) -> Result<()> {
    println!("Welcome to Chopsticks\n");

    if !database.exists()
        && !log.exists()
        && confirm("Move database not found, would you like to generate one? (takes a LONG time)")?
    {
        explore(DEFAULT_MAX_MOVES, log.clone(), CHECKPOINT_INTERVAL, true)?;
    }

    let mut selector = selector(database, log, seed);
    let ai_player = if ai_first { Player::One } else { Player::Two };
    let mut board = GameBoard::new();

    println!("Enter a tap as two hands (e.g. LR), a split as the new hands (e.g. 2-2),");
    println!("or use full notation (P1L>P2R, Sp(P1:4|0 → 2|2))\n");

    // game loop
    loop {
        board.display()?;

        if let Some(winner) = board.position().winner() {
            if winner == ai_player {
                println!("{} (AI) wins!", winner);
            } else {
                println!("{} (you) wins!", winner);
            }
            break;
        }

        let next_move = if board.position().mover() == ai_player {
            let selection = match selector.select(board.position(), board.history(), difficulty) {
                Ok(selection) => selection,
                Err(err) => {
                    println!("AI has no move left ({}), the game is drawn", err);
                    break;
                }
            };
            println!(
                "AI plays {} (eval {}{})",
                selection.notation(board.position()),
                selection.score,
                if selection.perfect { ", perfect" } else { "" }
            );
            selection.mv
        } else {
            if legal_moves(board.position())
                .iter()
                .all(|mv| apply_move(board.position(), Some(mv), board.history()).is_err())
            {
                println!("You have no move that doesn't repeat a position, the game is drawn");
                break;
            }

            print!("Move input > ");
            stdout().flush().expect("Failed to flush to stdout!");
            let mut input = String::new();
            if stdin().read_line(&mut input)? == 0 {
                break;
            }
            match board.parse_input(&input) {
                Ok(mv) => mv,
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            }
        };

        if let Err(err) = board.play_checked(next_move) {
            println!("{}", err);
            // try the move again
            continue;
        }
    }

    let moves: Vec<String> = board.moves.iter().map(|mv| mv.to_string()).collect();
    println!("\nMoves: {}", moves.join(", "));
    Ok(())
}
