use anyhow::Result;
use clap::Parser;
use fluxgrid_ai::{AiRequest, AiWorker, SearchBoard, Searcher};
use fluxgrid_core::{AmbientChance, Board, ChanceSource, Gate, Mulberry32, Player, RuleEngine};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mode to run the game in
    #[arg(short, long, value_enum, default_value = "play")]
    mode: Mode,

    /// AI difficulty tier (1-10)
    #[arg(short, long, default_value_t = 5)]
    difficulty: u8,

    /// Seed for reproducible duels
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum Mode {
    /// Interactive game against the AI
    Play,
    /// Headless AI-vs-AI game
    Duel,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    match args.mode {
        Mode::Play => play(args.difficulty.clamp(1, 10)).await,
        Mode::Duel => duel(args.difficulty.clamp(1, 10), args.seed),
    }
}

fn parse_move(line: &str) -> Option<(usize, Gate)> {
    let mut parts = line.split_whitespace();
    let cell_id = parts.next()?.parse().ok()?;
    let gate = match parts.next()?.to_lowercase().as_str() {
        "l" | "lock" => Gate::Lock,
        "c" | "collide" => Gate::Collide,
        "d" | "destabilize" => Gate::Destabilize,
        _ => return None,
    };
    Some((cell_id, gate))
}

/// Interactive loop: the human plays A, the worker plays B.
async fn play(difficulty: u8) -> Result<()> {
    let engine = RuleEngine::new();
    let worker = AiWorker::default();
    let mut board = Board::new();
    let mut chance = AmbientChance::new();

    println!("You are player A. Enter moves as `<cell> <gate>`, e.g. `14 collide`.");
    println!("Gates: lock (l), collide (c), destabilize (d). Cells are 0-35.");

    while !board.is_full() {
        println!("\n{board}");

        let (cell_id, gate) = loop {
            print!("your move> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                // EOF: abandon the game.
                return Ok(());
            }
            match parse_move(&line) {
                Some(mv) if engine.validate_move(&board, mv.0).is_ok() => break mv,
                Some((cell_id, _)) => println!("cell {cell_id} is not playable"),
                None => println!("could not parse that; try `14 lock`"),
            }
        };
        board = engine.apply_move(&board, cell_id, gate, Player::A, &mut chance);
        if board.is_full() {
            break;
        }

        let request = AiRequest {
            board: SearchBoard::from(&board).0,
            player: Player::B,
            difficulty,
        };
        let Some(mv) = worker.choose(request).await else {
            break;
        };
        println!("opponent plays {:?} at cell {}", mv.gate, mv.cell_id);
        board = engine.apply_move(&board, mv.cell_id, mv.gate, Player::B, &mut chance);
    }

    board = engine.collapse(&board, &mut chance);
    let score = board.score();
    println!("\n{board}");
    println!("Final score - you: {}, opponent: {}", score.a, score.b);
    Ok(())
}

/// Headless AI-vs-AI game; a fixed seed makes the whole run reproducible.
fn duel(difficulty: u8, seed: Option<u64>) -> Result<()> {
    let engine = RuleEngine::new();
    let searcher = Searcher::new();

    let mut chance: Box<dyn ChanceSource> = match seed {
        Some(s) => Box::new(Mulberry32::new(s as u32)),
        None => Box::new(AmbientChance::new()),
    };
    let mut rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    };

    let mut board = Board::new();
    let mut turn = Player::A;
    let mut moves = 0u32;
    while !board.is_full() {
        let fast = SearchBoard::from(&board);
        let Some(mv) = searcher.find_best_move(&fast, turn, difficulty, &mut rng) else {
            break;
        };
        board = engine.apply_move(&board, mv.cell_id, mv.gate, turn, chance.as_mut());
        tracing::info!(?turn, cell = mv.cell_id, gate = ?mv.gate, "move {moves}");
        moves += 1;
        turn = turn.opponent();
    }

    board = engine.collapse(&board, chance.as_mut());
    let score = board.score();
    println!("{board}");
    println!("Duel over after {moves} moves - A: {}, B: {}", score.a, score.b);
    Ok(())
}
