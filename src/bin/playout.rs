//! Plays random legal games and checks the engine's invariants after every
//! step. Usage: playout [games] [seed]

use chess_rules::game::{Game, Phase};
use chess_rules::piece::PieceKind;
use chess_rules::rules::{self, Outcome};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const MAX_PLIES: u32 = 300;
const DEFAULT_GAMES: u32 = 100;

#[derive(Debug, Default)]
struct Tally {
    white_wins: u32,
    black_wins: u32,
    stalemates: u32,
    unfinished: u32,
    plies: u64,
    undos: u64,
}

/// Returns a description of the first broken invariant, if any.
fn check_invariants(game: &Game) -> Result<(), String> {
    let state = game.state();
    if (state.phase == Phase::AwaitingPromotionChoice) != state.pending_promotion.is_some() {
        return Err("pending promotion out of step with phase".to_string());
    }
    if state.phase == Phase::AwaitingPromotionChoice {
        return Ok(());
    }
    let moves = rules::legal_moves(&state.board, state.turn);
    let in_check = rules::is_in_check(&state.board, state.turn);
    for mv in &moves {
        if state.board.is_occupied_by(mv.to, state.turn) {
            return Err(format!("{mv} captures own piece"));
        }
    }
    match state.outcome {
        Outcome::Checkmate(_) if !(moves.is_empty() && in_check) => {
            Err("checkmate with moves left or no check".to_string())
        }
        Outcome::Stalemate if !(moves.is_empty() && !in_check) => {
            Err("stalemate with moves left or in check".to_string())
        }
        Outcome::Check(_) | Outcome::InProgress if moves.is_empty() => {
            Err("no legal moves but game not over".to_string())
        }
        Outcome::Check(_) if !in_check => Err("check reported without check".to_string()),
        _ => Ok(()),
    }
}

fn play_game(rng: &mut StdRng, tally: &mut Tally) -> Result<(), String> {
    let mut game = Game::new();
    for _ in 0..MAX_PLIES {
        if game.is_over() {
            break;
        }
        let moves = game.legal_moves();
        let Some(mv) = moves.choose(rng).copied() else {
            return Err("no legal moves in a live game".to_string());
        };
        game.attempt_move(mv.from, mv.to)
            .map_err(|e| format!("legal move {mv} rejected: {e}"))?;
        if game.phase() == Phase::AwaitingPromotionChoice {
            check_invariants(&game)?;
            let kind = *PieceKind::PROMOTION_CHOICES
                .choose(rng)
                .unwrap_or(&PieceKind::Queen);
            game.choose_promotion(kind)
                .map_err(|e| format!("promotion rejected: {e}"))?;
        }
        tally.plies += 1;
        check_invariants(&game)?;

        // Occasionally take a move back and replay it to exercise history.
        if rng.gen_bool(0.05) {
            let before = game.state().clone();
            if game.undo().is_some() {
                tally.undos += 1;
                game.redo().ok_or("redo unavailable after undo")?;
                if game.state() != &before {
                    return Err("undo/redo did not restore the position".to_string());
                }
            }
        }
    }

    match game.outcome() {
        Outcome::Checkmate(chess_rules::piece::Color::White) => tally.white_wins += 1,
        Outcome::Checkmate(chess_rules::piece::Color::Black) => tally.black_wins += 1,
        Outcome::Stalemate => tally.stalemates += 1,
        _ => tally.unfinished += 1,
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let games: u32 = match args.get(1).map(|s| s.parse()) {
        None => DEFAULT_GAMES,
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            eprintln!("Usage: playout [games] [seed]");
            std::process::exit(2);
        }
    };
    let seed: u64 = match args.get(2).map(|s| s.parse()) {
        None => rand::thread_rng().gen(),
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            eprintln!("Usage: playout [games] [seed]");
            std::process::exit(2);
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut tally = Tally::default();
    for i in 0..games {
        if let Err(problem) = play_game(&mut rng, &mut tally) {
            eprintln!("Game {} (seed {seed}): {problem}", i + 1);
            std::process::exit(1);
        }
    }

    println!("Seed {seed}: {games} games, {} plies, {} undo/redo checks", tally.plies, tally.undos);
    println!(
        "  White mates: {}  Black mates: {}  Stalemates: {}  Unfinished: {}",
        tally.white_wins, tally.black_wins, tally.stalemates, tally.unfinished
    );
}
