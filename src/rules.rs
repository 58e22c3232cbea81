// =============================================================================
// Check detection and legal move filtering
//
// A move is legal when it is pseudo-legal (movegen.rs) and leaves the
// mover's own king unattacked. Each candidate is tried on a scratch copy of
// the board; the live board is only ever read.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::movegen;
use crate::moves::{Move, Square};
use crate::piece::{Color, Piece, PieceKind};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    /// The named side is in check but has a way out.
    Check(Color),
    /// The named side delivered mate.
    Checkmate(Color),
    Stalemate,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        matches!(self, Outcome::Checkmate(_) | Outcome::Stalemate)
    }

    /// Short human-readable status line for shells.
    pub fn message(self) -> String {
        match self {
            Outcome::InProgress => "In progress".to_string(),
            Outcome::Check(color) => format!("{color} is in check"),
            Outcome::Checkmate(winner) => format!("Checkmate, {winner} wins"),
            Outcome::Stalemate => "Stalemate, draw".to_string(),
        }
    }
}

/// True if `color`'s king is attacked by any opposing piece.
///
/// Panics if `color` has no king: that board is corrupt and cannot arise
/// through `Game`.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let king = board
        .find_king(color)
        .unwrap_or_else(|| panic!("no {color} king on the board:\n{board}"));
    is_square_attacked_by(board, king, color.opposite())
}

/// True if any pseudo-legal move of `attacker` lands on `target`.
pub fn is_square_attacked_by(board: &Board, target: Square, attacker: Color) -> bool {
    board
        .pieces(attacker)
        .any(|(origin, _)| movegen::destinations(board, origin, attacker).contains(&target))
}

/// Every legal move for `color`.
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    movegen::pseudo_legal_moves(board, color)
        .into_iter()
        .filter(|mv| !leaves_king_in_check(board, mv, color))
        .collect()
}

/// Legal destinations from a single origin. Empty unless `origin` holds a
/// piece of `color`.
pub fn legal_destinations_from(board: &Board, origin: Square, color: Color) -> Vec<Square> {
    if !board.is_occupied_by(origin, color) {
        return Vec::new();
    }
    movegen::destinations(board, origin, color)
        .into_iter()
        .filter(|to| !leaves_king_in_check(board, &Move::new(origin, *to), color))
        .collect()
}

pub fn is_legal(board: &Board, mv: &Move, color: Color) -> bool {
    legal_destinations_from(board, mv.from, color).contains(&mv.to)
}

pub fn has_legal_move(board: &Board, color: Color) -> bool {
    movegen::pseudo_legal_moves(board, color)
        .iter()
        .any(|mv| !leaves_king_in_check(board, mv, color))
}

fn leaves_king_in_check(board: &Board, mv: &Move, color: Color) -> bool {
    let mut scratch = board.clone();
    scratch.apply(mv);
    auto_queen(&mut scratch, mv.to);
    is_in_check(&scratch, color)
}

// Pawns reaching the last rank on a scratch board stand in as queens so the
// simulated position never holds a back-rank pawn.
fn auto_queen(scratch: &mut Board, square: Square) {
    if let Some(p) = scratch.piece_at(square) {
        if p.kind == PieceKind::Pawn && square.rank() == p.color.promotion_rank() {
            scratch.set(square, Some(Piece::new(PieceKind::Queen, p.color)));
        }
    }
}

/// Status of the position with `to_move` on move.
pub fn evaluate_outcome(board: &Board, to_move: Color) -> Outcome {
    let in_check = is_in_check(board, to_move);
    match (has_legal_move(board, to_move), in_check) {
        (false, true) => Outcome::Checkmate(to_move.opposite()),
        (false, false) => Outcome::Stalemate,
        (true, true) => Outcome::Check(to_move),
        (true, false) => Outcome::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).expect("test square on board")
    }

    fn place(board: &mut Board, name: &str, kind: PieceKind, color: Color) {
        board.set(sq(name), Some(Piece::new(kind, color)));
    }

    #[test]
    fn initial_position_is_quiet() {
        let board = Board::new();
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
        assert_eq!(legal_moves(&board, Color::White).len(), 20);
        assert_eq!(evaluate_outcome(&board, Color::White), Outcome::InProgress);
    }

    #[test]
    fn rook_on_open_file_gives_check() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "a8", PieceKind::King, Color::Black);
        place(&mut board, "e8", PieceKind::Rook, Color::Black);
        assert!(is_in_check(&board, Color::White));

        place(&mut board, "e4", PieceKind::Pawn, Color::White);
        assert!(!is_in_check(&board, Color::White));
    }

    #[test]
    fn pawns_only_check_diagonally() {
        let mut board = Board::empty();
        place(&mut board, "e4", PieceKind::King, Color::White);
        place(&mut board, "a8", PieceKind::King, Color::Black);
        place(&mut board, "e5", PieceKind::Pawn, Color::Black);
        assert!(!is_in_check(&board, Color::White));
        place(&mut board, "d5", PieceKind::Pawn, Color::Black);
        assert!(is_in_check(&board, Color::White));
    }

    #[test]
    #[should_panic(expected = "no White king")]
    fn missing_king_is_fatal() {
        let board = Board::empty();
        is_in_check(&board, Color::White);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "e2", PieceKind::Bishop, Color::White);
        place(&mut board, "e8", PieceKind::Rook, Color::Black);
        place(&mut board, "a8", PieceKind::King, Color::Black);

        assert!(!is_in_check(&board, Color::White));
        assert!(movegen::destinations(&board, sq("e2"), Color::White).contains(&sq("d3")));
        assert!(legal_destinations_from(&board, sq("e2"), Color::White).is_empty());
        assert!(!is_legal(&board, &Move::new(sq("e2"), sq("d3")), Color::White));
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "d8", PieceKind::Rook, Color::Black);
        place(&mut board, "a8", PieceKind::King, Color::Black);
        let dests = legal_destinations_from(&board, sq("e1"), Color::White);
        assert!(!dests.contains(&sq("d1")));
        assert!(!dests.contains(&sq("d2")));
        assert!(dests.contains(&sq("f2")));
    }

    #[test]
    fn back_rank_mate_is_checkmate() {
        let mut board = Board::empty();
        place(&mut board, "a8", PieceKind::King, Color::Black);
        place(&mut board, "b6", PieceKind::King, Color::White);
        place(&mut board, "b7", PieceKind::Queen, Color::White);
        assert!(is_in_check(&board, Color::Black));
        assert!(legal_moves(&board, Color::Black).is_empty());
        assert_eq!(
            evaluate_outcome(&board, Color::Black),
            Outcome::Checkmate(Color::White)
        );
    }

    #[test]
    fn cornered_king_without_check_is_stalemate() {
        let mut board = Board::empty();
        place(&mut board, "a8", PieceKind::King, Color::Black);
        place(&mut board, "c7", PieceKind::Queen, Color::White);
        place(&mut board, "e1", PieceKind::King, Color::White);
        assert!(!is_in_check(&board, Color::Black));
        assert!(legal_moves(&board, Color::Black).is_empty());
        assert_eq!(evaluate_outcome(&board, Color::Black), Outcome::Stalemate);
    }

    #[test]
    fn check_with_escape_is_check() {
        let mut board = Board::empty();
        place(&mut board, "e8", PieceKind::King, Color::Black);
        place(&mut board, "e1", PieceKind::Rook, Color::White);
        place(&mut board, "a1", PieceKind::King, Color::White);
        assert_eq!(evaluate_outcome(&board, Color::Black), Outcome::Check(Color::Black));
    }

    #[test]
    fn back_rank_pawn_answers_check_by_capture_or_block() {
        let mut board = Board::empty();
        place(&mut board, "h8", PieceKind::King, Color::White);
        place(&mut board, "g6", PieceKind::King, Color::Black);
        place(&mut board, "a8", PieceKind::Rook, Color::Black);
        place(&mut board, "b7", PieceKind::Pawn, Color::White);
        assert!(is_in_check(&board, Color::White));

        let mut moves = legal_moves(&board, Color::White);
        moves.sort_by_key(|m| m.to);
        assert_eq!(
            moves,
            vec![Move::new(sq("b7"), sq("a8")), Move::new(sq("b7"), sq("b8"))]
        );
        // The scratch promotion never reaches the live board.
        assert_eq!(board.piece_at(sq("b7")).map(|p| p.kind), Some(PieceKind::Pawn));
    }

    /// Random games from the opening, checked after every ply.
    #[test]
    fn random_playouts_respect_legality_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..8 {
            let mut board = Board::new();
            let mut to_move = Color::White;
            for _ in 0..80 {
                let moves = legal_moves(&board, to_move);
                for mv in &moves {
                    assert!(
                        !board.is_occupied_by(mv.to, to_move),
                        "{mv} lands on own piece\n{board}"
                    );
                    let mut after = board.clone();
                    after.apply(mv);
                    auto_queen(&mut after, mv.to);
                    assert!(!is_in_check(&after, to_move), "{mv} leaves king in check\n{board}");
                }

                let outcome = evaluate_outcome(&board, to_move);
                match outcome {
                    Outcome::Checkmate(_) => {
                        assert!(moves.is_empty() && is_in_check(&board, to_move));
                        break;
                    }
                    Outcome::Stalemate => {
                        assert!(moves.is_empty() && !is_in_check(&board, to_move));
                        break;
                    }
                    _ => assert!(!moves.is_empty()),
                }

                let Some(mv) = moves.choose(&mut rng) else {
                    break;
                };
                board.apply(mv);
                auto_queen(&mut board, mv.to);
                to_move = to_move.opposite();
            }
        }
    }
}
