// =============================================================================
// Move geometry
//
// Pseudo-legal destination generation: where a piece may go by its movement
// pattern alone, ignoring whether its own king would be left in check. The
// legality filter in rules.rs sits on top of this.
//
// No castling, no en passant. Every generator is a pure function of
// (board, origin, mover color).
// =============================================================================

use crate::board::Board;
use crate::moves::{Move, Square};
use crate::piece::{Color, PieceKind};

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

const ROOK_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Pseudo-legal destinations of the piece on `origin`, moving as `color`.
/// Empty if the square is empty.
pub fn destinations(board: &Board, origin: Square, color: Color) -> Vec<Square> {
    let mut out = Vec::new();
    let Some(piece) = board.piece_at(origin) else {
        return out;
    };
    match piece.kind {
        PieceKind::Pawn => pawn_destinations(board, origin, color, &mut out),
        PieceKind::Rook => rook_destinations(board, origin, color, &mut out),
        PieceKind::Knight => knight_destinations(board, origin, color, &mut out),
        PieceKind::Bishop => bishop_destinations(board, origin, color, &mut out),
        PieceKind::Queen => queen_destinations(board, origin, color, &mut out),
        PieceKind::King => king_destinations(board, origin, color, &mut out),
    }
    out
}

/// Every pseudo-legal move for `color`, scanning all 64 squares.
pub fn pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (origin, _) in board.pieces(color) {
        moves.extend(
            destinations(board, origin, color)
                .into_iter()
                .map(|to| Move::new(origin, to)),
        );
    }
    moves
}

pub fn pawn_destinations(board: &Board, origin: Square, color: Color, out: &mut Vec<Square>) {
    let dir = color.pawn_direction();

    // Single push, then double push from the start rank through an empty square
    if let Some(one) = origin.offset(0, dir).filter(|s| board.is_empty_at(*s)) {
        out.push(one);
        if origin.rank() == color.pawn_start_rank() {
            if let Some(two) = one.offset(0, dir).filter(|s| board.is_empty_at(*s)) {
                out.push(two);
            }
        }
    }

    for df in [-1, 1] {
        if let Some(target) = origin.offset(df, dir) {
            if board.is_occupied_by(target, color.opposite()) {
                out.push(target);
            }
        }
    }
}

pub fn knight_destinations(board: &Board, origin: Square, color: Color, out: &mut Vec<Square>) {
    step_destinations(board, origin, color, &KNIGHT_OFFSETS, out);
}

pub fn king_destinations(board: &Board, origin: Square, color: Color, out: &mut Vec<Square>) {
    step_destinations(board, origin, color, &KING_OFFSETS, out);
}

pub fn rook_destinations(board: &Board, origin: Square, color: Color, out: &mut Vec<Square>) {
    sliding_destinations(board, origin, color, &ROOK_DIRS, out);
}

pub fn bishop_destinations(board: &Board, origin: Square, color: Color, out: &mut Vec<Square>) {
    sliding_destinations(board, origin, color, &BISHOP_DIRS, out);
}

pub fn queen_destinations(board: &Board, origin: Square, color: Color, out: &mut Vec<Square>) {
    rook_destinations(board, origin, color, out);
    bishop_destinations(board, origin, color, out);
}

fn step_destinations(
    board: &Board,
    origin: Square,
    color: Color,
    offsets: &[(i32, i32)],
    out: &mut Vec<Square>,
) {
    for &(df, dr) in offsets {
        if let Some(target) = origin.offset(df, dr) {
            if !board.is_occupied_by(target, color) {
                out.push(target);
            }
        }
    }
}

fn sliding_destinations(
    board: &Board,
    origin: Square,
    color: Color,
    directions: &[(i32, i32)],
    out: &mut Vec<Square>,
) {
    for &(df, dr) in directions {
        let mut cursor = origin.offset(df, dr);
        while let Some(target) = cursor {
            if let Some(p) = board.piece_at(target) {
                if p.color != color {
                    out.push(target);
                }
                break;
            }
            out.push(target);
            cursor = target.offset(df, dr);
        }
    }
}
