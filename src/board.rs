use std::fmt;

use serde::{Deserialize, Serialize};

use crate::moves::{Move, Square};
use crate::piece::{Color, Piece, PieceKind};

/// The 8×8 grid, indexed `squares[rank][file]`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting position. Black occupies ranks 0-1, White ranks 6-7.
    pub fn new() -> Self {
        let mut squares = [[None; 8]; 8];

        for (file, kind) in BACK_RANK.iter().enumerate() {
            squares[0][file] = Some(Piece::new(*kind, Color::Black));
            squares[7][file] = Some(Piece::new(*kind, Color::White));
        }
        for sq in &mut squares[1] {
            *sq = Some(Piece::new(PieceKind::Pawn, Color::Black));
        }
        for sq in &mut squares[6] {
            *sq = Some(Piece::new(PieceKind::Pawn, Color::White));
        }

        Board { squares }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank()][square.file()]
    }

    pub fn set(&mut self, square: Square, cell: Option<Piece>) {
        self.squares[square.rank()][square.file()] = cell;
    }

    pub fn is_empty_at(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// True if `square` holds a piece of `color`.
    pub fn is_occupied_by(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Every piece of `color`, in square order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|p| p.color == color)
                .map(|p| (sq, p))
        })
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Move the piece on `mv.from` to `mv.to`, clearing the origin. No rule
    /// checking happens here. Returns whatever stood on the destination.
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        let moving = self.piece_at(mv.from);
        let captured = self.piece_at(mv.to);
        self.set(mv.to, moving);
        self.set(mv.from, None);
        captured
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, row) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - rank)?;
            for cell in row {
                let c = cell.map(|p| p.symbol()).unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(file: usize, rank: usize) -> Square {
        Square::new(file, rank).expect("test square on board")
    }

    #[test]
    fn initial_position_has_one_king_per_side() {
        let board = Board::new();
        assert_eq!(board.find_king(Color::White), Some(sq(4, 7)));
        assert_eq!(board.find_king(Color::Black), Some(sq(4, 0)));
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
        assert_eq!(
            board.piece_at(sq(3, 7)),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
    }

    #[test]
    fn apply_relocates_and_reports_capture() {
        let mut board = Board::empty();
        let rook = Piece::new(PieceKind::Rook, Color::White);
        let pawn = Piece::new(PieceKind::Pawn, Color::Black);
        board.set(sq(0, 7), Some(rook));
        board.set(sq(0, 1), Some(pawn));

        let captured = board.apply(&Move::new(sq(0, 7), sq(0, 1)));
        assert_eq!(captured, Some(pawn));
        assert!(board.is_empty_at(sq(0, 7)));
        assert_eq!(board.piece_at(sq(0, 1)), Some(rook));
        assert!(board.is_occupied_by(sq(0, 1), Color::White));
        assert!(!board.is_occupied_by(sq(0, 1), Color::Black));
        assert!(!board.is_occupied_by(sq(0, 7), Color::White));
    }

    #[test]
    fn diagram_starts_at_rank_eight() {
        let text = Board::new().to_string();
        let first = text.lines().next().unwrap_or_default();
        assert_eq!(first, "8  r n b q k b n r");
        assert!(text.ends_with("a b c d e f g h"));
    }
}
