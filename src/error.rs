use crate::piece::{Color, PieceKind};

/// Why a request to the game was turned down. A rejected request never
/// changes the game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The origin square holds no piece.
    #[error("there is no piece on that square")]
    EmptySquare,
    /// The origin piece belongs to the side not on move.
    #[error("that piece belongs to the other player")]
    NotYourTurn,
    /// The destination is not among the origin piece's legal moves.
    #[error("illegal move")]
    IllegalMove,
    /// The game has ended in checkmate or stalemate.
    #[error("the game is already over")]
    GameOver,
    /// `choose_promotion` was called with no pawn waiting.
    #[error("no pawn is waiting to be promoted")]
    NoPendingPromotion,
    /// A pawn is waiting on the last rank; only a promotion choice is
    /// accepted. Shells that only know the five basic rejections can treat
    /// this like `IllegalMove`.
    #[error("choose a promotion piece first")]
    PromotionPending,
    /// Pawns promote only to queen, rook, bishop or knight.
    #[error("a pawn cannot promote to a {0}")]
    InvalidPromotion(PieceKind),
}

/// Why a starting position was refused by `Game::from_position`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The board must hold exactly one king of each color.
    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },
    /// The side not on move is already in check, so its king could be taken.
    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Color),
}
