// =============================================================================
// Game state machine
//
// A `Game` owns the committed position, the undo/redo history, the options
// and the shell's current selection. Four entry points change it:
// attempt_move, choose_promotion, undo and redo (click is a thin wrapper
// over attempt_move). Each either applies completely or returns an error
// and leaves everything untouched.
//
// Turn flow:
//   AwaitingSelection --attempt_move--> AwaitingSelection       (turn passes)
//   AwaitingSelection --attempt_move--> AwaitingPromotionChoice (pawn on last rank)
//   AwaitingPromotionChoice --choose_promotion--> AwaitingSelection (turn passes)
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{MoveError, PositionError};
use crate::history::{History, Snapshot};
use crate::moves::{Move, Square};
use crate::piece::{Color, Piece, PieceKind};
use crate::rules::{self, Outcome};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameOptions {
    /// Maximum number of undo steps kept. `None` keeps the whole game.
    pub history_limit: Option<usize>,
    /// Re-evaluate check/mate/stalemate after undo and redo. Turning this
    /// off keeps whatever outcome was showing before the rollback.
    pub recompute_outcome_on_history: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl GameOptions {
    pub fn new() -> Self {
        GameOptions {
            history_limit: None,
            recompute_outcome_on_history: true,
        }
    }
}

// =============================================================================
// State
// =============================================================================

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingSelection,
    /// A pawn stands on its last rank and the mover must pick its new kind.
    AwaitingPromotionChoice,
}

/// The committed position. `pending_promotion` is `Some` exactly when
/// `phase` is `AwaitingPromotionChoice`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub phase: Phase,
    pub outcome: Outcome,
    pub pending_promotion: Option<Square>,
    pub last_move: Option<Move>,
    /// Captured pieces in capture order.
    pub captured: Vec<Piece>,
}

/// What a click did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Click {
    /// An own piece is now selected.
    Selected(Square),
    /// The selected piece moved.
    Moved(Move),
    /// The attempted move was refused; the selection was dropped.
    Rejected(MoveError),
    /// Nothing happened.
    Ignored,
}

pub struct Game {
    state: GameState,
    history: History,
    options: GameOptions,
    selected: Option<Square>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard initial position, White to move.
pub fn new_game() -> Game {
    Game::new()
}

impl Game {
    pub fn new() -> Self {
        Self::with_options(GameOptions::new())
    }

    pub fn with_options(options: GameOptions) -> Self {
        Self::start(Board::new(), Color::White, options)
    }

    /// Start from an arbitrary position with `turn` on move. The board must
    /// hold one king per side, and the side not on move must not be in check.
    pub fn from_position(board: Board, turn: Color) -> Result<Self, PositionError> {
        Self::from_position_with_options(board, turn, GameOptions::new())
    }

    pub fn from_position_with_options(
        board: Board,
        turn: Color,
        options: GameOptions,
    ) -> Result<Self, PositionError> {
        for color in [Color::White, Color::Black] {
            let count = board
                .pieces(color)
                .filter(|(_, p)| p.kind == PieceKind::King)
                .count();
            if count != 1 {
                return Err(PositionError::KingCount { color, count });
            }
        }
        if rules::is_in_check(&board, turn.opposite()) {
            return Err(PositionError::OpponentInCheck(turn.opposite()));
        }
        Ok(Self::start(board, turn, options))
    }

    fn start(board: Board, turn: Color, options: GameOptions) -> Self {
        let outcome = rules::evaluate_outcome(&board, turn);
        Game {
            state: GameState {
                board,
                turn,
                phase: Phase::AwaitingSelection,
                outcome,
                pending_promotion: None,
                last_move: None,
                captured: Vec::new(),
            },
            history: History::with_limit(options.history_limit),
            options,
            selected: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.state.board.piece_at(square)
    }

    pub fn turn(&self) -> Color {
        self.state.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.state.pending_promotion
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn can_undo(&self) -> bool {
        self.state.phase == Phase::AwaitingSelection && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.phase == Phase::AwaitingSelection && self.history.can_redo()
    }

    pub fn is_over(&self) -> bool {
        self.state.outcome.is_terminal()
    }

    /// Legal moves for the side on move. Empty once the game is over or
    /// while a promotion is pending.
    pub fn legal_moves(&self) -> Vec<Move> {
        if !self.accepts_moves() {
            return Vec::new();
        }
        rules::legal_moves(&self.state.board, self.state.turn)
    }

    /// Where the piece on `origin` may legally go, for move highlighting.
    /// Empty unless it is the mover's piece and the game accepts moves.
    pub fn legal_destinations(&self, origin: Square) -> Vec<Square> {
        if !self.accepts_moves() {
            return Vec::new();
        }
        rules::legal_destinations_from(&self.state.board, origin, self.state.turn)
    }

    /// True if `mv` takes a pawn onto its last rank. Says nothing about
    /// whether the move is legal.
    pub fn is_promotion_move(&self, mv: &Move) -> bool {
        self.state.board.piece_at(mv.from).is_some_and(|p| {
            p.kind == PieceKind::Pawn && mv.to.rank() == p.color.promotion_rank()
        })
    }

    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<&GameState, MoveError> {
        if self.state.outcome.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if self.state.phase == Phase::AwaitingPromotionChoice {
            return Err(MoveError::PromotionPending);
        }
        let piece = self.state.board.piece_at(from).ok_or(MoveError::EmptySquare)?;
        if piece.color != self.state.turn {
            return Err(MoveError::NotYourTurn);
        }
        let mv = Move::new(from, to);
        if !rules::is_legal(&self.state.board, &mv, self.state.turn) {
            return Err(MoveError::IllegalMove);
        }

        let snapshot = self.snapshot();
        self.history.record(snapshot);
        self.selected = None;

        if let Some(captured) = self.state.board.apply(&mv) {
            self.state.captured.push(captured);
        }
        self.state.last_move = Some(mv);

        if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() {
            self.state.phase = Phase::AwaitingPromotionChoice;
            self.state.pending_promotion = Some(to);
        } else {
            self.pass_turn();
        }
        Ok(&self.state)
    }

    /// Replace the pawn waiting on its last rank with `kind` and finish the
    /// turn.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<&GameState, MoveError> {
        let square = match (self.state.phase, self.state.pending_promotion) {
            (Phase::AwaitingPromotionChoice, Some(square)) => square,
            _ => return Err(MoveError::NoPendingPromotion),
        };
        if !kind.is_promotion_choice() {
            return Err(MoveError::InvalidPromotion(kind));
        }

        self.state
            .board
            .set(square, Some(Piece::new(kind, self.state.turn)));
        self.state.pending_promotion = None;
        self.state.phase = Phase::AwaitingSelection;
        self.pass_turn();
        Ok(&self.state)
    }

    /// Roll back one committed move. `None` if there is nothing to undo or a
    /// promotion is pending.
    pub fn undo(&mut self) -> Option<&GameState> {
        if self.state.phase == Phase::AwaitingPromotionChoice {
            return None;
        }
        let current = self.snapshot();
        let previous = self.history.undo(current)?;
        self.restore(previous);
        Some(&self.state)
    }

    /// Re-apply the most recently undone move. `None` if there is nothing to
    /// redo or a promotion is pending.
    pub fn redo(&mut self) -> Option<&GameState> {
        if self.state.phase == Phase::AwaitingPromotionChoice {
            return None;
        }
        let current = self.snapshot();
        let next = self.history.redo(current)?;
        self.restore(next);
        Some(&self.state)
    }

    /// Click-to-move. With nothing selected, selects one of the mover's
    /// pieces. With a selection, tries to move it to `square`; the
    /// selection is dropped either way.
    pub fn click(&mut self, square: Square) -> Click {
        if !self.accepts_moves() {
            return Click::Ignored;
        }
        match self.selected.take() {
            Some(from) => match self.attempt_move(from, square) {
                Ok(_) => Click::Moved(Move::new(from, square)),
                Err(err) => Click::Rejected(err),
            },
            None => {
                if self.state.board.is_occupied_by(square, self.state.turn) {
                    self.selected = Some(square);
                    Click::Selected(square)
                } else {
                    Click::Ignored
                }
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn accepts_moves(&self) -> bool {
        self.state.phase == Phase::AwaitingSelection && !self.state.outcome.is_terminal()
    }

    fn pass_turn(&mut self) {
        self.state.turn = self.state.turn.opposite();
        self.state.outcome = rules::evaluate_outcome(&self.state.board, self.state.turn);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.state.board.clone(),
            turn: self.state.turn,
            last_move: self.state.last_move,
            captured: self.state.captured.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.state.board = snapshot.board;
        self.state.turn = snapshot.turn;
        self.state.last_move = snapshot.last_move;
        self.state.captured = snapshot.captured;
        self.state.phase = Phase::AwaitingSelection;
        self.state.pending_promotion = None;
        self.selected = None;
        if self.options.recompute_outcome_on_history {
            self.state.outcome = rules::evaluate_outcome(&self.state.board, self.state.turn);
        }
    }
}
