use crate::error::MoveError;
use crate::game::{Click, Game as RulesGame, Phase};
use crate::moves::Square;
use crate::piece::PieceKind;
use crate::rules::Outcome;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct MoveJson {
    from: [usize; 2],
    to: [usize; 2],
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    game_over: bool,
    result: Option<String>,
    status: String,
    is_in_check: bool,
    awaiting_promotion: Option<[usize; 2]>,
    selected: Option<[usize; 2]>,
    can_undo: bool,
    can_redo: bool,
    captured: Vec<SquarePiece>,
    last_move: Option<MoveJson>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn coords(square: Square) -> [usize; 2] {
    [square.file(), square.rank()]
}

fn string_to_piece_kind(s: &str) -> Option<PieceKind> {
    match s {
        "Queen" => Some(PieceKind::Queen),
        "Rook" => Some(PieceKind::Rook),
        "Bishop" => Some(PieceKind::Bishop),
        "Knight" => Some(PieceKind::Knight),
        _ => None,
    }
}

fn build_board_state(game: &RulesGame) -> BoardState {
    let state = game.state();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8)
        .map(|rank| {
            (0..8)
                .map(|file| {
                    Square::new(file, rank)
                        .and_then(|sq| state.board.piece_at(sq))
                        .map(|p| SquarePiece {
                            piece_type: p.kind.to_string(),
                            color: p.color.to_string(),
                        })
                })
                .collect()
        })
        .collect();

    let result = match state.outcome {
        Outcome::Checkmate(winner) => Some(format!("{winner} wins")),
        Outcome::Stalemate => Some("Draw".to_string()),
        _ => None,
    };

    BoardState {
        squares,
        current_turn: state.turn.to_string(),
        game_over: state.outcome.is_terminal(),
        result,
        status: state.outcome.message(),
        is_in_check: matches!(state.outcome, Outcome::Check(_) | Outcome::Checkmate(_)),
        awaiting_promotion: match state.phase {
            Phase::AwaitingPromotionChoice => state.pending_promotion.map(coords),
            Phase::AwaitingSelection => None,
        },
        selected: game.selected().map(coords),
        can_undo: game.can_undo(),
        can_redo: game.can_redo(),
        captured: state
            .captured
            .iter()
            .map(|p| SquarePiece {
                piece_type: p.kind.to_string(),
                color: p.color.to_string(),
            })
            .collect(),
        last_move: state.last_move.map(|m| MoveJson {
            from: coords(m.from),
            to: coords(m.to),
        }),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn respond(game: &RulesGame, outcome: Result<(), String>) -> JsValue {
    let result = match outcome {
        Ok(()) => MoveResult {
            board_state: Some(build_board_state(game)),
            error: None,
        },
        Err(error) => MoveResult {
            board_state: None,
            error: Some(error),
        },
    };
    to_js(&result)
}

#[wasm_bindgen]
pub struct Game {
    inner: RulesGame,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            inner: RulesGame::new(),
        }
    }

    pub fn build_info(&self) -> String {
        format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIMESTAMP"))
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.inner))
    }

    pub fn make_move(
        &mut self,
        from_file: usize,
        from_rank: usize,
        to_file: usize,
        to_rank: usize,
    ) -> JsValue {
        let (Some(from), Some(to)) = (Square::new(from_file, from_rank), Square::new(to_file, to_rank))
        else {
            return respond(&self.inner, Err("Square is off the board".to_string()));
        };
        let outcome = self
            .inner
            .attempt_move(from, to)
            .map(|_| ())
            .map_err(|e: MoveError| e.to_string());
        respond(&self.inner, outcome)
    }

    pub fn choose_promotion(&mut self, piece: &str) -> JsValue {
        let Some(kind) = string_to_piece_kind(piece) else {
            return respond(&self.inner, Err(format!("Unknown promotion piece: {piece}")));
        };
        let outcome = self
            .inner
            .choose_promotion(kind)
            .map(|_| ())
            .map_err(|e| e.to_string());
        respond(&self.inner, outcome)
    }

    pub fn click(&mut self, file: usize, rank: usize) -> JsValue {
        let Some(square) = Square::new(file, rank) else {
            return respond(&self.inner, Err("Square is off the board".to_string()));
        };
        let outcome = match self.inner.click(square) {
            Click::Rejected(err) => Err(err.to_string()),
            Click::Selected(_) | Click::Moved(_) | Click::Ignored => Ok(()),
        };
        respond(&self.inner, outcome)
    }

    pub fn undo(&mut self) -> JsValue {
        let outcome = match self.inner.undo() {
            Some(_) => Ok(()),
            None => Err("Nothing to undo".to_string()),
        };
        respond(&self.inner, outcome)
    }

    pub fn redo(&mut self) -> JsValue {
        let outcome = match self.inner.redo() {
            Some(_) => Ok(()),
            None => Err("Nothing to redo".to_string()),
        };
        respond(&self.inner, outcome)
    }

    pub fn get_legal_moves_for_square(&self, file: usize, rank: usize) -> JsValue {
        let destinations: Vec<[usize; 2]> = Square::new(file, rank)
            .map(|sq| self.inner.legal_destinations(sq))
            .unwrap_or_default()
            .into_iter()
            .map(coords)
            .collect();
        to_js(&destinations)
    }
}
