use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. Rank 0 is Black's back rank (algebraic rank 8),
/// file 0 is the a-file.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: usize, rank: usize) -> Option<Square> {
        if file < 8 && rank < 8 {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    pub fn file(self) -> usize {
        self.file as usize
    }

    pub fn rank(self) -> usize {
        self.rank as usize
    }

    /// The square `(df, dr)` away, or `None` if that falls off the board.
    pub fn offset(self, df: i32, dr: i32) -> Option<Square> {
        let file = self.file as i32 + df;
        let rank = self.rank as i32 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Square::new(file as usize, rank as usize)
        } else {
            None
        }
    }

    /// All 64 squares, rank 0 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }

    /// Parse an algebraic name such as "e2".
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase().checked_sub(b'a')?;
        let rank_digit = bytes[1].checked_sub(b'1')?;
        if file >= 8 || rank_digit >= 8 {
            return None;
        }
        Square::new(file as usize, 7 - rank_digit as usize)
    }
}

impl TryFrom<(u8, u8)> for Square {
    type Error = String;

    fn try_from((file, rank): (u8, u8)) -> Result<Self, Self::Error> {
        Square::new(file as usize, rank as usize)
            .ok_or_else(|| format!("square ({file}, {rank}) is off the board"))
    }
}

impl From<Square> for (u8, u8) {
    fn from(square: Square) -> Self {
        (square.file, square.rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file) as char;
        let rank = (b'8' - self.rank) as char;
        write!(f, "{file}{rank}")
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Convert to coordinate notation, e.g. "e2e4"
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    /// Parse from coordinate notation. Anything past the first four
    /// characters (such as a promotion letter) is left to the caller.
    pub fn from_uci(s: &str) -> Option<Move> {
        let from = Square::from_algebraic(s.get(0..2)?)?;
        let to = Square::from_algebraic(s.get(2..4)?)?;
        Some(Move { from, to })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}
