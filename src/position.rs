//! Position adapter over the `chess` crate.
//!
//! The rules library owns move generation and legality; this wrapper adds the
//! pieces the engine needs on top: FEN move counters, terminal-state queries
//! beyond mate/stalemate, and coordinate/SAN notation.
//!
//! Positions are copy-make: `play` returns a new value and never touches the
//! original, so recursive search cannot alias state across calls.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::types::{
    captured_piece, Board, BoardStatus, Color, File, Hash, Move, MoveGen, Piece, Square, BitBoard,
    EMPTY,
};

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

/// Terminal state of a position, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl GameStatus {
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }

    #[inline]
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate | GameStatus::InsufficientMaterial | GameStatus::FiftyMoveRule
        )
    }
}

/// A board plus the move counters the rules library does not track.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    /// Wrap a board with fresh counters.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parse a FEN string. Missing trailing fields fall back to `- - 0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let invalid = |reason: &str| EngineError::InvalidPosition {
            fen: fen.to_string(),
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(invalid("expected at least piece placement and side to move"));
        }

        let side = fields[1];
        let castling = fields.get(2).copied().unwrap_or("-");
        let en_passant = fields.get(3).copied().unwrap_or("-");
        check_placement(fields[0]).map_err(invalid)?;
        check_side(side).map_err(invalid)?;
        check_castling(castling).map_err(invalid)?;
        check_en_passant(en_passant, side).map_err(invalid)?;

        let placement = format!("{} {} {} {}", fields[0], side, castling, en_passant);
        let board = Board::from_str(&placement).map_err(|e| invalid(&format!("{:?}", e)))?;

        let halfmove_clock = match fields.get(4) {
            Some(f) => f.parse().map_err(|_| invalid("bad half-move clock"))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(f) => f.parse::<u32>().map_err(|_| invalid("bad full-move number"))?.max(1),
            None => 1,
        };

        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Position identity used by the transposition table and opening book.
    #[inline]
    pub fn fingerprint(&self) -> Hash {
        self.board.get_hash()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board).collect()
    }

    #[inline]
    pub fn legal_move_count(&self) -> usize {
        MoveGen::new_legal(&self.board).len()
    }

    #[inline]
    pub fn is_legal(&self, m: Move) -> bool {
        self.board.legal(m)
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    /// Apply a legal move, returning the successor position.
    pub fn play(&self, m: Move) -> Position {
        let resets_clock =
            self.board.piece_on(m.get_source()) == Some(Piece::Pawn) || captured_piece(&self.board, m).is_some();
        let fullmove_number = if self.side_to_move() == Color::Black {
            self.fullmove_number.saturating_add(1)
        } else {
            self.fullmove_number
        };

        Position {
            board: self.board.make_move_new(m),
            halfmove_clock: if resets_clock { 0 } else { self.halfmove_clock.saturating_add(1) },
            fullmove_number,
        }
    }

    /// Apply a move after checking it against the legal-move set.
    pub fn try_play(&self, m: Move) -> Result<Position, EngineError> {
        if self.is_legal(m) {
            Ok(self.play(m))
        } else {
            Err(EngineError::IllegalMove(m.to_string()))
        }
    }

    pub fn status(&self) -> GameStatus {
        match self.board.status() {
            BoardStatus::Checkmate => GameStatus::Checkmate,
            BoardStatus::Stalemate => GameStatus::Stalemate,
            BoardStatus::Ongoing => {
                if has_insufficient_material(&self.board) {
                    GameStatus::InsufficientMaterial
                } else if self.halfmove_clock >= 100 {
                    GameStatus::FiftyMoveRule
                } else {
                    GameStatus::Ongoing
                }
            }
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }

    pub fn to_fen(&self) -> String {
        let board_fen = self.board.to_string();
        let head: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!("{} {} {}", head.join(" "), self.halfmove_clock, self.fullmove_number)
    }

    /// Find the legal move written in coordinate notation (e2e4, e7e8q).
    pub fn parse_uci(&self, text: &str) -> Option<Move> {
        let text = text.trim();
        if text.len() < 4 || !text.is_ascii() {
            return None;
        }
        let from = Square::from_str(&text[0..2]).ok()?;
        let to = Square::from_str(&text[2..4]).ok()?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some('q') | Some('Q') => Some(Piece::Queen),
            Some('r') | Some('R') => Some(Piece::Rook),
            Some('b') | Some('B') => Some(Piece::Bishop),
            Some('n') | Some('N') => Some(Piece::Knight),
            Some(_) => return None,
        };
        let m = Move::new(from, to, promotion);
        if self.is_legal(m) {
            Some(m)
        } else {
            None
        }
    }

    /// Standard algebraic notation for a legal move.
    pub fn to_san(&self, m: Move) -> Result<String, EngineError> {
        if !self.is_legal(m) {
            return Err(EngineError::Notation(format!("{} is not legal here", m)));
        }
        let board = &self.board;
        let piece = board
            .piece_on(m.get_source())
            .ok_or_else(|| EngineError::Notation(format!("no piece on {}", m.get_source())))?;

        let mut san = String::with_capacity(8);
        let from = m.get_source();
        let to = m.get_dest();
        let file_distance = (from.get_file().to_index() as i32 - to.get_file().to_index() as i32).abs();

        if piece == Piece::King && file_distance == 2 {
            san.push_str(if to.get_file() == File::G { "O-O" } else { "O-O-O" });
        } else {
            let capture = captured_piece(board, m).is_some();
            if piece == Piece::Pawn {
                if capture {
                    san.push(file_char(from));
                }
            } else {
                san.push(piece_letter(piece));
                san.push_str(&disambiguation(board, m, piece));
            }
            if capture {
                san.push('x');
            }
            san.push_str(&to.to_string());
            if let Some(promo) = m.get_promotion() {
                san.push('=');
                san.push(piece_letter(promo));
            }
        }

        let after = board.make_move_new(m);
        if after.status() == BoardStatus::Checkmate {
            san.push('#');
        } else if *after.checkers() != EMPTY {
            san.push('+');
        }
        Ok(san)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// Board part of a FEN: eight ranks of eight files, one king per side and
/// no pawns on the back ranks. The rules library assumes all of this holds.
fn check_placement(placement: &str) -> Result<(), &'static str> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err("placement must have 8 ranks");
    }

    let mut kings = [0u32; 2];
    for (i, rank) in ranks.iter().enumerate() {
        let mut files = 0u32;
        for c in rank.chars() {
            match c {
                '1'..='8' => files += c as u32 - '0' as u32,
                'P' | 'p' if i == 0 || i == 7 => return Err("pawn on a back rank"),
                'K' => {
                    kings[0] += 1;
                    files += 1;
                }
                'k' => {
                    kings[1] += 1;
                    files += 1;
                }
                'P' | 'N' | 'B' | 'R' | 'Q' | 'p' | 'n' | 'b' | 'r' | 'q' => files += 1,
                _ => return Err("unknown piece letter"),
            }
            if files > 8 {
                return Err("rank has more than 8 files");
            }
        }
        if files != 8 {
            return Err("rank has fewer than 8 files");
        }
    }

    if kings != [1, 1] {
        return Err("each side needs exactly one king");
    }
    Ok(())
}

fn check_side(side: &str) -> Result<(), &'static str> {
    match side {
        "w" | "b" => Ok(()),
        _ => Err("side to move must be w or b"),
    }
}

fn check_castling(castling: &str) -> Result<(), &'static str> {
    if castling == "-" {
        return Ok(());
    }
    let mut seen = Vec::with_capacity(4);
    for c in castling.chars() {
        if !matches!(c, 'K' | 'Q' | 'k' | 'q') || seen.contains(&c) {
            return Err("bad castling field");
        }
        seen.push(c);
    }
    if seen.is_empty() {
        return Err("bad castling field");
    }
    Ok(())
}

/// The target square sits behind a pawn that just moved two squares.
fn check_en_passant(square: &str, side: &str) -> Result<(), &'static str> {
    if square == "-" {
        return Ok(());
    }
    let target = Square::from_str(square).map_err(|_| "bad en passant square")?;
    let expected = if side == "w" { 5 } else { 2 };
    if square.len() != 2 || target.get_rank().to_index() != expected {
        return Err("en passant square on the wrong rank");
    }
    Ok(())
}

/// Coordinate notation for any move.
#[inline]
pub fn to_uci(m: Move) -> String {
    m.to_string()
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(sq: Square) -> char {
    (b'a' + sq.get_file().to_index() as u8) as char
}

fn rank_char(sq: Square) -> char {
    (b'1' + sq.get_rank().to_index() as u8) as char
}

/// Minimal origin hint when another piece of the same kind reaches `to`.
fn disambiguation(board: &Board, m: Move, piece: Piece) -> String {
    let from = m.get_source();
    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|other| {
            other.get_dest() == m.get_dest()
                && other.get_source() != from
                && board.piece_on(other.get_source()) == Some(piece)
        })
        .map(|other| other.get_source())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.get_file() != from.get_file()) {
        file_char(from).to_string()
    } else if rivals.iter().all(|sq| sq.get_rank() != from.get_rank()) {
        rank_char(from).to_string()
    } else {
        format!("{}{}", file_char(from), rank_char(from))
    }
}

/// Dead positions the rules library does not flag on its own.
pub(crate) fn has_insufficient_material(board: &Board) -> bool {
    let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy != EMPTY {
        return false;
    }

    let knights = *board.pieces(Piece::Knight);
    let bishops = *board.pieces(Piece::Bishop);
    let minors = (knights | bishops).popcnt();
    if minors <= 1 {
        return true;
    }

    // K+B v K+B with both bishops on the same square colour
    if knights == EMPTY && minors == 2 {
        let white = (bishops & *board.color_combined(Color::White)).popcnt();
        let light = (bishops & BitBoard(LIGHT_SQUARES)).popcnt();
        return white == 1 && (light == 0 || light == 2);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn test_fen_round_trip_keeps_counters() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        assert_eq!(pos(fen).to_fen(), fen);
    }

    #[test]
    fn test_short_fen_defaults() {
        let p = pos("4k3/8/8/8/8/8/4P3/4K3 w");
        assert_eq!(p.fullmove_number(), 1);
        assert_eq!(p.halfmove_clock(), 0);
    }

    #[test]
    fn test_malformed_fen_is_rejected() {
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(EngineError::InvalidPosition { .. })
        ));
        assert!(Position::from_fen("").is_err());
    }

    #[test]
    fn test_broken_placement_is_rejected() {
        let rejected = [
            // no kings at all
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "8/8/8/8/8/8/8/8/8/8 w - - 0 1",
            "k7/8/8/8/8/8/8/8 w - - 0 1",
            "kk6/8/8/8/8/8/8/K7 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRRRR w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w - - 0 1",
            "k7/8/8/8/8/8/8/K6x w - - 0 1",
            "k6P/8/8/8/8/8/8/K7 w - - 0 1",
            "k7/8/8/8/8/8/8/K7 x - - 0 1",
            "k7/8/8/8/8/8/8/K7 w KX - 0 1",
        ];
        for fen in rejected {
            assert!(
                matches!(Position::from_fen(fen), Err(EngineError::InvalidPosition { .. })),
                "accepted {}",
                fen
            );
        }
    }

    #[test]
    fn test_en_passant_rank_must_match_side() {
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K7 w - e9 0 1").is_err());
        assert!(Position::from_fen("k7/8/8/8/8/8/8/K7 w - e3 0 1").is_err());
        assert!(Position::from_fen("k7/8/8/8/4P3/8/8/K7 b - e6 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").is_ok());
        assert!(Position::from_fen("k7/8/8/3pP3/8/8/8/K7 w - d6 0 2").is_ok());
    }

    #[test]
    fn test_counters_saturate() {
        let p = pos("k7/8/8/8/8/8/8/K7 b - - 4294967295 4294967295");
        let m = p.parse_uci("a8b8").unwrap();
        let after = p.play(m);
        assert_eq!(after.fullmove_number(), u32::MAX);
        assert_eq!(after.halfmove_clock(), u32::MAX);
    }

    #[test]
    fn test_play_updates_counters() {
        let start = Position::startpos();
        let e4 = start.parse_uci("e2e4").unwrap();
        let after = start.play(e4);
        assert_eq!(after.fullmove_number(), 1);
        assert_eq!(after.halfmove_clock(), 0);
        let nf6 = after.parse_uci("g8f6").unwrap();
        let after = after.play(nf6);
        assert_eq!(after.fullmove_number(), 2);
        assert_eq!(after.halfmove_clock(), 1);
        // the original is untouched
        assert_eq!(start.to_fen(), START_FEN);
    }

    #[test]
    fn test_san_basics() {
        let start = Position::startpos();
        assert_eq!(start.to_san(start.parse_uci("e2e4").unwrap()).unwrap(), "e4");
        assert_eq!(start.to_san(start.parse_uci("g1f3").unwrap()).unwrap(), "Nf3");
    }

    #[test]
    fn test_san_castling_capture_and_mate() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(p.to_san(p.parse_uci("e1g1").unwrap()).unwrap(), "O-O");
        assert_eq!(p.to_san(p.parse_uci("e1c1").unwrap()).unwrap(), "O-O-O");
        assert_eq!(p.to_san(p.parse_uci("a1a8").unwrap()).unwrap(), "Rxa8+");

        let mate = pos("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert_eq!(mate.to_san(mate.parse_uci("a1a8").unwrap()).unwrap(), "Ra8#");
    }

    #[test]
    fn test_san_disambiguation_and_promotion() {
        let p = pos("4k3/P7/8/8/8/8/8/N3K1N1 w - - 0 1");
        assert_eq!(p.to_san(p.parse_uci("a1b3").unwrap()).unwrap(), "Nb3");
        let q = pos("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        assert_eq!(q.to_san(q.parse_uci("b1d2").unwrap()).unwrap(), "Nbd2");
        assert_eq!(p.to_san(p.parse_uci("a7a8q").unwrap()).unwrap(), "a8=Q+");
    }

    #[test]
    fn test_illegal_move_has_no_san() {
        let start = Position::startpos();
        let bogus = Move::new(Square::E2, Square::E5, None);
        assert!(matches!(start.to_san(bogus), Err(EngineError::Notation(_))));
        assert!(start.try_play(bogus).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert_eq!(pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").status(), GameStatus::Stalemate);
        assert_eq!(pos("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").status(), GameStatus::Checkmate);
        assert_eq!(pos("8/8/4k3/8/8/3NK3/8/8 w - - 0 1").status(), GameStatus::InsufficientMaterial);
        assert_eq!(pos("8/8/4k3/8/8/3RK3/8/8 w - - 0 1").status(), GameStatus::Ongoing);
        assert_eq!(pos("8/8/4k3/8/8/3RK3/8/8 w - - 100 80").status(), GameStatus::FiftyMoveRule);
    }
}
