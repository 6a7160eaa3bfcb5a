//! UCI command handler and main loop.

use std::io::{self, BufRead, Write};

use log::{debug, warn};

use super::parser::{parse_command, UciCommand};
use super::{GoParams, ENGINE_AUTHOR, ENGINE_NAME};
use crate::config::{Personality, MAX_RATING, MIN_RATING};
use crate::engine::{Engine, MoveOutcome, MoveReply, MoveRequest};
use crate::position::Position;
use crate::types::{File, Move, Rank, Square};

/// UCI protocol handler
pub struct UciHandler<W: Write> {
    engine: Engine,
    /// Current position
    position: Position,
    /// Moves played since the last `position` base
    moves: Vec<Move>,
    out: W,
    /// Debug mode enabled
    debug: bool,
    /// Should the engine quit
    quit: bool,
}

impl UciHandler<io::Stdout> {
    /// Handler writing protocol output to stdout.
    pub fn stdout(engine: Engine) -> Self {
        Self::new(engine, io::stdout())
    }
}

impl<W: Write> UciHandler<W> {
    pub fn new(engine: Engine, out: W) -> Self {
        Self {
            engine,
            position: Position::startpos(),
            moves: Vec::new(),
            out,
            debug: false,
            quit: false,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Moves applied on top of the last `position` base.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Run the UCI main loop until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if self.debug {
                debug!("< {}", line);
            }
            self.handle_input(&line)?;
            if self.quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle a single UCI command
    pub fn handle_input(&mut self, input: &str) -> io::Result<()> {
        let cmd = parse_command(input);
        self.handle_command(cmd)
    }

    fn handle_command(&mut self, cmd: UciCommand) -> io::Result<()> {
        match cmd {
            UciCommand::Uci => self.cmd_uci(),
            UciCommand::Debug(on) => {
                self.debug = on;
                Ok(())
            }
            UciCommand::IsReady => self.send("readyok"),
            UciCommand::SetOption { name, value } => {
                self.cmd_setoption(&name, value.as_deref());
                Ok(())
            }
            UciCommand::UciNewGame => {
                self.engine.new_game();
                self.position = Position::startpos();
                self.moves.clear();
                Ok(())
            }
            UciCommand::Position { fen, moves } => {
                self.cmd_position(fen.as_deref(), &moves);
                Ok(())
            }
            UciCommand::Go(params) => self.cmd_go(&params),
            UciCommand::Stop => Ok(()),
            UciCommand::Quit => {
                self.quit = true;
                Ok(())
            }
            UciCommand::Display => self.cmd_display(),
            UciCommand::Request(body) => self.cmd_request(&body),
            UciCommand::Unknown(s) => {
                if !s.is_empty() {
                    debug!("unknown command: {}", s);
                }
                Ok(())
            }
        }
    }

    /// Send output to GUI
    fn send(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{}", msg)?;
        self.out.flush()
    }

    // === UCI Commands ===

    fn cmd_uci(&mut self) -> io::Result<()> {
        self.send(&format!("id name {}", ENGINE_NAME))?;
        self.send(&format!("id author {}", ENGINE_AUTHOR))?;

        let options = self.engine.options().clone();
        self.send(&format!(
            "option name Rating type spin default {} min {} max {}",
            options.rating, MIN_RATING, MAX_RATING
        ))?;
        let styles: Vec<String> = Personality::ALL
            .iter()
            .map(|p| format!("var {}", p.name()))
            .collect();
        self.send(&format!(
            "option name Personality type combo default {} {}",
            options.personality.name(),
            styles.join(" ")
        ))?;
        self.send(&format!("option name Seed type string default {}", options.seed))?;
        self.send(&format!(
            "option name Hash type spin default {} min 1 max 1024",
            options.hash_mb
        ))?;
        self.send(&format!("option name Humanize type check default {}", options.humanize))?;
        self.send(&format!("option name OwnBook type check default {}", options.use_book))?;
        self.send("option name BookFile type string default <empty>")?;
        self.send("option name MaxDepth type spin default 0 min 0 max 64")?;

        self.send("uciok")
    }

    fn cmd_setoption(&mut self, name: &str, value: Option<&str>) {
        let value = value.unwrap_or("").trim();
        match name.to_ascii_lowercase().as_str() {
            "rating" | "uci_elo" => match value.parse::<u32>() {
                Ok(rating) => self.engine.set_rating(rating),
                Err(_) => warn!("bad rating: {}", value),
            },
            "personality" => self
                .engine
                .set_personality(Personality::from_name_or_default(value)),
            "seed" => match value.parse::<u64>() {
                Ok(seed) => self.engine.set_seed(seed),
                Err(_) => warn!("bad seed: {}", value),
            },
            "hash" => match value.parse::<usize>() {
                Ok(mb) => self.engine.set_hash(mb.clamp(1, 1024)),
                Err(_) => warn!("bad hash size: {}", value),
            },
            "humanize" => self.engine.set_humanize(parse_bool(value)),
            "ownbook" => self.engine.set_use_book(parse_bool(value)),
            "bookfile" => {
                if value.is_empty() || value == "<empty>" {
                    return;
                }
                if let Err(e) = self.engine.load_book(value) {
                    warn!("{}", e);
                }
            }
            // 0 hands depth back to the rating profile
            "maxdepth" => match value.parse::<i32>() {
                Ok(0) => self.engine.set_max_depth(None),
                Ok(depth) => self.engine.set_max_depth(Some(depth.clamp(1, 64))),
                Err(_) => warn!("bad depth: {}", value),
            },
            "uci_limitstrength" => {}
            _ => debug!("unknown option: {}", name),
        }
    }

    fn cmd_position(&mut self, fen: Option<&str>, moves: &[String]) {
        let base = match fen {
            Some(f) => match Position::from_fen(f) {
                Ok(position) => position,
                Err(e) => {
                    warn!("{}", e);
                    return;
                }
            },
            None => Position::startpos(),
        };

        let mut position = base;
        let mut played = Vec::with_capacity(moves.len());
        for text in moves {
            match position.parse_uci(text) {
                Some(m) => {
                    position = position.play(m);
                    played.push(m);
                }
                None => {
                    warn!("illegal move {} in {}", text, position.to_fen());
                    break;
                }
            }
        }
        self.position = position;
        self.moves = played;
    }

    fn cmd_go(&mut self, params: &GoParams) -> io::Result<()> {
        let budget = params.budget(self.position.side_to_move());
        match self.engine.choose_move_at(&self.position, budget, params.depth) {
            Ok(outcome) => {
                self.send(&info_line(&outcome))?;
                self.send(&format!("bestmove {}", outcome.uci))
            }
            Err(e) => {
                self.send(&format!("info string {}", e))?;
                self.send("bestmove 0000")
            }
        }
    }

    fn cmd_request(&mut self, body: &str) -> io::Result<()> {
        let reply = match serde_json::from_str::<MoveRequest>(body) {
            Ok(request) => self.engine.handle(&request),
            Err(e) => MoveReply {
                success: false,
                outcome: None,
                error: Some(format!("malformed request: {}", e)),
            },
        };
        let json = serde_json::to_string(&reply)
            .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"{}"}}"#, e));
        self.send(&json)
    }

    fn cmd_display(&mut self) -> io::Result<()> {
        for line in diagram(&self.position) {
            self.send(&line)?;
        }
        self.send(&format!("Fen: {}", self.position.to_fen()))?;
        self.send(&format!("Side to move: {:?}", self.position.side_to_move()))?;
        self.send(&format!("Status: {:?}", self.position.status()))
    }
}

/// Rank-by-rank text picture of the board, white at the bottom.
fn diagram(position: &Position) -> Vec<String> {
    let board = position.board();
    let mut lines = Vec::with_capacity(10);
    for rank in (0..8).rev() {
        let mut line = format!("{} ", rank + 1);
        for file in 0..8 {
            let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
            let c = match (board.piece_on(sq), board.color_on(sq)) {
                (Some(piece), Some(color)) => {
                    piece.to_string(color).chars().next().unwrap_or('?')
                }
                _ => '.',
            };
            line.push(' ');
            line.push(c);
        }
        lines.push(line);
    }
    lines.push("   a b c d e f g h".to_string());
    lines
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes")
}

fn info_line(outcome: &MoveOutcome) -> String {
    let stats = &outcome.stats;
    let builder = InfoBuilder::new()
        .depth(stats.depth)
        .seldepth(stats.seldepth);
    let builder = match outcome.mate_in {
        Some(n) => builder.mate(n),
        None => builder.cp(outcome.evaluation),
    };
    builder
        .nodes(stats.nodes)
        .nps(stats.nps)
        .time(stats.elapsed_ms)
        .hashfull(stats.hashfull)
        .pv(&stats.pv)
        .build()
}

/// Info message builder for search output
#[derive(Debug, Default)]
pub struct InfoBuilder {
    parts: Vec<String>,
}

impl InfoBuilder {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn depth(mut self, d: i32) -> Self {
        self.parts.push(format!("depth {}", d));
        self
    }

    pub fn seldepth(mut self, d: i32) -> Self {
        self.parts.push(format!("seldepth {}", d));
        self
    }

    pub fn cp(mut self, cp: i32) -> Self {
        self.parts.push(format!("score cp {}", cp));
        self
    }

    pub fn mate(mut self, moves: i32) -> Self {
        self.parts.push(format!("score mate {}", moves));
        self
    }

    pub fn nodes(mut self, n: u64) -> Self {
        self.parts.push(format!("nodes {}", n));
        self
    }

    pub fn nps(mut self, n: u64) -> Self {
        self.parts.push(format!("nps {}", n));
        self
    }

    pub fn hashfull(mut self, permill: u32) -> Self {
        self.parts.push(format!("hashfull {}", permill));
        self
    }

    pub fn time(mut self, ms: u64) -> Self {
        self.parts.push(format!("time {}", ms));
        self
    }

    pub fn pv(mut self, moves: &[String]) -> Self {
        if !moves.is_empty() {
            self.parts.push(format!("pv {}", moves.join(" ")));
        }
        self
    }

    pub fn build(self) -> String {
        format!("info {}", self.parts.join(" "))
    }
}
