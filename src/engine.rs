//! The move-selection facade.
//!
//! One [`Engine`] plays one game at a time. Per move it consults the opening
//! book while the game is still in book, asks the time manager for a budget,
//! runs the search and finally lets the humanizer degrade the result to the
//! configured rating. Everything random flows from a single seeded `StdRng`
//! owned by the engine, so two engines built from the same options answer the
//! same sequence of requests identically.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::book::{self, GameOutcome, OpeningBook};
use crate::config::{
    perturb, rating_adjust, rating_config, Personality, PersonalityModifiers, RatingConfig,
    MAX_RATING, MIN_RATING,
};
use crate::error::EngineError;
use crate::eval::Evaluator;
use crate::humanize::maybe_blunder;
use crate::position::{to_uci, GameStatus, Position};
use crate::search::{OrderingTier, SearchLimits, SearchResult, Searcher};
use crate::time::{assess_complexity, classify, MoveClassification, TimeManager};
use crate::types::{Color, Depth, Move, Score};

/// Construction-time settings of an [`Engine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub rating: u32,
    pub personality: Personality,
    pub seed: u64,
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Blunder injection and evaluation noise.
    pub humanize: bool,
    pub use_book: bool,
    /// Replaces the rating's nominal search depth when set.
    pub max_depth_override: Option<i32>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rating: 1500,
            personality: Personality::Balanced,
            seed: 0x5EED,
            hash_mb: 16,
            humanize: true,
            use_book: true,
            max_depth_override: None,
        }
    }
}

/// Where a chosen move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    OpeningBook,
    Forced,
    Search,
}

/// A move as origin and destination squares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateMove {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl From<Move> for CoordinateMove {
    fn from(m: Move) -> Self {
        Self {
            from: m.get_source().to_string(),
            to: m.get_dest().to_string(),
            promotion: m
                .get_promotion()
                .map(|p| p.to_string(Color::Black)),
        }
    }
}

/// Search statistics reported alongside a move.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveStats {
    pub depth: i32,
    pub seldepth: i32,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub pv: Vec<String>,
    pub nps: u64,
    pub tt_hit_rate: f64,
    /// Transposition table fill in permill
    pub hashfull: u32,
    pub cutoffs: u64,
}

impl MoveStats {
    fn from_result(result: &SearchResult, hashfull: u32) -> Self {
        Self {
            depth: result.depth.raw(),
            seldepth: result.stats.seldepth.raw(),
            nodes: result.nodes,
            elapsed_ms: result.elapsed.as_millis() as u64,
            pv: result.pv.iter().map(|&m| to_uci(m)).collect(),
            nps: result.stats.nps(),
            tt_hit_rate: result.stats.tt_hit_rate(),
            hashfull,
            cutoffs: result.stats.cutoffs,
        }
    }
}

/// Everything the engine knows about the move it chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    #[serde(skip)]
    pub chess_move: Move,
    #[serde(rename = "move")]
    pub coordinates: CoordinateMove,
    pub uci: String,
    /// `None` when the move could not be rendered.
    pub san: Option<String>,
    pub fen_after: String,
    /// Centipawns from the mover's point of view, before the move.
    pub evaluation: i32,
    /// Moves to mate when the evaluation is in the mate band; negative when being mated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate_in: Option<i32>,
    pub source: MoveSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening: Option<String>,
    pub stats: MoveStats,
    pub think_time_ms: u64,
    pub suggested_delay_ms: u64,
    pub checkmate: bool,
    pub stalemate: bool,
    pub check: bool,
    pub game_over: bool,
    /// Drawn by stalemate, insufficient material or the fifty-move rule.
    pub draw: bool,
    pub humanized: bool,
}

/// A move request as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub fen: String,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
}

impl MoveRequest {
    pub fn new(fen: impl Into<String>) -> Self {
        Self { fen: fen.into(), rating: None, personality: None, time_budget_ms: None }
    }
}

/// The answer to a [`MoveRequest`]. Failures travel in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<MoveOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveReply {
    pub fn ok(outcome: MoveOutcome) -> Self {
        Self { success: true, outcome: Some(outcome), error: None }
    }

    pub fn err(error: &EngineError) -> Self {
        Self { success: false, outcome: None, error: Some(error.to_string()) }
    }
}

/// How the chosen move was found, before it is turned into a [`MoveOutcome`].
struct Choice {
    mv: Move,
    score: Score,
    source: MoveSource,
    opening: Option<String>,
    stats: MoveStats,
    think: Duration,
    humanized: bool,
}

/// Rating-calibrated move chooser for one game.
pub struct Engine {
    options: EngineOptions,
    config: RatingConfig,
    modifiers: PersonalityModifiers,
    searcher: Searcher,
    time_manager: TimeManager,
    book: Arc<RwLock<OpeningBook>>,
    rng: StdRng,
    in_book: bool,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let rating = options.rating.clamp(MIN_RATING, MAX_RATING);
        let options = EngineOptions { rating, ..options };
        let config = rating_config(rating);
        let searcher = Searcher::new(
            options.hash_mb,
            Evaluator::clean(),
            OrderingTier::for_rating(rating),
        );
        let mut engine = Self {
            config,
            modifiers: PersonalityModifiers::NEUTRAL,
            searcher,
            time_manager: TimeManager::new(rating),
            book: book::global(),
            rng: StdRng::seed_from_u64(options.seed),
            in_book: true,
            options,
        };
        engine.configure();
        engine
    }

    /// Rebuild everything derived from rating, personality and humanize.
    fn configure(&mut self) {
        let rating = self.options.rating;
        self.config = rating_config(rating);
        let adjusted = rating_adjust(&self.options.personality.modifiers(), rating);
        self.modifiers = if self.options.humanize {
            perturb(&adjusted, rating, &mut self.rng)
        } else {
            adjusted
        };
        let evaluator = Evaluator::for_config(&self.config, &self.modifiers, self.options.humanize);
        self.searcher.set_evaluator(evaluator);
        self.searcher.set_ordering_tier(OrderingTier::for_rating(rating));
        self.time_manager = TimeManager::new(rating).with_style(&self.modifiers);
        debug!(
            "configured rating {} personality {} depth {} noise {}",
            rating,
            self.options.personality,
            self.config.search_depth,
            self.searcher.evaluator().noise_amplitude()
        );
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn rating_config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn modifiers(&self) -> &PersonalityModifiers {
        &self.modifiers
    }

    /// Whether the next move may still come from the opening book.
    pub fn in_book(&self) -> bool {
        self.in_book
    }

    pub fn set_rating(&mut self, rating: u32) {
        let rating = rating.clamp(MIN_RATING, MAX_RATING);
        if rating != self.options.rating {
            self.options.rating = rating;
            self.configure();
        }
    }

    pub fn set_personality(&mut self, personality: Personality) {
        if personality != self.options.personality {
            self.options.personality = personality;
            self.configure();
        }
    }

    /// Reseed the random source; later choices replay from the new seed.
    pub fn set_seed(&mut self, seed: u64) {
        self.options.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        self.configure();
    }

    pub fn set_hash(&mut self, hash_mb: usize) {
        self.options.hash_mb = hash_mb;
        self.searcher.resize_tt(hash_mb);
    }

    pub fn set_humanize(&mut self, humanize: bool) {
        if humanize != self.options.humanize {
            self.options.humanize = humanize;
            self.configure();
        }
    }

    pub fn set_use_book(&mut self, use_book: bool) {
        self.options.use_book = use_book;
    }

    pub fn set_max_depth(&mut self, depth: Option<i32>) {
        self.options.max_depth_override = depth;
    }

    /// Use a private book instead of the shared one.
    pub fn set_book(&mut self, book: OpeningBook) {
        self.book = Arc::new(RwLock::new(book));
    }

    /// Load a JSON repertoire as this engine's private book.
    pub fn load_book<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EngineError> {
        let book = OpeningBook::load_json(path)?;
        info!("loaded opening book with {} lines", book.line_count());
        self.set_book(book);
        Ok(())
    }

    pub fn book(&self) -> Arc<RwLock<OpeningBook>> {
        Arc::clone(&self.book)
    }

    /// Forget per-game state: the book becomes available again.
    pub fn new_game(&mut self) {
        self.in_book = true;
    }

    /// Feed a finished game back into the opening book.
    pub fn learn(&self, moves: &[Move], outcome: GameOutcome) -> usize {
        self.book.write().learn(moves, outcome)
    }

    /// Choose a move for the position described by `fen`.
    pub fn choose_move(
        &mut self,
        fen: &str,
        time_override: Option<Duration>,
    ) -> Result<MoveOutcome, EngineError> {
        let position = Position::from_fen(fen)?;
        self.choose_move_at(&position, time_override, None)
    }

    /// Choose a move for `position`, optionally overriding budget and depth.
    pub fn choose_move_at(
        &mut self,
        position: &Position,
        time_override: Option<Duration>,
        depth_override: Option<i32>,
    ) -> Result<MoveOutcome, EngineError> {
        let started = Instant::now();
        let legal = position.legal_moves();
        if legal.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        let choice = if legal.len() == 1 {
            self.forced(position, legal[0])
        } else if let Some(choice) = self.from_book(position, legal.len()) {
            choice
        } else {
            self.from_search(position, legal.len(), time_override, depth_override)?
        };

        let outcome = self.outcome(position, choice, started.elapsed());
        info!(
            "{} {} ({:?}) eval {} depth {} nodes {}",
            position.fullmove_number(),
            outcome.uci,
            outcome.source,
            outcome.evaluation,
            outcome.stats.depth,
            outcome.stats.nodes
        );
        Ok(outcome)
    }

    /// Answer a wire request; never fails.
    pub fn handle(&mut self, request: &MoveRequest) -> MoveReply {
        if let Some(rating) = request.rating {
            self.set_rating(rating);
        }
        if let Some(name) = &request.personality {
            self.set_personality(Personality::from_name_or_default(name));
        }
        let budget = request.time_budget_ms.map(Duration::from_millis);
        match self.choose_move(&request.fen, budget) {
            Ok(outcome) => MoveReply::ok(outcome),
            Err(e) => {
                warn!("request failed: {}", e);
                MoveReply::err(&e)
            }
        }
    }

    fn forced(&mut self, position: &Position, mv: Move) -> Choice {
        let think = self.time_manager.allocate(
            position,
            MoveClassification::Forced,
            0.0,
            1,
            &mut self.rng,
        );
        Choice {
            mv,
            score: self.searcher.evaluator().evaluate(position.board()),
            source: MoveSource::Forced,
            opening: None,
            stats: MoveStats::default(),
            think,
            humanized: false,
        }
    }

    fn from_book(&mut self, position: &Position, candidate_count: usize) -> Option<Choice> {
        if !self.options.use_book || !self.in_book {
            return None;
        }
        if position.fullmove_number() > self.config.opening_book_depth {
            debug!("leaving book at move {}", position.fullmove_number());
            self.in_book = false;
            return None;
        }

        let pick = self.book.read().lookup(
            position,
            self.options.rating,
            self.options.personality,
            &mut self.rng,
        );
        let Some(pick) = pick else {
            debug!("out of book at {}", position.to_fen());
            self.in_book = false;
            return None;
        };

        let think = self.time_manager.allocate(
            position,
            MoveClassification::OpeningBook,
            0.0,
            candidate_count,
            &mut self.rng,
        );
        Some(Choice {
            mv: pick.mv,
            score: self.searcher.evaluator().evaluate(position.board()),
            source: MoveSource::OpeningBook,
            opening: Some(pick.name),
            stats: MoveStats::default(),
            think,
            humanized: false,
        })
    }

    fn from_search(
        &mut self,
        position: &Position,
        candidate_count: usize,
        time_override: Option<Duration>,
        depth_override: Option<i32>,
    ) -> Result<Choice, EngineError> {
        let complexity = assess_complexity(position, candidate_count);
        let class = classify(position, candidate_count, false);
        let think = self.time_manager.allocate(
            position,
            class,
            complexity,
            candidate_count,
            &mut self.rng,
        );
        let budget = time_override.unwrap_or_else(|| think.min(self.config.time_limit));
        let depth = depth_override
            .or(self.options.max_depth_override)
            .unwrap_or(self.config.search_depth);
        debug!(
            "{:?} position, complexity {:.2}, budget {}ms, depth {}",
            class,
            complexity,
            budget.as_millis(),
            depth
        );

        self.searcher.set_salt(self.rng.gen());
        let result = self
            .searcher
            .search(position.board(), SearchLimits::new(Depth::new(depth), Some(budget)));
        let best = result.best_move.ok_or(EngineError::NoLegalMoves)?;
        let mut stats = MoveStats::from_result(&result, self.searcher.tt().hashfull());

        let mv = if self.options.humanize {
            maybe_blunder(position, best, self.options.rating, &mut self.searcher, &mut self.rng)
        } else {
            best
        };
        let humanized = mv != best;
        if humanized {
            stats.pv = vec![to_uci(mv)];
        }

        Ok(Choice {
            mv,
            score: result.score,
            source: MoveSource::Search,
            opening: None,
            stats,
            think: time_override.unwrap_or(think),
            humanized,
        })
    }

    fn outcome(&self, position: &Position, choice: Choice, spent: Duration) -> MoveOutcome {
        let san = match position.to_san(choice.mv) {
            Ok(san) => Some(san),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        let after = position.play(choice.mv);
        let status = after.status();

        MoveOutcome {
            chess_move: choice.mv,
            coordinates: CoordinateMove::from(choice.mv),
            uci: to_uci(choice.mv),
            san,
            fen_after: after.to_fen(),
            evaluation: choice.score.raw(),
            mate_in: choice.score.mate_moves(),
            source: choice.source,
            opening: choice.opening,
            stats: choice.stats,
            think_time_ms: choice.think.as_millis() as u64,
            suggested_delay_ms: choice.think.saturating_sub(spent).as_millis() as u64,
            checkmate: status == GameStatus::Checkmate,
            stalemate: status == GameStatus::Stalemate,
            check: after.in_check(),
            game_over: status.is_over(),
            draw: status.is_draw(),
            humanized: choice.humanized,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
