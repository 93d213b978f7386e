//! Minimax search with alpha-beta pruning and optional beam narrowing
//!
//! The searcher walks the single board it is handed: every child is applied
//! through an [`ActionGuard`](crate::game::ActionGuard) and undone when the
//! guard drops, so the board comes back bit-for-bit unchanged. Move
//! generation and connectivity checks go through a [`TranspositionCache`]
//! that lives for one top-level call.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use crate::action_space::Action;
use crate::board::Board;
use crate::cache::{CacheStats, TranspositionCache};
use crate::config::SearchConfig;
use crate::eval::{evaluate, Features};
use crate::tile::Player;

// ============================================================================
// RESULTS
// ============================================================================

/// Counters from the most recent top-level call
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate: f64,
    pub elapsed_ms: u64,
    /// Node budget or time limit ran out
    pub aborted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// `None` when the side to move has to pass
    pub action: Option<Action>,
    pub score: f32,
    pub stats: SearchStats,
}

// ============================================================================
// SEARCHER
// ============================================================================

pub struct Searcher {
    config: SearchConfig,
    cache: TranspositionCache,
    nodes: u64,
    started: Option<Instant>,
    deadline: Option<Instant>,
    aborted: bool,
    last: SearchStats,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cache: TranspositionCache::new(),
            nodes: 0,
            started: None,
            deadline: None,
            aborted: false,
            last: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Statistics of the last finished call
    pub fn last_stats(&self) -> SearchStats {
        self.last
    }

    /// Best action for the player to move, using the configured depth and
    /// beam width
    pub fn best_action(&mut self, board: &mut Board) -> SearchOutcome {
        let before = board.canonical_hash();
        let player = board.current_player();
        let depth = self.config.depth;

        let (score, action) = match self.config.beam_width {
            Some(width) => self.beam_minimax(
                board,
                depth,
                true,
                player,
                f32::NEG_INFINITY,
                f32::INFINITY,
                width,
            ),
            None => self.minimax(board, depth, true, player, f32::NEG_INFINITY, f32::INFINITY),
        };
        debug_assert_eq!(board.canonical_hash(), before, "search left the board modified");

        let stats = self.last;
        debug!(
            player = %player,
            action = ?action,
            score,
            nodes = stats.nodes,
            hit_rate = stats.hit_rate,
            elapsed_ms = stats.elapsed_ms,
            aborted = stats.aborted,
            "search finished"
        );
        SearchOutcome { action, score, stats }
    }

    /// Plain alpha-beta minimax. Scores are from `player`'s point of view.
    pub fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        player: Player,
        alpha: f32,
        beta: f32,
    ) -> (f32, Option<Action>) {
        self.begin();
        let result = self.node(board, depth, maximizing, player, alpha, beta, None);
        self.finish();
        result
    }

    /// Alpha-beta minimax that only recurses into the `beam_width`
    /// statically best children of each node
    #[allow(clippy::too_many_arguments)]
    pub fn beam_minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        player: Player,
        alpha: f32,
        beta: f32,
        beam_width: usize,
    ) -> (f32, Option<Action>) {
        self.begin();
        let result = self.node(board, depth, maximizing, player, alpha, beta, Some(beam_width));
        self.finish();
        result
    }

    fn begin(&mut self) {
        let now = Instant::now();
        self.cache.clear();
        self.nodes = 0;
        self.aborted = false;
        self.started = Some(now);
        self.deadline = self
            .config
            .time_limit_ms
            .map(|ms| now + Duration::from_millis(ms));
    }

    fn finish(&mut self) {
        let cache: CacheStats = self.cache.stats();
        self.last = SearchStats {
            nodes: self.nodes,
            cache_hits: cache.move_hits + cache.hive_hits,
            cache_misses: cache.move_misses + cache.hive_misses,
            hit_rate: cache.hit_rate(),
            elapsed_ms: self.started.map_or(0, |t| t.elapsed().as_millis() as u64),
            aborted: self.aborted,
        };
        self.cache.clear();
        self.started = None;
        self.deadline = None;
    }

    fn out_of_budget(&self) -> bool {
        if let Some(budget) = self.config.node_budget {
            if self.nodes > budget {
                return true;
            }
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    fn evaluate(&mut self, board: &Board, player: Player) -> f32 {
        let cache = &mut self.cache;
        let features = Features::collect_with(board, |b, t| cache.valid_moves(b, t));
        evaluate(&features, player, &self.config.params)
    }

    #[allow(clippy::too_many_arguments)]
    fn node(
        &mut self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        player: Player,
        mut alpha: f32,
        mut beta: f32,
        beam: Option<usize>,
    ) -> (f32, Option<Action>) {
        self.nodes += 1;
        if !self.aborted && self.out_of_budget() {
            trace!(nodes = self.nodes, "search budget exhausted");
            self.aborted = true;
        }

        let cache = &mut self.cache;
        let result = board.game_over_with(|b, t| cache.valid_moves(b, t));
        if depth == 0 || result.is_over() || self.aborted {
            return (self.evaluate(board, player), None);
        }

        let to_move = board.current_player();
        let cache = &mut self.cache;
        let actions: Vec<Action> = board
            .legal_actions_with(to_move, |b, t| cache.valid_moves(b, t))
            .iter()
            .collect();

        if actions.is_empty() {
            let mut child = board.pass_scoped();
            let (score, _) = self.node(&mut child, depth - 1, !maximizing, player, alpha, beta, beam);
            return (score, None);
        }

        let children = match beam {
            Some(width) if actions.len() > width => self.narrow(board, actions, width, maximizing, player),
            _ => actions,
        };

        let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };
        let mut best_action = None;
        for action in &children {
            let (score, _) = {
                let mut child = board.apply_scoped(*action);
                self.node(&mut child, depth - 1, !maximizing, player, alpha, beta, beam)
            };
            if self.aborted {
                break;
            }

            if maximizing {
                if score > best {
                    best = score;
                    best_action = Some(*action);
                }
                alpha = alpha.max(score);
            } else {
                if score < best {
                    best = score;
                    best_action = Some(*action);
                }
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        match best_action {
            Some(action) => (best, Some(action)),
            // Aborted before any child finished
            None => (self.evaluate(board, player), children.first().copied()),
        }
    }

    /// Keep the `width` best children by static evaluation, in their
    /// canonical order
    fn narrow(
        &mut self,
        board: &mut Board,
        actions: Vec<Action>,
        width: usize,
        maximizing: bool,
        player: Player,
    ) -> Vec<Action> {
        let mut scored: Vec<(usize, f32)> = Vec::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            let child = board.apply_scoped(*action);
            let score = self.evaluate(&child, player);
            scored.push((i, score));
        }

        scored.sort_by(|a, b| {
            let ord = a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal);
            if maximizing {
                ord.reverse()
            } else {
                ord
            }
        });
        scored.truncate(width);

        let mut kept: Vec<usize> = scored.into_iter().map(|(i, _)| i).collect();
        kept.sort_unstable();
        kept.into_iter().map(|i| actions[i]).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
