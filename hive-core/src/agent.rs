//! Playing agents

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::action_space::Action;
use crate::board::Board;
use crate::config::SearchConfig;
use crate::search::Searcher;

/// Something that picks moves
pub trait Agent {
    fn name(&self) -> &str;

    /// Choose a legal action for the player to move; `None` passes.
    /// The board must be returned unchanged.
    fn select_action(&mut self, board: &mut Board) -> Option<Action>;
}

/// Uniformly random legal actions
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn select_action(&mut self, board: &mut Board) -> Option<Action> {
        let actions: Vec<Action> = board.legal_actions(board.current_player()).iter().collect();
        actions.choose(&mut self.rng).copied()
    }
}

/// Minimax search agent
pub struct SearchAgent {
    searcher: Searcher,
}

impl SearchAgent {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            searcher: Searcher::new(config),
        }
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }
}

impl Agent for SearchAgent {
    fn name(&self) -> &str {
        if self.searcher.config().beam_width.is_some() {
            "beam"
        } else {
            "minimax"
        }
    }

    fn select_action(&mut self, board: &mut Board) -> Option<Action> {
        self.searcher.best_action(board).action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::ORIGIN;

    #[test]
    fn test_random_agent_is_reproducible() {
        let mut board = Board::new();
        let first = RandomAgent::new(7).select_action(&mut board);
        let second = RandomAgent::new(7).select_action(&mut board);
        assert_eq!(first, second);
        assert_eq!(first.map(|a| a.pos), Some(ORIGIN));
    }

    #[test]
    fn test_agents_pick_legal_actions() {
        let mut board = Board::new();
        let mut random = RandomAgent::new(1);
        let mut search = SearchAgent::new(SearchConfig::default().with_depth(1));
        for _ in 0..3 {
            for agent in [&mut random as &mut dyn Agent, &mut search] {
                let player = board.current_player();
                let action = agent.select_action(&mut board).unwrap();
                assert!(board.legal_actions(player).contains(action));
                board.apply(action);
            }
        }
        assert_eq!(board.turns(crate::tile::Player::One), 3);
        assert_eq!(search.name(), "minimax");
    }
}
