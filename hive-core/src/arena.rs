//! Agent-vs-agent game runner

use serde::Serialize;

use crate::action_space::Action;
use crate::agent::Agent;
use crate::board::Board;
use crate::config::RulesConfig;
use crate::game::GameResult;
use crate::tile::Player;

/// One ply of a played game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub player: Player,
    /// `None` for a pass
    pub action: Option<Action>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    /// `Ongoing` when the ply limit ended the game
    pub result: GameResult,
    pub plies: u32,
    pub turns: Vec<Turn>,
}

/// Play one game from an empty board
pub fn play_game(
    p1: &mut dyn Agent,
    p2: &mut dyn Agent,
    rules: RulesConfig,
    max_plies: u32,
) -> GameRecord {
    let mut board = Board::with_rules(rules);
    let mut turns = Vec::new();
    let mut result = board.game_over();

    while !result.is_over() && (turns.len() as u32) < max_plies {
        let player = board.current_player();
        let action = match player {
            Player::One => p1.select_action(&mut board),
            Player::Two => p2.select_action(&mut board),
        };
        match action {
            Some(action) => {
                debug_assert!(board.legal_actions(player).contains(action));
                board.apply(action);
            }
            None => {
                board.pass();
            }
        }
        turns.push(Turn { player, action });
        result = board.game_over();
    }

    GameRecord {
        result,
        plies: turns.len() as u32,
        turns,
    }
}

/// Outcome counts over many games
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub p1_wins: u32,
    pub p2_wins: u32,
    pub draws: u32,
    /// Stopped by the ply limit
    pub unfinished: u32,
}

impl Tally {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Winner(Player::One) => self.p1_wins += 1,
            GameResult::Winner(Player::Two) => self.p2_wins += 1,
            GameResult::Draw => self.draws += 1,
            GameResult::Ongoing => self.unfinished += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.p1_wins + self.p2_wins + self.draws + self.unfinished
    }
}

impl FromIterator<GameResult> for Tally {
    fn from_iter<I: IntoIterator<Item = GameResult>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for result in iter {
            tally.record(result);
        }
        tally
    }
}
