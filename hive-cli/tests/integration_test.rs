//! Integration tests for the Hive engine
//!
//! Tests the full stack: rules, move generation, search, agents, arena and
//! snapshots, driven the way the CLI drives them.

use hive_core::{
    is_connected, play_game, valid_moves, ActionKind, Agent, Board, EngineConfig, GameResult,
    Hex, IllegalAction, Insect, Player, RandomAgent, RulesConfig, SearchAgent, SearchConfig,
    Searcher, Snapshot, Tally, TileId, ORIGIN,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn tile(owner: Player, insect: Insect, n: u8) -> TileId {
    TileId::new(owner, insect, n).unwrap()
}

/// Play `plies` random legal actions (passing when there are none)
fn random_position(seed: u64, plies: usize) -> Board {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut board = Board::with_rules(RulesConfig::default().with_max_turns(40));
    for _ in 0..plies {
        if board.game_over().is_over() {
            break;
        }
        let actions: Vec<_> = board.legal_actions(board.current_player()).iter().collect();
        match actions.choose(&mut rng) {
            Some(&action) => {
                board.apply(action);
            }
            None => {
                board.pass();
            }
        }
    }
    board
}

// ============================================================================
// RULES
// ============================================================================

#[test]
fn test_random_playouts_keep_invariants() {
    for seed in 0..4 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = Board::with_rules(RulesConfig::default().with_max_turns(30));

        for _ in 0..60 {
            if board.game_over().is_over() {
                break;
            }
            for t in TileId::all() {
                let Some(pos) = board.location(t) else {
                    continue;
                };
                let moves = valid_moves(&board, t);
                assert!(!moves.contains(&pos), "seed {seed}: {t} may stay on {pos}");
                if t.insect() != Insect::Beetle {
                    for dest in &moves {
                        assert!(!board.is_occupied(*dest), "seed {seed}: {t} onto {dest}");
                    }
                }
            }

            let player = board.current_player();
            let actions: Vec<_> = board.legal_actions(player).iter().collect();
            let Some(&action) = actions.choose(&mut rng) else {
                board.pass();
                continue;
            };

            let before = board.canonical_hash();
            let undo = board.apply(action);
            assert!(is_connected(&board), "seed {seed}: {action} split the hive");
            assert_eq!(board.current_player(), player.opponent());
            board.undo(undo);
            assert_eq!(board.canonical_hash(), before, "seed {seed}: undo of {action}");

            board.apply(action);
        }
    }
}

#[test]
fn test_execute_flow() {
    let mut board = Board::new();
    let q1 = TileId::queen(Player::One);
    let q2 = TileId::queen(Player::Two);
    let ant1 = tile(Player::One, Insect::Ant, 1);

    assert_eq!(board.execute(q1, ActionKind::Place, ORIGIN), Ok(()));
    assert_eq!(
        board.execute(q1, ActionKind::Place, Hex::new(0, 1)),
        Err(IllegalAction::NotYourTurn { expected: Player::Two })
    );
    assert_eq!(board.execute(q2, ActionKind::Place, Hex::new(0, 1)), Ok(()));

    assert_eq!(
        board.execute(ant1, ActionKind::Place, Hex::new(5, 5)),
        Err(IllegalAction::NotAdjacent(Hex::new(5, 5)))
    );
    assert_eq!(
        board.execute(ant1, ActionKind::Place, Hex::new(1, 0)),
        Err(IllegalAction::TouchesOpponent(Hex::new(1, 0)))
    );
    assert_eq!(board.execute(ant1, ActionKind::Place, Hex::new(0, -1)), Ok(()));
    assert_eq!(board.current_player(), Player::Two);
    assert_eq!(board.turns(Player::One), 2);
}

#[test]
fn test_beetle_on_queen_steps_anywhere() {
    let mut board = Board::new();
    let beetle = tile(Player::One, Insect::Beetle, 1);
    let ant = tile(Player::Two, Insect::Ant, 1);

    board.execute(TileId::queen(Player::One), ActionKind::Place, ORIGIN).unwrap();
    board.execute(TileId::queen(Player::Two), ActionKind::Place, Hex::new(0, 1)).unwrap();
    board.execute(beetle, ActionKind::Place, Hex::new(0, -1)).unwrap();
    board.execute(ant, ActionKind::Place, Hex::new(0, 2)).unwrap();
    board.execute(beetle, ActionKind::Move, ORIGIN).unwrap();

    assert_eq!(board.height(ORIGIN), 2);
    assert_eq!(board.top(ORIGIN), Some(beetle));
    let mut moves: Vec<_> = valid_moves(&board, beetle).into_iter().collect();
    moves.sort();
    let mut expected = ORIGIN.neighbors().to_vec();
    expected.sort();
    assert_eq!(moves, expected);
}

#[test]
fn test_surrounded_queen_ends_game() {
    let mut board = Board::new();
    board.place(TileId::queen(Player::One), ORIGIN);
    board.place(TileId::queen(Player::Two), Hex::new(0, 1));
    let fillers = [
        tile(Player::Two, Insect::Ant, 1),
        tile(Player::Two, Insect::Ant, 2),
        tile(Player::Two, Insect::Ant, 3),
        tile(Player::Two, Insect::Spider, 1),
        tile(Player::Two, Insect::Spider, 2),
    ];
    let around: Vec<_> = ORIGIN
        .neighbors()
        .into_iter()
        .filter(|h| *h != Hex::new(0, 1))
        .collect();
    for (t, pos) in fillers.into_iter().zip(around) {
        board.place(t, pos);
    }

    assert_eq!(board.queen_surrounding(Player::One), 6);
    assert_eq!(board.game_over(), GameResult::Winner(Player::Two));
}

// ============================================================================
// SEARCH
// ============================================================================

#[test]
fn test_wide_beam_matches_minimax() {
    let base = SearchConfig::default().with_depth(2);
    for seed in [3, 9] {
        let mut board = random_position(seed, 4);
        let plain = Searcher::new(base.clone()).best_action(&mut board);
        let beam = Searcher::new(base.clone().with_beam(10_000)).best_action(&mut board);
        assert_eq!(plain.action, beam.action, "seed {seed}");
        assert_eq!(plain.score, beam.score, "seed {seed}");
    }
}

#[test]
fn test_search_leaves_position_untouched() {
    let mut board = random_position(17, 10);
    let before = board.snapshot();
    let player = board.current_player();

    let mut agent = SearchAgent::new(SearchConfig::default().with_beam(3));
    let action = agent.select_action(&mut board);

    assert_eq!(board.snapshot(), before);
    if let Some(action) = action {
        assert!(board.legal_actions(player).contains(action));
    }
    assert!(agent.searcher().last_stats().nodes > 0);
}

#[test]
fn test_config_drives_search() {
    let config = EngineConfig::from_json(
        r#"{"rules": {"max_turns": 12}, "search": {"depth": 1, "node_budget": 1}}"#,
    )
    .unwrap();
    assert_eq!(config.rules.max_turns, Some(12));

    let mut board = random_position(5, 6);
    let outcome = Searcher::new(config.search).best_action(&mut board);
    assert!(outcome.stats.aborted);
    assert!(outcome.action.is_some());
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

#[test]
fn test_snapshot_json_round_trip() {
    let board = random_position(21, 12);
    let snapshot = board.snapshot();
    let json = snapshot.to_json().unwrap();
    let parsed = Snapshot::from_json(&json).unwrap();
    assert_eq!(parsed, snapshot);

    let rebuilt = Board::from_snapshot(&parsed).unwrap();
    assert_eq!(rebuilt.canonical_hash(), board.canonical_hash());
    assert_eq!(rebuilt.current_player(), board.current_player());
    for player in Player::BOTH {
        assert_eq!(rebuilt.legal_actions(player), board.legal_actions(player));
    }
}

// ============================================================================
// ARENA
// ============================================================================

#[test]
fn test_arena_games_finish() {
    let rules = RulesConfig::default().with_max_turns(8);
    let results: Vec<GameResult> = (0..4)
        .map(|i| {
            let mut p1 = RandomAgent::new(100 + i);
            let mut p2 = SearchAgent::new(SearchConfig::default().with_depth(1));
            play_game(&mut p1, &mut p2, rules, 200).result
        })
        .collect();

    assert!(results.iter().all(|r| r.is_over()));
    let tally: Tally = results.into_iter().collect();
    assert_eq!(tally.games(), 4);
    assert_eq!(tally.unfinished, 0);
}
