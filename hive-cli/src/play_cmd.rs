//! Play command - a human against the search engine over stdin
//!
//! Moves are typed as `<tile> <place|move> <q,r>`, e.g. `ant1_p1 place 0,-1`.
//! Malformed or illegal input is reported and the prompt repeats.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use hive_core::{
    ActionKind, Agent, Board, EngineConfig, GameResult, Hex, ParseError, Player, SearchAgent,
    TileId,
};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Which player you are (1 moves first)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=2))]
    pub human: u8,

    /// Engine search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Engine beam width (plain alpha-beta when omitted)
    #[arg(long)]
    pub beam_width: Option<usize>,

    /// End the game after this many turns per player
    #[arg(long)]
    pub max_turns: Option<u16>,

    /// Three tiles around a queen win
    #[arg(long)]
    pub simplified: bool,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, config: EngineConfig) -> Result<()> {
    let mut rules = config.rules;
    if args.max_turns.is_some() {
        rules.max_turns = args.max_turns;
    }
    rules.simplified |= args.simplified;

    let mut search = config.search;
    if let Some(depth) = args.depth {
        search.depth = depth;
    }
    if args.beam_width.is_some() {
        search.beam_width = args.beam_width;
    }

    let human = Player::from_number(args.human).unwrap_or(Player::One);
    tracing::info!(
        "Starting game: human is player {}, engine depth={}",
        human,
        search.depth
    );

    let mut board = Board::with_rules(rules);
    let mut engine = SearchAgent::new(search);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let result = board.game_over();
        if result != GameResult::Ongoing {
            print_board(&board);
            println!("Game over: {result}");
            return Ok(());
        }

        let player = board.current_player();
        if player != human {
            match engine.select_action(&mut board) {
                Some(action) => {
                    println!("Engine plays {}", describe(&board, player, action.index, action.pos));
                    board.apply(action);
                }
                None => {
                    println!("Engine has no legal action and passes");
                    board.pass();
                }
            }
            continue;
        }

        print_board(&board);
        if !board.has_legal_action(human) {
            println!("You have no legal action and pass");
            board.pass();
            continue;
        }

        print!("Player {human} > ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line?;
        if matches!(line.trim(), "quit" | "exit") {
            return Ok(());
        }

        let (tile, kind, pos) = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("Invalid input: {err}");
                continue;
            }
        };
        if let Err(err) = board.execute(tile, kind, pos) {
            println!("Illegal action ({}): {err}", err.code());
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parse `<tile> <place|move> <q,r>`
fn parse_command(line: &str) -> Result<(TileId, ActionKind, Hex), ParseError> {
    let mut parts = line.split_whitespace();
    let tile = parts.next().unwrap_or_default().parse::<TileId>()?;
    let kind = parts.next().unwrap_or_default().parse::<ActionKind>()?;
    let pos = parts.collect::<Vec<_>>().join("").parse::<Hex>()?;
    Ok((tile, kind, pos))
}

fn describe(board: &Board, player: Player, index: u8, pos: Hex) -> String {
    match TileId::from_index(player, index) {
        Some(tile) if board.in_hand(tile) => format!("{tile} place {pos}"),
        Some(tile) => format!("{tile} move {pos}"),
        None => format!("?{index} {pos}"),
    }
}

fn print_board(board: &Board) {
    println!();
    if board.is_empty() {
        println!("  (empty board)");
    }
    for (pos, stack) in board.stacks() {
        let names: Vec<String> = stack.iter().map(|t| t.to_string()).collect();
        println!("  {:>7}: {}", pos.to_string(), names.join(" "));
    }
    for player in Player::BOTH {
        let hand: Vec<String> = TileId::all_for(player)
            .filter(|t| board.in_hand(*t))
            .map(|t| t.to_string())
            .collect();
        println!("  hand p{}: {}", player, hand.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::Insect;

    #[test]
    fn test_parse_command() {
        let (tile, kind, pos) = parse_command("ant2_p1 place 0,-1").unwrap();
        assert_eq!(tile, TileId::new(Player::One, Insect::Ant, 2).unwrap());
        assert_eq!(kind, ActionKind::Place);
        assert_eq!(pos, Hex::new(0, -1));

        let (_, kind, pos) = parse_command("queen1_p2 move (1, 0)").unwrap();
        assert_eq!(kind, ActionKind::Move);
        assert_eq!(pos, Hex::new(1, 0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_command("ant9_p1 place 0,0"),
            Err(ParseError::TileName(_))
        ));
        assert!(matches!(
            parse_command("ant1_p1 fly 0,0"),
            Err(ParseError::ActionKind(_))
        ));
        assert!(matches!(
            parse_command("ant1_p1 place here"),
            Err(ParseError::Coordinate(_))
        ));
        assert!(parse_command("").is_err());
    }
}
