//! UCI command parser.

use super::GoParams;

/// Parsed UCI command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// "uci" - Initialize UCI mode
    Uci,
    /// "debug on/off"
    Debug(bool),
    /// "isready" - Synchronization
    IsReady,
    /// "setoption name X value Y"
    SetOption { name: String, value: Option<String> },
    /// "ucinewgame" - New game starting
    UciNewGame,
    /// "position startpos/fen [moves ...]"
    Position { fen: Option<String>, moves: Vec<String> },
    /// "go ..." - Start searching
    Go(GoParams),
    /// "stop" - Searches are synchronous, so this is a no-op
    Stop,
    /// "quit" - Exit the engine
    Quit,
    /// "d" - Debug: display board (non-standard but common)
    Display,
    /// "request {json}" - answer one JSON move request
    Request(String),
    /// Unknown command
    Unknown(String),
}

/// Parse a UCI command string into a UciCommand
pub fn parse_command(input: &str) -> UciCommand {
    let input = input.trim();
    let mut parts = input.split_whitespace();

    match parts.next() {
        Some("uci") => UciCommand::Uci,
        Some("debug") => {
            let on = parts.next() == Some("on");
            UciCommand::Debug(on)
        }
        Some("isready") => UciCommand::IsReady,
        Some("setoption") => parse_setoption(&mut parts),
        Some("ucinewgame") => UciCommand::UciNewGame,
        Some("position") => parse_position(&mut parts),
        Some("go") => parse_go(&mut parts),
        Some("stop") => UciCommand::Stop,
        Some("quit") => UciCommand::Quit,
        Some("d") => UciCommand::Display,
        Some("request") => {
            // Keep the JSON body verbatim, spaces included.
            let body = input["request".len()..].trim();
            UciCommand::Request(body.to_string())
        }
        _ => UciCommand::Unknown(input.to_string()),
    }
}

fn parse_setoption<'a>(parts: &mut impl Iterator<Item = &'a str>) -> UciCommand {
    let tokens: Vec<&str> = parts.collect();
    let value_at = tokens.iter().position(|&t| t == "value");
    let name_end = value_at.unwrap_or(tokens.len());
    let name_start = match tokens.first() {
        Some(&"name") => 1,
        _ => 0,
    };

    let name = tokens[name_start.min(name_end)..name_end].join(" ");
    let value = value_at.map(|i| tokens[i + 1..].join(" "));

    UciCommand::SetOption { name, value }
}

fn parse_position<'a>(parts: &mut impl Iterator<Item = &'a str>) -> UciCommand {
    let tokens: Vec<&str> = parts.collect();
    let (setup, moves) = match tokens.iter().position(|&t| t == "moves") {
        Some(i) => (&tokens[..i], &tokens[i + 1..]),
        None => (&tokens[..], &[][..]),
    };

    // "startpos" or "fen <fields...>"; the counters may be missing
    let fen = match setup.split_first() {
        Some((&"fen", fields)) if !fields.is_empty() => Some(fields.join(" ")),
        _ => None,
    };

    UciCommand::Position {
        fen,
        moves: moves.iter().map(|m| m.to_string()).collect(),
    }
}

fn parse_go<'a>(parts: &mut impl Iterator<Item = &'a str>) -> UciCommand {
    let mut params = GoParams::new();

    let tokens: Vec<&str> = parts.collect();
    let mut i = 0;

    while i < tokens.len() {
        let next = tokens.get(i + 1);
        match tokens[i] {
            "infinite" => params.infinite = true,
            "depth" => {
                params.depth = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            "movetime" => {
                params.movetime = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            "wtime" => {
                params.wtime = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            "btime" => {
                params.btime = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            "winc" => {
                params.winc = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            "binc" => {
                params.binc = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            "movestogo" => {
                params.movestogo = next.and_then(|t| t.parse().ok());
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    UciCommand::Go(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("uci"), UciCommand::Uci);
        assert_eq!(parse_command("  isready  "), UciCommand::IsReady);
        assert_eq!(parse_command("debug on"), UciCommand::Debug(true));
        assert_eq!(parse_command("quit"), UciCommand::Quit);
        assert_eq!(parse_command("d"), UciCommand::Display);
        assert_eq!(parse_command("xyzzy"), UciCommand::Unknown("xyzzy".to_string()));
    }

    #[test]
    fn test_setoption() {
        assert_eq!(
            parse_command("setoption name UCI_Elo value 1850"),
            UciCommand::SetOption { name: "UCI_Elo".to_string(), value: Some("1850".to_string()) }
        );
        assert_eq!(
            parse_command("setoption name BookFile value /tmp/my book.json"),
            UciCommand::SetOption {
                name: "BookFile".to_string(),
                value: Some("/tmp/my book.json".to_string())
            }
        );
    }

    #[test]
    fn test_position() {
        assert_eq!(
            parse_command("position startpos moves e2e4 e7e5"),
            UciCommand::Position { fen: None, moves: vec!["e2e4".to_string(), "e7e5".to_string()] }
        );
        let cmd = parse_command("position fen 8/8/8/8/8/8/8/K6k w - - 0 1 moves a1a2");
        assert_eq!(
            cmd,
            UciCommand::Position {
                fen: Some("8/8/8/8/8/8/8/K6k w - - 0 1".to_string()),
                moves: vec!["a1a2".to_string()]
            }
        );
        let cmd = parse_command("position fen 8/8/8/8/8/8/8/K6k w - - moves a1b1");
        assert_eq!(
            cmd,
            UciCommand::Position {
                fen: Some("8/8/8/8/8/8/8/K6k w - -".to_string()),
                moves: vec!["a1b1".to_string()]
            }
        );
    }

    #[test]
    fn test_go() {
        let UciCommand::Go(params) = parse_command("go wtime 60000 btime 50000 winc 1000 movestogo 20")
        else {
            panic!("expected go");
        };
        assert_eq!(params.wtime, Some(60_000));
        assert_eq!(params.btime, Some(50_000));
        assert_eq!(params.winc, Some(1_000));
        assert_eq!(params.binc, None);
        assert_eq!(params.movestogo, Some(20));

        assert_eq!(parse_command("go depth 5"), UciCommand::Go(GoParams::fixed_depth(5)));
        assert_eq!(parse_command("go movetime 300"), UciCommand::Go(GoParams::fixed_time(300)));
    }

    #[test]
    fn test_request_keeps_body() {
        assert_eq!(
            parse_command(r#"request {"fen": "8/8/8/8/8/8/8/K6k w - - 0 1"}"#),
            UciCommand::Request(r#"{"fen": "8/8/8/8/8/8/8/K6k w - - 0 1"}"#.to_string())
        );
    }
}
