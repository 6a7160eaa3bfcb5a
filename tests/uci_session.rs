use std::io::Cursor;

use humanchess::uci::UciHandler;
use humanchess::{Engine, EngineOptions, Position};

fn run(script: &str) -> String {
    let engine = Engine::new(EngineOptions {
        rating: 1600,
        humanize: false,
        ..EngineOptions::default()
    });
    let mut handler = UciHandler::new(engine, Vec::new());
    handler.run(Cursor::new(script)).unwrap();
    String::from_utf8(handler.output().clone()).unwrap()
}

fn bestmoves(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|l| l.strip_prefix("bestmove "))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_short_game_session() {
    let script = "uci\n\
                  setoption name OwnBook value false\n\
                  isready\n\
                  ucinewgame\n\
                  position startpos moves e2e4\n\
                  go wtime 10000 btime 10000\n\
                  position startpos moves e2e4 e7e5 g1f3\n\
                  go depth 2 movetime 500\n\
                  quit\n";
    let out = run(script);
    assert!(out.contains("uciok"));
    assert!(out.contains("readyok"));

    let moves = bestmoves(&out);
    assert_eq!(moves.len(), 2);

    let after_e4 = Position::startpos().play(Position::startpos().parse_uci("e2e4").unwrap());
    assert!(after_e4.parse_uci(&moves[0]).is_some(), "illegal reply {}", moves[0]);
    assert_eq!(out.lines().filter(|l| l.starts_with("info depth")).count(), 2);
}

#[test]
fn test_book_reply_through_protocol() {
    let out = run("setoption name Rating value 2400\nposition startpos\ngo\nquit\n");
    let moves = bestmoves(&out);
    assert_eq!(moves.len(), 1);
    assert!(["e2e4", "d2d4", "g1f3", "c2c4"].contains(&moves[0].as_str()));
}

#[test]
fn test_json_request_line() {
    let out = run(
        "request {\"fen\": \"6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1\", \"rating\": 2400, \"time_budget_ms\": 2000}\nquit\n",
    );
    let reply: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(reply["success"], true);
    assert_eq!(reply["outcome"]["uci"], "d1d8");
    assert_eq!(reply["outcome"]["san"], "Rd8#");
    assert_eq!(reply["outcome"]["checkmate"], true);
}
