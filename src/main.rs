use std::io;
use std::path::PathBuf;
use std::process;

use log::error;
use structopt::StructOpt;

use humanchess::uci::UciHandler;
use humanchess::{Engine, EngineOptions, Personality};

#[derive(StructOpt)]
#[structopt(
    name = "humanchess",
    about = "A chess engine that plays like a human of a given rating. Speaks UCI on stdin/stdout; `request <json>` answers a single JSON move request."
)]
struct Args {
    #[structopt(long, default_value = "1500", help = "Playing strength, 400 to 2400")]
    rating: u32,
    #[structopt(
        long,
        default_value = "balanced",
        help = "Style: balanced, aggressive, positional, defensive, tactical, solid or romantic"
    )]
    personality: String,
    #[structopt(long, help = "Seed for the random source; fixed by default")]
    seed: Option<u64>,
    #[structopt(long, default_value = "16", help = "Transposition table size in MB")]
    hash: usize,
    #[structopt(long, parse(from_os_str), help = "JSON opening repertoire to use instead of the built-in one")]
    book: Option<PathBuf>,
    #[structopt(long = "no-humanize", help = "Play the search's best move without noise or blunders")]
    no_humanize: bool,
}

fn main() {
    env_logger::init();
    let args = Args::from_args();

    let defaults = EngineOptions::default();
    let mut engine = Engine::new(EngineOptions {
        rating: args.rating,
        personality: Personality::from_name_or_default(&args.personality),
        seed: args.seed.unwrap_or(defaults.seed),
        hash_mb: args.hash,
        humanize: !args.no_humanize,
        ..defaults
    });
    if let Some(path) = &args.book {
        if let Err(e) = engine.load_book(path) {
            error!("{}", e);
            process::exit(1);
        }
    }

    let stdin = io::stdin();
    let mut handler = UciHandler::stdout(engine);
    if let Err(e) = handler.run(stdin.lock()) {
        error!("{}", e);
        process::exit(1);
    }
}
