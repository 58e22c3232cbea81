use std::io::{self, BufRead, Write};

use chess_rules::game::{Game, GameOptions, Phase};
use chess_rules::moves::{Move, Square};
use chess_rules::piece::PieceKind;

const HELP: &str = "\
Commands:
  e2e4        move a piece (append q/r/b/n to promote, e.g. a7a8q)
  promote q   finish a pending promotion (q, r, b or n)
  moves e2    list legal destinations of the piece on e2
  undo        take back the last move
  redo        replay an undone move
  state       print the game state as JSON
  help        show this text
  quit        leave";

fn usage() -> ! {
    eprintln!("Usage: play [--history-limit N] [--legacy-undo]");
    std::process::exit(2);
}

fn parse_options(args: &[String]) -> GameOptions {
    let mut options = GameOptions::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--history-limit" => {
                let Some(limit) = iter.next().and_then(|v| v.parse().ok()) else {
                    usage();
                };
                options.history_limit = Some(limit);
            }
            "--legacy-undo" => options.recompute_outcome_on_history = false,
            _ => usage(),
        }
    }
    options
}

fn print_position(game: &Game) {
    println!("{}", game.board());
    if let Some(mv) = game.state().last_move {
        println!("Last move: {mv}");
    }
    match game.phase() {
        Phase::AwaitingPromotionChoice => {
            println!("{} to choose a promotion piece (promote q/r/b/n)", game.turn())
        }
        Phase::AwaitingSelection if game.is_over() => println!("{}", game.outcome().message()),
        Phase::AwaitingSelection => {
            println!("{} to move. {}", game.turn(), game.outcome().message())
        }
    }
}

fn promote(game: &mut Game, letter: &str) -> bool {
    let kind = letter.chars().next().and_then(PieceKind::from_char);
    let Some(kind) = kind.filter(|_| letter.len() == 1) else {
        eprintln!("Unknown promotion piece: {letter}");
        return false;
    };
    match game.choose_promotion(kind) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("{e}");
            false
        }
    }
}

fn play_move(game: &mut Game, text: &str) -> bool {
    let Some(mv) = Move::from_uci(text) else {
        eprintln!("Not a move or command: {text} (try 'help')");
        return false;
    };
    let suffix = &text[4..];
    if !suffix.is_empty() && !game.is_promotion_move(&mv) {
        eprintln!("{mv} does not promote; drop the '{suffix}'");
        return false;
    }
    if let Err(e) = game.attempt_move(mv.from, mv.to).map(|_| ()) {
        eprintln!("{mv}: {e}");
        return false;
    }
    if !suffix.is_empty() && game.phase() == Phase::AwaitingPromotionChoice {
        promote(game, suffix);
    }
    true
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut game = Game::with_options(parse_options(&args));

    println!(
        "chess-rules {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIMESTAMP")
    );
    println!("Type 'help' for commands.\n");
    print_position(&game);

    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read input: {e}");
                break;
            }
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let changed = match words.as_slice() {
            [] => false,
            ["quit"] | ["exit"] => break,
            ["help"] => {
                println!("{HELP}");
                false
            }
            ["undo"] => {
                let undone = game.undo().is_some();
                if !undone {
                    eprintln!("Nothing to undo");
                }
                undone
            }
            ["redo"] => {
                let redone = game.redo().is_some();
                if !redone {
                    eprintln!("Nothing to redo");
                }
                redone
            }
            ["promote", letter] => promote(&mut game, letter),
            ["moves", name] => {
                match Square::from_algebraic(name) {
                    Some(origin) => {
                        let dests: Vec<String> = game
                            .legal_destinations(origin)
                            .iter()
                            .map(|s| s.to_string())
                            .collect();
                        println!("{origin}: {}", dests.join(" "));
                    }
                    None => eprintln!("Not a square: {name}"),
                }
                false
            }
            ["state"] => {
                match serde_json::to_string_pretty(game.state()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Failed to serialize state: {e}"),
                }
                false
            }
            [text] => play_move(&mut game, text),
            _ => {
                eprintln!("Not a move or command: {} (try 'help')", line.trim());
                false
            }
        };

        if changed {
            print_position(&game);
        }
    }
}
