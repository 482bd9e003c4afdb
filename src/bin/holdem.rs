use chat_holdem::betting::Commitment;
use chat_holdem::config::TableConfig;
use chat_holdem::engine::{HoldemEngine, PlayerAction, TurnOutcome};
use chat_holdem::game::{Game, Money, Player, UserId};
use chat_holdem::hand::Board;
use chat_holdem::presenter::{Presenter, TurnPrompt};
use chat_holdem::settlement::Settlement;
use chat_holdem::wallet::InMemoryLedger;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

/// Prints table events as plain chat-like lines.
struct TextPresenter {
    names: Vec<(UserId, String)>,
}

impl TextPresenter {
    fn name(&self, user_id: UserId) -> &str {
        self.names.iter().find(|(id, _)| *id == user_id).map_or("?", |(_, n)| n.as_str())
    }
}

impl Presenter for TextPresenter {
    fn show_hole_cards(&mut self, player: &Player) {
        if let Some(hole) = player.hole() {
            println!("[{} only] your cards: {}", player.mention(), hole);
        }
    }

    fn show_board(&mut self, board: &Board, pot: Money) {
        println!("table: {board}  |  current pot: {pot}$");
    }

    fn prompt_turn(&mut self, prompt: &TurnPrompt) {
        let board = if prompt.board.is_empty() { "no cards".to_owned() } else { prompt.board.to_string() };
        println!("turn of {}\n{}\nmoney: {}$  max round rate: {}$", prompt.mention, board, prompt.available, prompt.max_round_rate);
        let call = if prompt.is_check() { "c = check".to_owned() } else { format!("c = call {}$", prompt.to_call) };
        let steps: Vec<String> = prompt.raise_steps.iter().map(Money::to_string).collect();
        println!("{call}, f = fold, a = all in, r <{}> = {}", steps.join("|"), prompt.raise_action.label());
    }

    fn announce_commitment(&mut self, player: &Player, commitment: Commitment) {
        println!("{} {} {}$", player.mention(), commitment.action.label(), commitment.amount);
    }

    fn announce_fold(&mut self, player: &Player) {
        println!("{} fold", player.mention());
    }

    fn announce_settlement(&mut self, settlement: &Settlement) {
        println!("game is finished with result:");
        for award in &settlement.awards {
            println!("{}: got {}$", self.name(award.user_id), award.amount);
            if let Some(hand) = award.hand.filter(|_| !settlement.uncontested) {
                println!("  {} with {}", hand.category.name(), chat_holdem::cards::format_cards(&hand.best_five));
            }
        }
        println!("n = next hand, t <name> = top up, q = quit");
    }
}

fn parse_action(line: &str) -> Option<PlayerAction> {
    let mut parts = line.split_whitespace();
    let action = match parts.next()? {
        "c" | "call" | "check" => PlayerAction::CallCheck,
        "f" | "fold" => PlayerAction::Fold,
        "a" | "allin" => PlayerAction::AllIn,
        "r" | "raise" | "bet" => PlayerAction::RaiseRate(parts.next()?.parse().ok()?),
        _ => return None,
    };
    Some(action)
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match TableConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let names: Vec<String> = std::env::args().skip(1).collect();
    if names.len() < 2 {
        eprintln!("usage: holdem <player> <player> [player...]");
        return ExitCode::FAILURE;
    }

    let ledger = Arc::new(InMemoryLedger::new(config.default_balance));
    let engine = HoldemEngine::new(ledger, config);
    let mut game = Game::new();
    let mut view = TextPresenter { names: Vec::new() };
    for (i, name) in names.iter().enumerate() {
        let user_id = i as UserId + 1;
        view.names.push((user_id, name.clone()));
        if let Err(e) = game.seat(Player::new(user_id, format!("@{name}"))) {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }

    match run(&engine, &mut game, &mut view) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &HoldemEngine, game: &mut Game, view: &mut TextPresenter) -> Result<(), Box<dyn std::error::Error>> {
    println!("chat-holdem {}. The game is started!", chat_holdem::VERSION);
    let mut outcome = engine.start(game, view)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line == "q" {
            engine.abort(game)?;
            break;
        }

        match outcome {
            TurnOutcome::AwaitingAction { user_id } => match parse_action(line) {
                Some(action) => outcome = engine.act(game, view, user_id, action)?,
                None => println!("unknown action: {line}"),
            },
            TurnOutcome::Finished(_) | TurnOutcome::Ignored => {
                if line == "n" {
                    engine.next_hand(game)?;
                    outcome = engine.start(game, view)?;
                } else if let Some(name) = line.strip_prefix("t ") {
                    match view.names.iter().find(|(_, n)| n == name.trim()) {
                        Some(&(user_id, _)) => match engine.top_up(game, user_id) {
                            Ok(money) => println!("{name} now has {money}$"),
                            Err(e) => println!("{e}"),
                        },
                        None => println!("nobody called {name} is seated"),
                    }
                } else {
                    println!("n = next hand, t <name> = top up, q = quit");
                }
            }
        }
    }
    Ok(())
}
