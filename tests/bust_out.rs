use chat_holdem::config::TableConfig;
use chat_holdem::engine::{EngineError, HoldemEngine, PlayerAction, TurnOutcome};
use chat_holdem::game::{BetAction, Game, Player, PlayerState};
use chat_holdem::presenter::{NullPresenter, RecordingPresenter, TableEvent};
use chat_holdem::wallet::{InMemoryLedger, Wallet, WalletError, WalletStore};
use std::sync::Arc;
use uuid::Uuid;

fn mk_table(stacks: &[u64]) -> (HoldemEngine, Arc<InMemoryLedger>, Game) {
    let ledger = Arc::new(InMemoryLedger::new(0));
    let engine = HoldemEngine::new(ledger.clone(), TableConfig::default());
    let mut game = Game::with_seed(5);
    for (i, &stack) in stacks.iter().enumerate() {
        let id = i as i64 + 1;
        ledger.wallet(id).inc(stack).unwrap();
        game.seat(Player::new(id, format!("@p{id}"))).unwrap();
    }
    (engine, ledger, game)
}

#[test]
fn short_call_turns_into_all_in() {
    let (engine, ledger, mut game) = mk_table(&[1000, 1000, 7]);
    let mut view = RecordingPresenter::new();
    engine.start(&mut game, &mut view).unwrap();
    let outcome = engine.act(&mut game, &mut view, 3, PlayerAction::CallCheck).unwrap();
    assert_eq!(outcome, TurnOutcome::AwaitingAction { user_id: 1 });
    assert_eq!(game.player(3).map(Player::state), Some(PlayerState::AllIn));
    assert_eq!(ledger.wallet(3).value(), 0);
    assert_eq!(ledger.wallet(3).authorized(game.id()), 7);
    let last = game.players_bets().last().copied().unwrap();
    assert_eq!((last.user_id, last.amount, last.action), (3, 7, BetAction::AllIn));
}

#[test]
fn calling_with_the_last_chip_runs_the_board_out() {
    let (engine, ledger, mut game) = mk_table(&[1000, 500]);
    let mut view = RecordingPresenter::new();
    assert_eq!(engine.start(&mut game, &mut view).unwrap(), TurnOutcome::AwaitingAction { user_id: 1 });
    assert_eq!(
        engine.act(&mut game, &mut view, 1, PlayerAction::RaiseRate(490)).unwrap(),
        TurnOutcome::AwaitingAction { user_id: 2 }
    );

    let outcome = engine.act(&mut game, &mut view, 2, PlayerAction::CallCheck).unwrap();
    let TurnOutcome::Finished(settlement) = outcome else {
        panic!("nobody can bet against an empty stack, got {outcome:?}");
    };
    let call = game.players_bets().iter().rfind(|b| b.user_id == 2).copied().unwrap();
    assert_eq!((call.amount, call.action), (490, BetAction::AllIn));
    assert_eq!(game.community_cards().len(), 5);
    assert_eq!(settlement.pot, 1000);
    assert_eq!(view.events.iter().filter(|e| matches!(e, TableEvent::Prompt(_))).count(), 2);
    assert_eq!(ledger.wallet(1).value() + ledger.wallet(2).value(), 1500);
}

#[test]
fn raising_the_whole_stack_leaves_the_raiser_all_in() {
    let (engine, ledger, mut game) = mk_table(&[1000, 1000, 510]);
    engine.start(&mut game, &mut NullPresenter).unwrap();
    let outcome = engine.act(&mut game, &mut NullPresenter, 3, PlayerAction::RaiseRate(500)).unwrap();
    assert_eq!(outcome, TurnOutcome::AwaitingAction { user_id: 1 });
    assert_eq!(game.player(3).map(Player::state), Some(PlayerState::AllIn));
    assert_eq!(game.max_round_rate(), 510);
    assert_eq!(game.trading_end_user_id(), Some(3));
    assert_eq!(ledger.wallet(3).value(), 0);
    let last = game.players_bets().last().copied().unwrap();
    assert_eq!((last.amount, last.action), (510, BetAction::AllIn));
}

#[test]
fn oversized_raise_turns_into_all_in() {
    let (engine, ledger, mut game) = mk_table(&[1000, 1000, 60]);
    engine.start(&mut game, &mut NullPresenter).unwrap();
    engine.act(&mut game, &mut NullPresenter, 3, PlayerAction::RaiseRate(100)).unwrap();
    assert_eq!(game.player(3).map(Player::state), Some(PlayerState::AllIn));
    assert_eq!(game.max_round_rate(), 60);
    assert_eq!(game.trading_end_user_id(), Some(3));
    assert_eq!(ledger.wallet(3).value(), 0);
}

#[test]
fn broke_blind_posts_what_it_has() {
    let (engine, ledger, mut game) = mk_table(&[3, 1000, 1000]);
    let mut view = RecordingPresenter::new();
    engine.start(&mut game, &mut view).unwrap();
    let posted: Vec<_> = view
        .events
        .iter()
        .filter_map(|e| match e {
            TableEvent::Commitment { user_id, commitment } => Some((*user_id, commitment.action, commitment.amount)),
            _ => None,
        })
        .collect();
    assert_eq!(posted[0], (1, BetAction::AllIn, 3));
    assert_eq!(game.player(1).map(Player::state), Some(PlayerState::AllIn));
    assert_eq!(ledger.wallet(1).value(), 0);
}

#[test]
fn empty_wallet_is_marked_all_in_when_its_turn_comes() {
    let (engine, _, mut game) = mk_table(&[1000, 1000, 1000]);
    let mut view = NullPresenter;
    engine.start(&mut game, &mut view).unwrap();
    engine.act(&mut game, &mut view, 3, PlayerAction::CallCheck).unwrap();
    engine.act(&mut game, &mut view, 1, PlayerAction::CallCheck).unwrap();
    engine.act(&mut game, &mut view, 2, PlayerAction::CallCheck).unwrap();
    assert_eq!(game.state(), chat_holdem::game::GameState::RoundFlop);

    // user 2's balance is spent at another table before the turn comes back
    engine.wallets().wallet(2).authorize_all(Uuid::new_v4());
    let outcome = engine.act(&mut game, &mut view, 1, PlayerAction::CallCheck).unwrap();
    assert_eq!(outcome, TurnOutcome::AwaitingAction { user_id: 3 });
    assert_eq!(game.player(2).map(Player::state), Some(PlayerState::AllIn));
}

#[test]
fn top_up_only_refills_empty_wallets() {
    let (engine, ledger, game) = mk_table(&[0, 50]);
    assert_eq!(engine.top_up(&game, 1), Ok(1000));
    assert_eq!(ledger.wallet(1).value(), 1000);
    assert_eq!(engine.top_up(&game, 2), Err(EngineError::Wallet(WalletError::NotEmpty(50))));
}
