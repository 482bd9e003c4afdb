use chat_holdem::config::TableConfig;
use chat_holdem::engine::{HoldemEngine, PlayerAction, TurnOutcome};
use chat_holdem::game::{Game, GameState, Player, PlayerState};
use chat_holdem::presenter::NullPresenter;
use chat_holdem::wallet::{InMemoryLedger, Wallet, WalletStore};
use proptest::prelude::*;
use std::sync::Arc;

fn any_action() -> impl Strategy<Value = PlayerAction> {
    prop_oneof![
        4 => Just(PlayerAction::CallCheck),
        1 => Just(PlayerAction::Fold),
        1 => Just(PlayerAction::AllIn),
        2 => (1u64..400).prop_map(PlayerAction::RaiseRate),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn money_is_conserved_through_random_hands(
        seed in any::<u64>(),
        stacks in prop::collection::vec(1u64..3000, 2..7),
        actions in prop::collection::vec(any_action(), 1..200),
    ) {
        let ledger = Arc::new(InMemoryLedger::new(0));
        let engine = HoldemEngine::new(ledger.clone(), TableConfig::default());
        let mut game = Game::with_seed(seed);
        for (i, &stack) in stacks.iter().enumerate() {
            let id = i as i64 + 1;
            ledger.wallet(id).inc(stack).unwrap();
            game.seat(Player::new(id, format!("@p{id}"))).unwrap();
        }
        let total: u64 = stacks.iter().sum();
        let id = game.id();

        let mut outcome = engine.start(&mut game, &mut NullPresenter).unwrap();
        let mut actions = actions.into_iter();
        loop {
            prop_assert_eq!(ledger.total(id), total);
            let escrow: u64 = game.players().iter().map(|p| ledger.wallet(p.user_id()).authorized(id)).sum();
            match outcome {
                TurnOutcome::AwaitingAction { user_id } => {
                    prop_assert_eq!(game.pot() + game.round_rates_total(), escrow);
                    let holder = game.current_player().unwrap();
                    prop_assert_eq!(holder.user_id(), user_id);
                    prop_assert_eq!(holder.state(), PlayerState::Active);
                    let Some(action) = actions.next() else { break };
                    outcome = engine.act(&mut game, &mut NullPresenter, user_id, action).unwrap();
                }
                TurnOutcome::Finished(ref settlement) => {
                    prop_assert_eq!(escrow, 0);
                    prop_assert_eq!(game.state(), GameState::Finished);
                    prop_assert_eq!(settlement.awards.iter().map(|a| a.amount).sum::<u64>(), settlement.pot);
                    let available: u64 = (1..=stacks.len() as i64).map(|u| ledger.wallet(u).value()).sum();
                    prop_assert_eq!(available, total);
                    break;
                }
                TurnOutcome::Ignored => prop_assert!(false, "engine ignored its own turn holder"),
            }
        }

        engine.abort(&mut game).unwrap();
        let available: u64 = (1..=stacks.len() as i64).map(|u| ledger.wallet(u).value()).sum();
        prop_assert_eq!(available, total);
    }
}
