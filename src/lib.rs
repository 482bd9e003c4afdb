//! chat-holdem: Texas Hold'em hands for a group chat
//!
//! The crate covers the parts of a chat poker table that carry real rules:
//! - Hand evaluation over 5 to 7 cards with a totally ordered score
//! - Escrow-based wallets (`available` plus per-hand `authorized` money)
//! - Betting actions, turn rotation and round transitions
//! - Pot settlement with side pots
//!
//! Message delivery is left to the host through the [`presenter::Presenter`]
//! trait, and wallet storage through [`wallet::WalletStore`].
//!
//! ## Quick start: play a hand
//! ```
//! use std::sync::Arc;
//! use chat_holdem::config::TableConfig;
//! use chat_holdem::engine::{HoldemEngine, PlayerAction, TurnOutcome};
//! use chat_holdem::game::{Game, Player};
//! use chat_holdem::presenter::NullPresenter;
//! use chat_holdem::wallet::InMemoryLedger;
//!
//! let engine = HoldemEngine::new(Arc::new(InMemoryLedger::new(1000)), TableConfig::default());
//! let mut game = Game::with_seed(7);
//! game.seat(Player::new(1, "@ann")).unwrap();
//! game.seat(Player::new(2, "@bob")).unwrap();
//!
//! let mut outcome = engine.start(&mut game, &mut NullPresenter).unwrap();
//! while let TurnOutcome::AwaitingAction { user_id } = outcome {
//!     outcome = engine.act(&mut game, &mut NullPresenter, user_id, PlayerAction::CallCheck).unwrap();
//! }
//! let TurnOutcome::Finished(settlement) = outcome else { unreachable!() };
//! assert_eq!(settlement.awards.iter().map(|a| a.amount).sum::<u64>(), 20);
//! ```
//!
//! ## Terminal table
//! ```sh
//! cargo run --bin holdem -- ann bob carol
//! ```

pub mod betting;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod evaluator;
pub mod game;
pub mod hand;
pub mod presenter;
pub mod settlement;
pub mod wallet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
