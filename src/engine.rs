//! Hand state machine: dealing, turn rotation, round transitions and the
//! hand-off to settlement.
//!
//! The engine is synchronous. Every call runs its round transitions and the
//! settlement they trigger before returning, and reports what the table is
//! waiting for next.

use crate::betting;
use crate::config::TableConfig;
use crate::evaluator::EvalError;
use crate::game::{Game, GameState, Money, PlayerState, SeatError, UserId};
use crate::hand::HoleCards;
use crate::presenter::{Presenter, TurnPrompt};
use crate::settlement::{self, Settlement};
use crate::wallet::{self, WalletError, WalletStore};
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("the hand has already started")]
    AlreadyStarted,
    #[error("no hand is being played")]
    NotStarted,
    #[error("no players are seated")]
    NoPlayers,
    #[error("unexpected state: {0}")]
    InvalidStateTransition(GameState),
    #[error("turn rotation did not settle on a player")]
    TurnRotationExhausted,
    #[error("the deck ran out of cards")]
    DeckExhausted,
    #[error(transparent)]
    Seat(#[from] SeatError),
    #[error(transparent)]
    Evaluation(#[from] EvalError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// A move by the player holding the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Fold,
    CallCheck,
    /// Raise by this much on top of the call.
    RaiseRate(Money),
    AllIn,
}

/// What the table is waiting for after a call into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action came from someone other than the turn holder, or no hand is
    /// being played. Nothing changed.
    Ignored,
    AwaitingAction { user_id: UserId },
    Finished(Settlement),
}

pub struct HoldemEngine {
    wallets: Arc<dyn WalletStore>,
    config: TableConfig,
}

impl HoldemEngine {
    pub fn new(wallets: Arc<dyn WalletStore>, config: TableConfig) -> Self {
        Self { wallets, config }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn wallets(&self) -> &dyn WalletStore {
        self.wallets.as_ref()
    }

    /// Deal hole cards, post the blinds and prompt the first player.
    pub fn start(&self, game: &mut Game, presenter: &mut dyn Presenter) -> Result<TurnOutcome, EngineError> {
        if game.state != GameState::Initial {
            return Err(EngineError::AlreadyStarted);
        }
        let n = game.players.len();
        if n == 0 {
            return Err(EngineError::NoPlayers);
        }
        log::info!("new game: {}, players count: {}", game.id, n);

        game.state = GameState::RoundPreFlop;
        for i in 0..n {
            let hole = HoleCards::deal(&mut game.deck).ok_or(EngineError::DeckExhausted)?;
            game.players[i].hole = Some(hole);
            presenter.show_hole_cards(&game.players[i]);
        }

        let blinds = betting::post_blinds(game, self.wallets.as_ref(), self.config.small_blind)?;
        for (seat, commitment) in [0, 1 % n].into_iter().zip(blinds) {
            presenter.announce_commitment(&game.players[seat], commitment);
        }

        game.current_player_index = Some(1 % n);
        let outcome = self.advance(game, presenter)?;
        // the opening seat closes pre-flop, so the big blind keeps its option
        if game.state == GameState::RoundPreFlop {
            game.trading_end_user_id = Some(game.players[2 % n].user_id);
        }
        Ok(outcome)
    }

    /// Apply `action` for `user_id`. Anyone but the turn holder is ignored.
    pub fn act(
        &self,
        game: &mut Game,
        presenter: &mut dyn Presenter,
        user_id: UserId,
        action: PlayerAction,
    ) -> Result<TurnOutcome, EngineError> {
        let seat = match self.turn_holder(game) {
            Some(seat) if game.players[seat].user_id == user_id => seat,
            _ => {
                log::debug!("game {}: discarding {:?} from {} out of turn", game.id, action, user_id);
                return Ok(TurnOutcome::Ignored);
            }
        };

        let wallet = self.wallets.wallet(user_id);
        let commitment = match action {
            PlayerAction::Fold => None,
            PlayerAction::CallCheck | PlayerAction::RaiseRate(0) => {
                Some(betting::call_check(game, seat, wallet.as_ref())?)
            }
            PlayerAction::RaiseRate(amount) => Some(betting::raise_rate_bet(game, seat, wallet.as_ref(), amount)?),
            PlayerAction::AllIn => Some(betting::all_in(game, seat, wallet.as_ref())?),
        };
        match commitment {
            Some(c) => {
                log::debug!("game {}: {} {} {}", game.id, user_id, c.action.label(), c.amount);
                presenter.announce_commitment(&game.players[seat], c);
            }
            None => {
                betting::fold(game, seat);
                log::debug!("game {}: {} fold", game.id, user_id);
                presenter.announce_fold(&game.players[seat]);
            }
        }

        self.advance(game, presenter)
    }

    /// The seat allowed to act, if a betting round is open.
    pub fn turn_holder(&self, game: &Game) -> Option<usize> {
        if !game.state.is_betting_round() {
            return None;
        }
        let seat = game.current_player_index?;
        (game.players.get(seat)?.state == PlayerState::Active).then_some(seat)
    }

    /// Rebuild the prompt for the player holding the turn, e.g. after the
    /// original message was lost.
    pub fn current_prompt(&self, game: &Game) -> Result<TurnPrompt, EngineError> {
        let seat = self.turn_holder(game).ok_or(EngineError::NotStarted)?;
        let player = &game.players[seat];
        let available = self.wallets.wallet(player.user_id).value();
        Ok(TurnPrompt::new(game, player, available, &self.config.raise_steps))
    }

    /// Cancel the hand: refund every escrow and go back to `Initial`.
    pub fn abort(&self, game: &mut Game) -> Result<(), EngineError> {
        let mut refunded: Money = 0;
        for p in &game.players {
            let wallet = self.wallets.wallet(p.user_id);
            let amount = wallet.authorized(game.id);
            if amount > 0 {
                wallet.inc(amount)?;
                refunded += amount;
            }
            wallet.approve(game.id);
        }
        log::info!("game aborted: {}, refunded: {}", game.id, refunded);
        game.reset();
        Ok(())
    }

    /// Refill an empty wallet between hands.
    pub fn top_up(&self, game: &Game, user_id: UserId) -> Result<Money, EngineError> {
        if game.state.is_betting_round() {
            return Err(EngineError::AlreadyStarted);
        }
        let wallet = self.wallets.wallet(user_id);
        Ok(wallet::top_up(wallet.as_ref(), self.config.top_up_amount)?)
    }

    /// Reset a finished game for the next hand, moving the blinds one seat.
    pub fn next_hand(&self, game: &mut Game) -> Result<(), EngineError> {
        if game.state.is_betting_round() {
            return Err(EngineError::AlreadyStarted);
        }
        let previous: Vec<UserId> = game.players.iter().map(|p| p.user_id).collect();
        game.reset();
        game.rotate_seating(&previous)?;
        Ok(())
    }

    /// Move the turn forward until someone has to act or the hand is over.
    fn advance(&self, game: &mut Game, presenter: &mut dyn Presenter) -> Result<TurnOutcome, EngineError> {
        let n = game.players.len();
        // each round visits every seat at most once before closing
        let limit = (n + 1) * 5;

        for _ in 0..limit {
            if game.count_by(&[PlayerState::Active, PlayerState::AllIn]) <= 1 {
                return self.finish(game, presenter);
            }

            let mut seat = game.current_player_index.map_or(0, |i| (i + 1) % n);
            game.current_player_index = Some(seat);

            if game.trading_end_user_id == Some(game.players[seat].user_id) && round_is_matched(game) {
                betting::to_pot(game);
                if let Some(settlement) = self.next_round(game, presenter)? {
                    return Ok(TurnOutcome::Finished(settlement));
                }
                seat = 0;
                game.current_player_index = Some(seat);
            }

            let user_id = game.players[seat].user_id;
            let available = self.wallets.wallet(user_id).value();
            if game.players[seat].state == PlayerState::Active && available == 0 {
                log::debug!("game {}: {} has no money left, marking all in", game.id, user_id);
                game.players[seat].state = PlayerState::AllIn;
            }
            if game.players[seat].state != PlayerState::Active {
                continue;
            }

            let prompt = TurnPrompt::new(game, &game.players[seat], available, &self.config.raise_steps);
            presenter.prompt_turn(&prompt);
            return Ok(TurnOutcome::AwaitingAction { user_id });
        }
        Err(EngineError::TurnRotationExhausted)
    }

    /// Round transition. Returns the settlement when the hand is over.
    fn next_round(&self, game: &mut Game, presenter: &mut dyn Presenter) -> Result<Option<Settlement>, EngineError> {
        let active: Vec<usize> =
            (0..game.players.len()).filter(|&i| game.players[i].state == PlayerState::Active).collect();
        if let &[last] = active.as_slice() {
            log::debug!("game {}: {} is the last active player, marking all in", game.id, game.players[last].user_id);
            game.players[last].state = PlayerState::AllIn;
            if game.board.is_complete() {
                return self.finish(game, presenter).map(settled);
            }
        }

        let (next, reveal) = match game.state {
            GameState::RoundPreFlop => (GameState::RoundFlop, 3),
            GameState::RoundFlop => (GameState::RoundTurn, 1),
            GameState::RoundTurn => (GameState::RoundRiver, 1),
            GameState::RoundRiver => {
                game.state = GameState::Finished;
                return self.finish(game, presenter).map(settled);
            }
            state @ (GameState::Initial | GameState::Finished) => {
                return Err(EngineError::InvalidStateTransition(state));
            }
        };
        log::debug!("game {}: {} -> {}", game.id, game.state, next);
        game.state = next;

        game.board.reveal(&mut game.deck, reveal).ok_or(EngineError::DeckExhausted)?;
        presenter.show_board(&game.board, game.pot);
        Ok(None)
    }

    fn finish(&self, game: &mut Game, presenter: &mut dyn Presenter) -> Result<TurnOutcome, EngineError> {
        let settlement = settlement::settle(game, self.wallets.as_ref())?;
        presenter.announce_settlement(&settlement);
        Ok(TurnOutcome::Finished(settlement))
    }
}

fn settled(outcome: TurnOutcome) -> Option<Settlement> {
    match outcome {
        TurnOutcome::Finished(s) => Some(s),
        _ => None,
    }
}

/// Every player still able to bet has matched the max round rate.
fn round_is_matched(game: &Game) -> bool {
    game.players
        .iter()
        .filter(|p| p.state == PlayerState::Active)
        .all(|p| p.round_rate == game.max_round_rate)
}

impl std::fmt::Debug for HoldemEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldemEngine").field("config", &self.config).finish_non_exhaustive()
    }
}
