//! Betting actions against a [`Game`]'s round state.
//!
//! Each action authorizes money from the acting player's wallet and records
//! it in the bet log. A wallet that cannot cover an action never fails the
//! action: it is replayed as an all-in instead. An action that spends the
//! balance exactly leaves the player all in as well.

use crate::game::{BetAction, Game, Money, PlayerState};
use crate::wallet::{Wallet, WalletError, WalletStore};

/// Money moved by one accepted action and what it was recorded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    pub action: BetAction,
    pub amount: Money,
}

/// Match the current max round rate. A zero delta is a check.
pub fn call_check(game: &mut Game, seat: usize, wallet: &dyn Wallet) -> Result<Commitment, WalletError> {
    let delta = game.max_round_rate.saturating_sub(game.players[seat].round_rate);
    match wallet.authorize(game.id, delta) {
        Ok(()) => {
            let player = &mut game.players[seat];
            player.round_rate += delta;
            let action = if delta == 0 {
                BetAction::Check
            } else if wallet.value() == 0 {
                player.state = PlayerState::AllIn;
                BetAction::AllIn
            } else {
                BetAction::Call
            };
            let user_id = player.user_id;
            game.record_bet(user_id, delta, action);
            Ok(Commitment { action, amount: delta })
        }
        Err(WalletError::InsufficientFunds { available, requested }) => {
            log::debug!("call of {requested} exceeds {available} available, going all in");
            all_in(game, seat, wallet)
        }
        Err(e) => Err(e),
    }
}

/// Raise the round by `amount` on top of whatever is needed to call.
///
/// The raiser becomes the trading end: everyone else acts again before the
/// round can close. Recorded as a bet when the player already matched the max.
pub fn raise_rate_bet(
    game: &mut Game,
    seat: usize,
    wallet: &dyn Wallet,
    amount: Money,
) -> Result<Commitment, WalletError> {
    let action = if game.players[seat].round_rate == game.max_round_rate {
        BetAction::Bet
    } else {
        BetAction::Raise
    };
    raise_as(game, seat, wallet, amount, action)
}

fn raise_as(
    game: &mut Game,
    seat: usize,
    wallet: &dyn Wallet,
    amount: Money,
    action: BetAction,
) -> Result<Commitment, WalletError> {
    let delta = game.max_round_rate.saturating_sub(game.players[seat].round_rate);
    let total = amount.checked_add(delta).ok_or(WalletError::Overflow)?;
    match wallet.authorize(game.id, total) {
        Ok(()) => {
            let player = &mut game.players[seat];
            player.round_rate += total;
            // a stack spent to the last chip can take no further part in betting
            let action = if wallet.value() == 0 {
                player.state = PlayerState::AllIn;
                if action.is_blind() { action } else { BetAction::AllIn }
            } else {
                action
            };
            let user_id = player.user_id;
            game.max_round_rate = player.round_rate;
            game.trading_end_user_id = Some(user_id);
            game.record_bet(user_id, total, action);
            Ok(Commitment { action, amount: total })
        }
        Err(WalletError::InsufficientFunds { available, requested }) => {
            log::debug!("{} of {requested} exceeds {available} available, going all in", action.label());
            all_in(game, seat, wallet)
        }
        Err(e) => Err(e),
    }
}

/// Commit the whole available balance. A stack that tops the current max
/// reopens the betting.
pub fn all_in(game: &mut Game, seat: usize, wallet: &dyn Wallet) -> Result<Commitment, WalletError> {
    let amount = wallet.authorize_all(game.id);
    let player = &mut game.players[seat];
    player.round_rate += amount;
    player.state = PlayerState::AllIn;
    let (user_id, round_rate) = (player.user_id, player.round_rate);
    if round_rate > game.max_round_rate {
        game.max_round_rate = round_rate;
        game.trading_end_user_id = Some(user_id);
    }
    game.record_bet(user_id, amount, BetAction::AllIn);
    Ok(Commitment { action: BetAction::AllIn, amount })
}

/// Folded chips stay in the round and are swept with everyone else's.
pub fn fold(game: &mut Game, seat: usize) {
    game.players[seat].state = PlayerState::Fold;
}

/// Close a betting round: move every seat's round rate into the pot.
pub fn to_pot(game: &mut Game) {
    for p in &mut game.players {
        game.pot += p.round_rate;
        p.round_rate = 0;
    }
    game.max_round_rate = 0;
    game.trading_end_user_id = game.players.first().map(|p| p.user_id);
}

/// Forced small and big blind from the first two seats. The big blind is
/// posted as a raise of `small_blind` over the small blind.
pub fn post_blinds(
    game: &mut Game,
    wallets: &dyn WalletStore,
    small_blind: Money,
) -> Result<[Commitment; 2], WalletError> {
    let n = game.players.len();
    let sb_seat = 0;
    let bb_seat = 1 % n;
    let wallet = wallets.wallet(game.players[sb_seat].user_id);
    let small = raise_as(game, sb_seat, wallet.as_ref(), small_blind, BetAction::SmallBlind)?;
    let wallet = wallets.wallet(game.players[bb_seat].user_id);
    let big = raise_as(game, bb_seat, wallet.as_ref(), small_blind, BetAction::BigBlind)?;
    Ok([small, big])
}
