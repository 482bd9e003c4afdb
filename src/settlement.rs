//! Showdown: pot distribution across score tiers, side pots included.
//!
//! Contenders are grouped into tiers of equal score and walked from best to
//! worst. Inside a tier each contender is paid in proportion to what they
//! escrowed for the hand, computed against the pot as it stood when the tier
//! started, and never more than `contribution * player_count`. That cap is
//! what leaves the layers above a short stack to the next tier.

use crate::engine::EngineError;
use crate::evaluator::{evaluate_holdem, EvalError, Evaluation, HandValue};
use crate::game::{Game, GameId, GameState, Money, PlayerState, UserId};
use crate::hand::{Board, HoleCards};
use crate::wallet::{WalletError, WalletStore};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
    pub user_id: UserId,
    pub contribution: Money,
    pub hand: Option<Evaluation>,
}

impl Contender {
    fn score(&self) -> Option<HandValue> {
        self.hand.map(|h| h.value())
    }
}

/// Contenders sharing one score, in seat order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub score: Option<HandValue>,
    pub contenders: Vec<Contender>,
}

impl Tier {
    pub fn authorized(&self) -> Money {
        self.contenders.iter().map(|c| c.contribution).sum()
    }
}

/// Group contenders by score, best tier first. Seat order is kept inside a
/// tier.
pub fn tiers_by_score(contenders: &[Contender]) -> Vec<Tier> {
    let mut tiers: Vec<Tier> = Vec::new();
    for c in contenders {
        match tiers.iter_mut().find(|t| t.score == c.score()) {
            Some(t) => t.contenders.push(*c),
            None => tiers.push(Tier { score: c.score(), contenders: vec![*c] }),
        }
    }
    tiers.sort_by(|a, b| b.score.cmp(&a.score));
    tiers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Award {
    pub user_id: UserId,
    pub amount: Money,
    /// Absent when the pot was won uncontested.
    pub hand: Option<Evaluation>,
}

/// `value * num / den` rounded half to even.
fn proportional(value: Money, num: Money, den: Money) -> Money {
    let n = value as u128 * num as u128;
    let d = den as u128;
    let (q, r) = (n / d, n % d);
    let rounded = match (2 * r).cmp(&d) {
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal if q % 2 == 1 => q + 1,
        _ => q,
    };
    rounded.min(Money::MAX as u128) as Money
}

fn credit(awards: &mut Vec<Award>, contender: &Contender, amount: Money) {
    if amount == 0 {
        return;
    }
    match awards.iter_mut().find(|a| a.user_id == contender.user_id) {
        Some(a) => a.amount += amount,
        None => awards.push(Award { user_id: contender.user_id, amount, hand: contender.hand }),
    }
}

/// Split `pot` over `tiers` (best first). `player_count` is the number of
/// seats in the hand, folded ones included.
///
/// Whatever the tier walk leaves in the pot is shared evenly by the best tier,
/// odd chips going to the earliest seats, so the awards always sum to `pot`.
pub fn distribute(pot: Money, tiers: &[Tier], player_count: usize) -> Vec<Award> {
    let mut awards = Vec::new();
    let mut remaining = pot;

    for tier in tiers {
        let tier_authorized = tier.authorized();
        if tier_authorized == 0 || remaining == 0 {
            continue;
        }
        let tier_pot = remaining;
        for c in &tier.contenders {
            if remaining == 0 {
                break;
            }
            let share = proportional(tier_pot, c.contribution, tier_authorized);
            let cap = c.contribution.saturating_mul(player_count as Money);
            let win = share.min(cap).min(remaining);
            credit(&mut awards, c, win);
            remaining -= win;
        }
    }

    if remaining > 0 {
        if let Some(best) = tiers.iter().find(|t| !t.contenders.is_empty()) {
            log::warn!("{remaining} left after the tier walk, sharing it across the best hand");
            let n = best.contenders.len() as Money;
            let (each, odd) = (remaining / n, remaining % n);
            for (i, c) in best.contenders.iter().enumerate() {
                credit(&mut awards, c, each + Money::from((i as Money) < odd));
            }
        }
    }
    awards
}

/// Outcome of a finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub game_id: GameId,
    pub board: Board,
    pub pot: Money,
    pub awards: Vec<Award>,
    /// Hole cards of every contender that reached the showdown.
    pub revealed: Vec<(UserId, HoleCards)>,
    pub uncontested: bool,
}

impl Settlement {
    pub fn amount_for(&self, user_id: UserId) -> Money {
        self.awards.iter().filter(|a| a.user_id == user_id).map(|a| a.amount).sum()
    }
}

/// Sweep the last round, pay the pot out and clear every escrow. Leaves the
/// game in `Finished`.
pub fn settle(game: &mut Game, wallets: &dyn WalletStore) -> Result<Settlement, EngineError> {
    crate::betting::to_pot(game);
    let pot = game.pot;

    let seats: Vec<usize> = (0..game.players.len())
        .filter(|&i| matches!(game.players[i].state, PlayerState::Active | PlayerState::AllIn))
        .collect();
    let uncontested = seats.len() == 1;

    let mut contenders = Vec::with_capacity(seats.len());
    let mut revealed = Vec::new();
    if uncontested {
        let p = &game.players[seats[0]];
        contenders.push(Contender { user_id: p.user_id, contribution: pot, hand: None });
    } else {
        game.board.run_out(&mut game.deck).ok_or(EngineError::DeckExhausted)?;
        for &i in &seats {
            let p = &game.players[i];
            let hole = p.hole.ok_or(EvalError::DegenerateHandInput(game.board.len()))?;
            let hand = evaluate_holdem(&hole, &game.board)?;
            let contribution = wallets.wallet(p.user_id).authorized(game.id);
            contenders.push(Contender { user_id: p.user_id, contribution, hand: Some(hand) });
            revealed.push((p.user_id, hole));
        }
    }

    let awards = distribute(pot, &tiers_by_score(&contenders), game.players.len());
    let payees: Vec<_> = awards.iter().map(|a| (wallets.wallet(a.user_id), a.amount)).collect();
    // nothing is credited unless every credit fits, so a failed payout
    // leaves the escrows for `abort` to refund
    if let Some((w, _)) = payees.iter().find(|(w, amount)| w.value().checked_add(*amount).is_none()) {
        log::warn!("game {}: payout would overflow a wallet holding {}", game.id, w.value());
        return Err(WalletError::Overflow.into());
    }
    for (wallet, amount) in &payees {
        wallet.inc(*amount)?;
        game.pot -= amount;
    }
    for p in &game.players {
        wallets.wallet(p.user_id).approve(game.id);
    }

    game.state = GameState::Finished;
    game.current_player_index = None;
    log::info!("game finished: {}, players count: {}, pot: {}", game.id, game.players.len(), pot);

    Ok(Settlement {
        game_id: game.id,
        board: game.board.clone(),
        pot,
        awards,
        revealed,
        uncontested,
    })
}
