//! Outbound table events. The engine reports what happened; delivering it to
//! people is up to the host.

use crate::betting::Commitment;
use crate::game::{BetAction, Game, Money, Player, UserId};
use crate::hand::{Board, HoleCards};
use crate::settlement::Settlement;

/// What the player holding the turn may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPrompt {
    pub user_id: UserId,
    pub mention: String,
    pub available: Money,
    pub to_call: Money,
    pub pot: Money,
    pub max_round_rate: Money,
    pub board: Board,
    /// [`BetAction::Bet`] when nothing is owed, [`BetAction::Raise`] otherwise.
    pub raise_action: BetAction,
    /// Configured raise steps the player can pay for on top of the call.
    pub raise_steps: Vec<Money>,
}

impl TurnPrompt {
    pub fn new(game: &Game, player: &Player, available: Money, raise_steps: &[Money]) -> Self {
        let to_call = game.max_round_rate().saturating_sub(player.round_rate());
        Self {
            user_id: player.user_id(),
            mention: player.mention().to_owned(),
            available,
            to_call,
            pot: game.pot(),
            max_round_rate: game.max_round_rate(),
            board: game.board().clone(),
            raise_action: if to_call == 0 { BetAction::Bet } else { BetAction::Raise },
            raise_steps: raise_steps
                .iter()
                .copied()
                .filter(|&step| step.checked_add(to_call).is_some_and(|total| total <= available))
                .collect(),
        }
    }

    /// Whether the call/check button is a check.
    pub fn is_check(&self) -> bool {
        self.to_call == 0
    }
}

/// Every method defaults to doing nothing.
pub trait Presenter {
    fn show_hole_cards(&mut self, _player: &Player) {}

    fn show_board(&mut self, _board: &Board, _pot: Money) {}

    fn prompt_turn(&mut self, _prompt: &TurnPrompt) {}

    fn announce_commitment(&mut self, _player: &Player, _commitment: Commitment) {}

    fn announce_fold(&mut self, _player: &Player) {}

    fn announce_settlement(&mut self, _settlement: &Settlement) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    HoleCards { user_id: UserId, hole: Option<HoleCards> },
    Board { board: Board, pot: Money },
    Prompt(TurnPrompt),
    Commitment { user_id: UserId, commitment: Commitment },
    Fold { user_id: UserId },
    Settlement(Settlement),
}

/// Keeps every event in order. Handy for replaying what a table saw.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    pub events: Vec<TableEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_prompt(&self) -> Option<&TurnPrompt> {
        self.events.iter().rev().find_map(|e| match e {
            TableEvent::Prompt(p) => Some(p),
            _ => None,
        })
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.events.iter().rev().find_map(|e| match e {
            TableEvent::Settlement(s) => Some(s),
            _ => None,
        })
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.events.iter().filter_map(|e| match e {
            TableEvent::Board { board, .. } => Some(board),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn show_hole_cards(&mut self, player: &Player) {
        self.events.push(TableEvent::HoleCards { user_id: player.user_id(), hole: player.hole() });
    }

    fn show_board(&mut self, board: &Board, pot: Money) {
        self.events.push(TableEvent::Board { board: board.clone(), pot });
    }

    fn prompt_turn(&mut self, prompt: &TurnPrompt) {
        self.events.push(TableEvent::Prompt(prompt.clone()));
    }

    fn announce_commitment(&mut self, player: &Player, commitment: Commitment) {
        self.events.push(TableEvent::Commitment { user_id: player.user_id(), commitment });
    }

    fn announce_fold(&mut self, player: &Player) {
        self.events.push(TableEvent::Fold { user_id: player.user_id() });
    }

    fn announce_settlement(&mut self, settlement: &Settlement) {
        self.events.push(TableEvent::Settlement(settlement.clone()));
    }
}
