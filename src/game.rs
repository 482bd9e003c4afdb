use crate::cards::Card;
use crate::deck::Deck;
use crate::hand::{Board, HoleCards};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type UserId = i64;
pub type Money = u64;
pub type GameId = Uuid;

/// Hand progression. `Initial` is the only entry state and `Finished` holds
/// until [`Game::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Initial,
    RoundPreFlop,
    RoundFlop,
    RoundTurn,
    RoundRiver,
    Finished,
}

impl GameState {
    /// Community cards on the table once this round has been reached.
    pub const fn community_cards(self) -> usize {
        match self {
            GameState::Initial | GameState::RoundPreFlop => 0,
            GameState::RoundFlop => 3,
            GameState::RoundTurn => 4,
            GameState::RoundRiver | GameState::Finished => 5,
        }
    }

    pub const fn is_betting_round(self) -> bool {
        matches!(
            self,
            GameState::RoundPreFlop | GameState::RoundFlop | GameState::RoundTurn | GameState::RoundRiver
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameState::Initial => "initial",
            GameState::RoundPreFlop => "pre-flop",
            GameState::RoundFlop => "flop",
            GameState::RoundTurn => "turn",
            GameState::RoundRiver => "river",
            GameState::Finished => "finished",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Active,
    Fold,
    AllIn,
}

/// What an authorization recorded in the bet log was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BetAction {
    SmallBlind,
    BigBlind,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

impl BetAction {
    pub fn label(self) -> &'static str {
        match self {
            BetAction::SmallBlind => "small blind",
            BetAction::BigBlind => "big blind",
            BetAction::Check => "check",
            BetAction::Call => "call",
            BetAction::Bet => "bet",
            BetAction::Raise => "raise rate",
            BetAction::AllIn => "all in",
        }
    }

    pub fn is_blind(self) -> bool {
        matches!(self, BetAction::SmallBlind | BetAction::BigBlind)
    }
}

/// One authorization made during a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBet {
    pub user_id: UserId,
    pub amount: Money,
    pub state: GameState,
    pub action: BetAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub(crate) user_id: UserId,
    pub(crate) mention: String,
    pub(crate) hole: Option<HoleCards>,
    pub(crate) state: PlayerState,
    pub(crate) round_rate: Money,
}

impl Player {
    pub fn new(user_id: UserId, mention: impl Into<String>) -> Self {
        Self { user_id, mention: mention.into(), hole: None, state: PlayerState::Active, round_rate: 0 }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Display handle used when addressing the player.
    pub fn mention(&self) -> &str {
        &self.mention
    }

    pub fn hole(&self) -> Option<HoleCards> {
        self.hole
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Chips committed in the current betting round.
    pub fn round_rate(&self) -> Money {
        self.round_rate
    }

    fn clear_hand(&mut self) {
        self.hole = None;
        self.state = PlayerState::Active;
        self.round_rate = 0;
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SeatError {
    #[error("players can only be seated before the hand starts")]
    HandInProgress,
    #[error("user {0} is already seated")]
    AlreadySeated(UserId),
}

/// One table's hand in progress, or waiting for the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub(crate) id: GameId,
    pub(crate) state: GameState,
    pub(crate) players: Vec<Player>,
    pub(crate) pot: Money,
    pub(crate) max_round_rate: Money,
    pub(crate) trading_end_user_id: Option<UserId>,
    pub(crate) board: Board,
    pub(crate) deck: Deck,
    pub(crate) current_player_index: Option<usize>,
    pub(crate) players_bets: Vec<PlayerBet>,
    /// Seed of the current shuffle when the table was built with one.
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// An empty table in `Initial` with a freshly shuffled deck.
    pub fn new() -> Self {
        Self::with_deck(Deck::shuffled())
    }

    /// Same as [`Game::new`] with a reproducible shuffle.
    ///
    /// Every later hand is shuffled from a seed derived from this one, so a
    /// whole session replays identically.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::with_deck(Deck::shuffled_with_seed(seed)) }
    }

    pub fn with_deck(deck: Deck) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: GameState::Initial,
            players: Vec::new(),
            pot: 0,
            max_round_rate: 0,
            trading_end_user_id: None,
            board: Board::new(),
            deck,
            current_player_index: None,
            players_bets: Vec::new(),
            seed: None,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, user_id: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    /// Chips swept from closed betting rounds.
    pub fn pot(&self) -> Money {
        self.pot
    }

    pub fn max_round_rate(&self) -> Money {
        self.max_round_rate
    }

    /// The player whose turn, once reached with every bet matched, closes
    /// the betting round.
    pub fn trading_end_user_id(&self) -> Option<UserId> {
        self.trading_end_user_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn community_cards(&self) -> &[Card] {
        self.board.as_slice()
    }

    pub fn remaining_cards(&self) -> usize {
        self.deck.len()
    }

    pub fn current_player_index(&self) -> Option<usize> {
        self.current_player_index
    }

    /// The player holding the turn, if a hand is being played.
    pub fn current_player(&self) -> Option<&Player> {
        if !self.state.is_betting_round() || self.players.is_empty() {
            return None;
        }
        self.current_player_index.map(|i| &self.players[i % self.players.len()])
    }

    pub fn players_bets(&self) -> &[PlayerBet] {
        &self.players_bets
    }

    pub fn players_by<'a>(
        &'a self,
        states: &'a [PlayerState],
    ) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.iter().filter(move |p| states.contains(&p.state))
    }

    pub fn count_by(&self, states: &[PlayerState]) -> usize {
        self.players_by(states).count()
    }

    /// Everything `user_id` has authorized this hand according to the bet log.
    pub fn contribution(&self, user_id: UserId) -> Money {
        self.players_bets.iter().filter(|b| b.user_id == user_id).map(|b| b.amount).sum()
    }

    /// Chips committed to the hand that are not yet in the pot.
    pub fn round_rates_total(&self) -> Money {
        self.players.iter().map(|p| p.round_rate).sum()
    }

    /// Append a player to the seating. Seating order is the turn order.
    pub fn seat(&mut self, player: Player) -> Result<(), SeatError> {
        if self.state != GameState::Initial {
            return Err(SeatError::HandInProgress);
        }
        if self.player(player.user_id).is_some() {
            return Err(SeatError::AlreadySeated(player.user_id));
        }
        self.players.push(player);
        Ok(())
    }

    /// Replace the undealt deck, e.g. to replay a seeded or stacked hand.
    pub fn set_deck(&mut self, deck: Deck) -> Result<(), SeatError> {
        if self.state != GameState::Initial {
            return Err(SeatError::HandInProgress);
        }
        self.deck = deck;
        Ok(())
    }

    /// Reorder the seats so that the previous hand's order is rotated by one
    /// (its last seat moves to the front). Users missing from `previous` are
    /// seated first, keeping their relative order.
    pub fn rotate_seating(&mut self, previous: &[UserId]) -> Result<(), SeatError> {
        if self.state != GameState::Initial {
            return Err(SeatError::HandInProgress);
        }
        let mut rotated: Vec<UserId> = previous.to_vec();
        if !rotated.is_empty() {
            rotated.rotate_right(1);
        }
        self.players.sort_by_key(|p| rotated.iter().position(|&u| u == p.user_id).map_or(0, |i| i + 1));
        Ok(())
    }

    /// Back to `Initial` with a new id and deck. Seats are kept; every
    /// hand-scoped field is cleared. A seeded table advances its seed, an
    /// unseeded one draws a fresh random shuffle.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.state = GameState::Initial;
        self.pot = 0;
        self.max_round_rate = 0;
        self.trading_end_user_id = None;
        self.board = Board::new();
        self.deck = match self.seed {
            Some(seed) => {
                let next = seed.wrapping_add(1);
                self.seed = Some(next);
                Deck::shuffled_with_seed(next)
            }
            None => Deck::shuffled(),
        };
        self.current_player_index = None;
        self.players_bets.clear();
        for p in &mut self.players {
            p.clear_hand();
        }
    }

    pub(crate) fn index_of(&self, user_id: UserId) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user_id)
    }

    pub(crate) fn record_bet(&mut self, user_id: UserId, amount: Money, action: BetAction) {
        self.players_bets.push(PlayerBet { user_id, amount, state: self.state, action });
    }
}
