//! Private and shared cards of one hand, and dealing them off a [`Deck`].

use crate::cards::{format_cards, parse_cards, Card};
use crate::deck::Deck;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandError {
    #[error("a player holds two cards, {0} given")]
    WrongHoleSize(usize),
    #[error("{0} appears twice")]
    Repeated(Card),
    #[error("the board holds at most five cards, {0} given")]
    BoardOverflow(usize),
    #[error("unreadable cards: {0}")]
    Unreadable(String),
}

/// The two cards dealt face down to a player.
///
/// ```
/// use chat_holdem::hand::HoleCards;
///
/// let hole: HoleCards = "A♥ K♥".parse().unwrap();
/// assert_eq!(hole.to_string(), "A♥ K♥");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleCards([Card; 2]);

impl HoleCards {
    pub fn new(cards: [Card; 2]) -> Result<Self, HandError> {
        if cards[0] == cards[1] {
            return Err(HandError::Repeated(cards[0]));
        }
        Ok(Self(cards))
    }

    /// Takes two cards off the deck, `None` once it runs dry.
    pub fn deal(deck: &mut Deck) -> Option<Self> {
        let a = deck.draw()?;
        let b = deck.draw()?;
        Some(Self([a, b]))
    }

    pub fn cards(&self) -> [Card; 2] {
        self.0
    }

    pub fn holds(&self, card: Card) -> bool {
        self.0.contains(&card)
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cards(&self.0))
    }
}

impl FromStr for HoleCards {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s).map_err(|e| HandError::Unreadable(e.to_string()))?;
        match cards[..] {
            [a, b] => Self::new([a, b]),
            _ => Err(HandError::WrongHoleSize(cards.len())),
        }
    }
}

/// Community cards: empty pre-flop, then 3, 4 and 5.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    pub const FULL: usize = 5;

    pub fn new() -> Self {
        Self { cards: Vec::with_capacity(Self::FULL) }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() >= Self::FULL
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Turns `count` cards face up. `None` if the deck cannot supply them,
    /// in which case the board is left as it was.
    pub(crate) fn reveal(&mut self, deck: &mut Deck, count: usize) -> Option<()> {
        if deck.len() < count {
            return None;
        }
        self.cards.extend(deck.draw_n(count));
        Some(())
    }

    /// Deals whatever is missing up to five cards.
    pub(crate) fn run_out(&mut self, deck: &mut Deck) -> Option<()> {
        self.reveal(deck, Self::FULL.saturating_sub(self.cards.len()))
    }

    /// Fails on the first card the board and `hole` have in common, or on
    /// a card the board shows twice.
    pub fn check_against(&self, hole: &HoleCards) -> Result<(), HandError> {
        for (i, &card) in self.cards.iter().enumerate() {
            if hole.holds(card) || self.cards[..i].contains(&card) {
                return Err(HandError::Repeated(card));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cards(&self.cards))
    }
}

impl FromStr for Board {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s).map_err(|e| HandError::Unreadable(e.to_string()))?;
        if cards.len() > Self::FULL {
            return Err(HandError::BoardOverflow(cards.len()));
        }
        if let Some(card) = (1..cards.len()).find_map(|i| cards[..i].contains(&cards[i]).then_some(cards[i])) {
            return Err(HandError::Repeated(card));
        }
        Ok(Self { cards })
    }
}
