use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The remaining cards of a hand. Cards are consumed from the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// An unshuffled 52-card deck.
    ///
    /// ```
    /// use chat_holdem::deck::Deck;
    ///
    /// let deck = Deck::standard();
    /// assert_eq!(deck.len(), 52);
    /// ```
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// A standard deck shuffled from a fresh random seed.
    pub fn shuffled() -> Self {
        let seed: u64 = rand::rng().random();
        Self::shuffled_with_seed(seed)
    }

    /// A standard deck shuffled reproducibly.
    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut deck = Self::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        deck.cards.shuffle(&mut rng);
        deck
    }

    /// A stacked deck; the last card of `cards` is drawn first.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).filter_map(|_| self.draw()).collect()
    }
}
