use crate::cards::Card;
use crate::hand::{Board, HandError, HoleCards};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// Weight of one category step. Kickers are base-15 digits, so five of them
/// always sum to less than this.
pub const CATEGORY_WEIGHT: u64 = 15 * 15 * 15 * 15 * 15;

const KICKER_BASE: u64 = 15;

/// Poker hand category from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[repr(u8)]
pub enum Category {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl Category {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Category::HighCard => "high card",
            Category::Pair => "pair",
            Category::TwoPair => "two pair",
            Category::ThreeOfAKind => "three of a kind",
            Category::Straight => "straight",
            Category::Flush => "flush",
            Category::FullHouse => "full house",
            Category::FourOfAKind => "four of a kind",
            Category::StraightFlush => "straight flush",
            Category::RoyalFlush => "royal flush",
        }
    }
}

/// Totally ordered hand score. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandValue(u64);

impl HandValue {
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `category * 15^5 + Σ kicker_i * 15^i`, with `kickers_asc` listed from the
    /// least significant tiebreaker to the most significant one.
    pub fn from_parts(category: Category, kickers_asc: &[u8]) -> Self {
        let mut score = CATEGORY_WEIGHT * category.ordinal() as u64;
        let mut place = 1u64;
        for &k in kickers_asc.iter().take(5) {
            score += k as u64 * place;
            place *= KICKER_BASE;
        }
        HandValue(score)
    }
}

/// The best five cards found for a player and their score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Evaluation {
    pub category: Category,
    pub best_five: [Card; 5],
    value: HandValue,
}

impl Evaluation {
    pub const fn value(&self) -> HandValue {
        self.value
    }
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Evaluation {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Evaluation {}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("invalid hand: {0}")]
    InvalidHand(#[from] HandError),
    #[error("at least five cards are needed to evaluate a hand, got {0}")]
    DegenerateHandInput(usize),
    #[error("at most seven cards can be evaluated, got {0}")]
    TooManyCards(usize),
}

/// Score exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> Evaluation {
    let mut values = cards.map(|c| c.value());
    values.sort_unstable();

    let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());

    // (rank value, multiplicity), least significant group first
    let mut groups: Vec<(u8, u8)> = Vec::with_capacity(5);
    for &v in &values {
        match groups.iter_mut().find(|(r, _)| *r == v) {
            Some((_, n)) => *n += 1,
            None => groups.push((v, 1)),
        }
    }
    groups.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    let shape: Vec<u8> = groups.iter().map(|&(_, n)| n).collect();
    let keys: Vec<u8> = groups.iter().map(|&(r, _)| r).collect();

    let top = values[4];
    let is_straight = groups.len() == 5 && top - values[0] == 4;

    let (category, kickers): (Category, Vec<u8>) = if is_flush && is_straight && values[0] == 10 {
        (Category::RoyalFlush, Vec::new())
    } else if is_flush && is_straight {
        (Category::StraightFlush, vec![top])
    } else {
        match shape.as_slice() {
            [1, 4] => (Category::FourOfAKind, keys),
            [2, 3] => (Category::FullHouse, keys),
            _ if is_flush => (Category::Flush, values.to_vec()),
            _ if is_straight => (Category::Straight, vec![top]),
            [1, 1, 3] => (Category::ThreeOfAKind, keys),
            [1, 2, 2] => (Category::TwoPair, keys),
            [1, 1, 1, 2] => (Category::Pair, keys),
            _ => (Category::HighCard, values.to_vec()),
        }
    };

    Evaluation { category, best_five: *cards, value: HandValue::from_parts(category, &kickers) }
}

/// Best five-card hand out of 5 to 7 cards.
///
/// Every 5-card subset is scored; on equal scores the first subset in input
/// order wins, so `best_five` keeps the caller's card order.
///
/// ```
/// use chat_holdem::cards::parse_cards;
/// use chat_holdem::evaluator::{evaluate, Category};
///
/// let cards = parse_cards("K♣ A♣ 10♦ 10♥ 8♣ 5♠ Q♣").unwrap();
/// let best = evaluate(&cards).unwrap();
/// assert_eq!(best.category, Category::Pair);
/// assert_eq!(best.best_five.to_vec(), parse_cards("K♣ A♣ 10♦ 10♥ Q♣").unwrap());
/// ```
pub fn evaluate(cards: &[Card]) -> Result<Evaluation, EvalError> {
    let n = cards.len();
    if n < 5 {
        return Err(EvalError::DegenerateHandInput(n));
    }
    if n > 7 {
        return Err(EvalError::TooManyCards(n));
    }
    let mut best: Option<Evaluation> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                for l in (k + 1)..n {
                    for m in (l + 1)..n {
                        let hand = [cards[i], cards[j], cards[k], cards[l], cards[m]];
                        let eval = evaluate_five(&hand);
                        match best {
                            Some(b) if eval <= b => {}
                            _ => best = Some(eval),
                        }
                    }
                }
            }
        }
    }
    best.ok_or(EvalError::DegenerateHandInput(n))
}

/// Best hand from a player's hole cards and the community cards.
pub fn evaluate_holdem(hole: &HoleCards, board: &Board) -> Result<Evaluation, EvalError> {
    board.check_against(hole)?;
    let mut cards = Vec::with_capacity(2 + board.len());
    cards.extend(hole.cards());
    cards.extend_from_slice(board.as_slice());
    evaluate(&cards)
}
