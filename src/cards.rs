use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card ranks from Two (low) to Ace (high). The ace only ever plays high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value used for scoring: 2..=10, J=11, Q=12, K=13, A=14.
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(v: u8) -> Option<Rank> {
        Rank::ALL.into_iter().find(|r| r.value() == v)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RankParseError {
    #[error("invalid rank: '{0}'")]
    Invalid(String),
}

impl FromStr for Rank {
    type Err = RankParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        let wanted = if wanted == "T" { "10" } else { wanted.as_str() };
        Rank::ALL
            .into_iter()
            .find(|r| r.label() == wanted)
            .ok_or_else(|| RankParseError::Invalid(s.to_string()))
    }
}

/// Four suits. Suits never break ties between hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub const fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuitParseError {
    #[error("invalid suit: '{0}'")]
    Invalid(String),
}

impl Suit {
    const NAMES: [(Suit, char, &'static str); 4] = [
        (Suit::Hearts, 'h', "hearts"),
        (Suit::Diamonds, 'd', "diamonds"),
        (Suit::Clubs, 'c', "clubs"),
        (Suit::Spades, 's', "spades"),
    ];
}

impl TryFrom<char> for Suit {
    type Error = SuitParseError;

    /// Accepts the symbol or the initial letter in either case.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        let lower = c.to_ascii_lowercase();
        Suit::NAMES
            .into_iter()
            .find(|&(suit, letter, _)| suit.symbol() == c || letter == lower)
            .map(|(suit, _, _)| suit)
            .ok_or_else(|| SuitParseError::Invalid(c.to_string()))
    }
}

impl FromStr for Suit {
    type Err = SuitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Suit::try_from(c);
        }
        Suit::NAMES
            .into_iter()
            .find(|(_, _, full)| full.eq_ignore_ascii_case(name))
            .map(|(suit, _, _)| suit)
            .ok_or_else(|| SuitParseError::Invalid(s.to_string()))
    }
}

/// An immutable playing card.
///
/// ```
/// use chat_holdem::cards::{Card, Rank, Suit};
///
/// let card = Card::new(Rank::Ten, Suit::Diamonds);
/// assert_eq!(card.to_string(), "10♦");
/// assert_eq!("10♦".parse::<Card>().unwrap(), card);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn rank(self) -> Rank {
        self.rank
    }

    pub const fn suit(self) -> Suit {
        self.suit
    }

    pub const fn value(self) -> u8 {
        self.rank.value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid card: '{0}'")]
    Invalid(String),
    #[error(transparent)]
    Rank(#[from] RankParseError),
    #[error(transparent)]
    Suit(#[from] SuitParseError),
}

impl FromStr for Card {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        // suit is always the last char; it may be a multi-byte symbol
        let Some((idx, suit_ch)) = t.char_indices().last() else {
            return Err(CardParseError::Invalid(s.to_string()));
        };
        if idx == 0 {
            return Err(CardParseError::Invalid(s.to_string()));
        }
        let rank = Rank::from_str(&t[..idx])?;
        let suit = Suit::try_from(suit_ch)?;
        Ok(Card::new(rank, suit))
    }
}

/// Parse multiple cards separated by whitespace or commas.
///
/// ```
/// use chat_holdem::cards::{parse_cards, Card, Rank, Suit};
///
/// let cards = parse_cards("K♣ A♣, 10♦ Qs").unwrap();
/// assert_eq!(cards[0], Card::new(Rank::King, Suit::Clubs));
/// assert_eq!(cards[2], Card::new(Rank::Ten, Suit::Diamonds));
/// assert_eq!(cards[3], Card::new(Rank::Queen, Suit::Spades));
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Card::from_str)
        .collect()
}

/// Render cards space-separated, e.g. `K♣ A♣ 10♦`.
pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
}
