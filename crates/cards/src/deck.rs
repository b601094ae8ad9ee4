// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Poker cards definitions.
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::{error, fmt, str::FromStr};

/// A Poker card.
///
/// A card is stored as a single byte with the rank in the upper bits and the
/// suit in the two lower bits, so that cards of the same rank are adjacent:
///
/// ```text
///   +--------+
///   |rrrrrrss|
///   +--------+
///   r = rank of card (deuce=0,trey=1,four=2,five=3,...,ace=12)
///   s = suit of card (clubs=0,diamonds=1,hearts=2,spades=3)
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "CardFace", into = "CardFace")]
pub struct Card(u8);

impl Card {
    /// Create a card given a suit and rank.
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Self(((rank as u8) << 2) | suit as u8)
    }

    /// This card unique id in the range 0..52.
    pub fn id(&self) -> u8 {
        self.0
    }

    /// Returns the card suit.
    pub fn suit(&self) -> Suit {
        Suit::ALL[(self.0 & 0x3) as usize]
    }

    /// Returns the card rank.
    pub fn rank(&self) -> Rank {
        Rank::ALL[(self.0 >> 2) as usize]
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({}{})", self.rank(), self.suit())
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses a card from its two letters form, i.e. `"TH"` or `"2c"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(s), None) => {
                let rank = Rank::try_from(r)?;
                let suit = Suit::try_from(s)?;
                Ok(Card::new(rank, suit))
            }
            _ => Err(ParseCardError(s.to_string())),
        }
    }
}

/// Serialized form of a card.
#[derive(Serialize, Deserialize)]
struct CardFace {
    rank: Rank,
    suit: Suit,
}

impl From<CardFace> for Card {
    fn from(face: CardFace) -> Self {
        Card::new(face.rank, face.suit)
    }
}

impl From<Card> for CardFace {
    fn from(card: Card) -> Self {
        CardFace {
            rank: card.rank(),
            suit: card.suit(),
        }
    }
}

/// Error returned when a card, rank, or suit cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card {:?}", self.0)
    }
}

impl error::Error for ParseCardError {}

/// Card rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Rank {
    /// Deuce
    Deuce = 0,
    /// Trey
    Trey,
    /// Four
    Four,
    /// Five
    Five,
    /// Six
    Six,
    /// Seven
    Seven,
    /// Eight
    Eight,
    /// Nine
    Nine,
    /// Ten
    Ten,
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace
    Ace,
}

impl Rank {
    const ALL: [Rank; 13] = {
        use Rank::*;
        [
            Deuce, Trey, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace,
        ]
    };

    /// Returns all ranks.
    pub fn ranks() -> impl DoubleEndedIterator<Item = Rank> {
        Self::ALL.into_iter()
    }
}

impl From<Rank> for char {
    fn from(rank: Rank) -> char {
        match rank {
            Rank::Deuce => '2',
            Rank::Trey => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = ParseCardError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Rank::ranks()
            .find(|r| char::from(*r) == c.to_ascii_uppercase())
            .ok_or_else(|| ParseCardError(c.to_string()))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Card suit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Clubs suit.
    Clubs = 0,
    /// Diamonds suit.
    Diamonds,
    /// Hearts suit.
    Hearts,
    /// Spades suit.
    Spades,
}

impl Suit {
    const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    /// Returns all suits.
    pub fn suits() -> impl DoubleEndedIterator<Item = Suit> {
        Self::ALL.into_iter()
    }
}

impl TryFrom<char> for Suit {
    type Error = ParseCardError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'C' => Ok(Suit::Clubs),
            'D' => Ok(Suit::Diamonds),
            'H' => Ok(Suit::Hearts),
            'S' => Ok(Suit::Spades),
            _ => Err(ParseCardError(c.to_string())),
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suit = match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        };

        write!(f, "{suit}")
    }
}

/// A cards Deck
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The number of cards in the deck.
    pub const SIZE: usize = 52;

    /// Creates a new shuffled deck.
    pub fn new_and_shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut deck = Self::default();
        deck.cards.shuffle(rng);
        deck
    }

    /// Creates a deck that deals the given cards first, in order, followed by
    /// the remaining cards in suit and rank order.
    pub fn stacked(top: &[Card]) -> Self {
        let mut deck = Self::default();
        for card in top {
            deck.remove(*card);
        }

        // Cards are dealt from the back.
        deck.cards.extend(top.iter().rev());
        deck
    }

    /// Deals a card from the deck.
    ///
    /// # Panics
    ///
    /// Panics if the deck is empty, a single table never deals more than 23
    /// cards out of a full deck.
    pub fn deal(&mut self) -> Card {
        self.cards.pop().expect("Deal from an empty deck")
    }

    /// Checks if the deck is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of cards in the deck.
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    /// Removes a card from the deck.
    pub fn remove(&mut self, card: Card) {
        self.cards.retain(|c| c != &card);
    }

    /// Calls the `f` closure for each k-cards hand.
    ///
    /// Panics if k is not 2 <= k <= 7.
    pub fn for_each<F>(&self, k: usize, mut f: F)
    where
        F: FnMut(&[Card]),
    {
        assert!((2..=7).contains(&k), "2 <= k <= 7");

        if k > self.cards.len() {
            return;
        }

        let mut indices = (0..k).collect::<Vec<_>>();
        let mut hand = indices.iter().map(|&i| self.cards[i]).collect::<Vec<_>>();
        let n = self.cards.len();

        loop {
            f(&hand);

            // Find the rightmost index that can still move forward.
            let Some(pos) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
                break;
            };

            indices[pos] += 1;
            for i in pos + 1..k {
                indices[i] = indices[i - 1] + 1;
            }

            for i in pos..k {
                hand[i] = self.cards[indices[i]];
            }
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        let cards = Suit::suits()
            .flat_map(|s| Rank::ranks().map(move |r| Card::new(r, s)))
            .collect::<Vec<_>>();
        Self { cards }
    }
}

impl IntoIterator for Deck {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}
