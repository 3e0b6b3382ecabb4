/*
Game: Judgement (assumed-hands scorekeeper)
Players declare how many hands they expect to win each round; the last
bidder may not bring the table total to exactly the round's card count.
*/

use std::collections::{HashMap, HashSet};

use enum_iterator::Sequence;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::utils::rotated_from;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 52;
pub const DECK_SIZE: i32 = 52;
/// A successful zero bid always pays this flat bonus, multiplier or not.
pub const ZERO_BID_BONUS: i32 = 10;

/// Suit wheel for generated rounds, in fixed cyclic order.
pub const SUITS: [Suit; 4] = [Suit::Spades, Suit::Diamonds, Suit::Clubs, Suit::Hearts];

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Sequence,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "camelCase")]
pub enum Suit {
    #[default]
    Spades = 0,
    Diamonds = 1,
    Clubs = 2,
    Hearts = 3,
}

impl Suit {
    /// Suit for a round at the given position in the sequence.
    pub fn for_position(index: usize) -> Suit {
        SUITS[index % SUITS.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GameType {
    /// One ascending run of card counts: 1..=num_rounds.
    Ascending,
    /// Ascending run followed by the full descending run back to 1.
    #[default]
    Complete,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    Setup,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("bid must be between 0 and {max}, got {bid}")]
    InvalidBid { bid: i32, max: i32 },
    #[error("the last bid may not be {0}: the table total would match the card count")]
    RestrictedBid(i32),
    #[error("no success/failure decision recorded for {0}")]
    IncompleteOutcome(String),
    #[error("card count must be between 1 and {max}, got {cards}")]
    InvalidCardCount { cards: i32, max: i32 },
    #[error("a game needs at least 3 distinct players, got {0}")]
    TooFewPlayers(usize),
    #[error("a 52-card deck supports at most 52 players, got {0}")]
    TooManyPlayers(usize),
    #[error("no player named {0}")]
    UnknownPlayer(String),
    #[error("round {0} does not exist")]
    UnknownRound(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub num_rounds: i32,
    pub game_type: GameType,
    pub multiplier: i32,
    /// Derived from the player count at setup: 52 / players.
    pub max_cards_per_player: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub suit: Suit,
    pub first_to_act: String,
    pub card_count: i32,
    /// Committed atomically once every player has bid; never partial.
    pub bids: HashMap<String, i32>,
    /// Points per player, written when the round is scored.
    pub outcomes: HashMap<String, i32>,
    pub is_complete: bool,
}

impl Round {
    fn fresh(suit: Suit, first_to_act: String, card_count: i32) -> Self {
        Round {
            suit,
            first_to_act,
            card_count,
            ..Default::default()
        }
    }

    pub fn bids_complete(&self, player_count: usize) -> bool {
        self.bids.len() == player_count
    }

    /// Sum of all bids, once the full set is in.
    pub fn bid_total(&self, player_count: usize) -> Option<i32> {
        self.bids_complete(player_count)
            .then(|| self.bids.values().sum())
    }
}

/// Derive a round's fixed attributes purely from its position.
///
/// Must be re-invoked whenever a round's index in the sequence changes.
pub fn derive_round(index: usize, players: &[Player], card_count: i32) -> Round {
    Round::fresh(
        Suit::for_position(index),
        players[index % players.len()].name.clone(),
        card_count,
    )
}

/// Points for one player's round: a successful zero bid pays the flat
/// bonus, any other success pays bid times the multiplier, failure pays 0.
pub fn round_points(bid: i32, succeeded: bool, multiplier: i32) -> i32 {
    if !succeeded {
        return 0;
    }
    if bid == 0 {
        ZERO_BID_BONUS
    } else {
        bid * multiplier
    }
}

/// One in-progress bid collection for a single round.
///
/// The session is a detached value: nothing is visible on the round until
/// the complete session is committed back with `commit_bids`. Dropping an
/// unfinished session abandons it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BidSession {
    round_index: usize,
    card_count: i32,
    /// Players in turn order: the round's first bidder sits at position 0.
    sequence: Vec<String>,
    /// Bids entered so far, parallel to the front of `sequence`.
    bids: Vec<i32>,
}

impl BidSession {
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    pub fn card_count(&self) -> i32 {
        self.card_count
    }

    /// Index of the player currently expected to bid.
    pub fn position(&self) -> usize {
        self.bids.len()
    }

    pub fn is_complete(&self) -> bool {
        self.bids.len() == self.sequence.len()
    }

    pub fn current_player(&self) -> Option<&str> {
        self.sequence.get(self.bids.len()).map(String::as_str)
    }

    /// Bids entered so far, in turn order.
    pub fn entered(&self) -> impl Iterator<Item = (&str, i32)> {
        self.sequence
            .iter()
            .map(String::as_str)
            .zip(self.bids.iter().copied())
    }

    /// The value the last bidder may not declare, if it is their turn and
    /// the forbidden value is still reachable.
    pub fn restricted_value(&self) -> Option<i32> {
        if self.bids.len() + 1 != self.sequence.len() {
            return None;
        }
        let restricted = self.card_count - self.bids.iter().sum::<i32>();
        (restricted >= 0).then_some(restricted)
    }

    /// Record the current player's bid and advance to the next seat.
    pub fn submit(&mut self, bid: i32) -> Result<(), GameError> {
        if self.is_complete() {
            return Err(GameError::InvalidState(
                "every player has already bid".into(),
            ));
        }
        if bid < 0 || bid > self.card_count {
            return Err(GameError::InvalidBid {
                bid,
                max: self.card_count,
            });
        }
        if let Some(restricted) = self.restricted_value() {
            if bid == restricted {
                return Err(GameError::RestrictedBid(restricted));
            }
        }
        self.bids.push(bid);
        Ok(())
    }

    /// Step back one seat, discarding the previous player's bid.
    pub fn undo(&mut self) -> Result<(), GameError> {
        if self.bids.is_empty() {
            return Err(GameError::InvalidState("no bid to undo".into()));
        }
        self.bids.pop();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JudgementGame {
    /// Seating order, fixed by the setup shuffle. Never reordered; the
    /// final ranking is a sorted copy.
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    pub config: GameConfig,
    /// Cursor to the next round awaiting play; only ever moves forward.
    pub current_round_index: usize,
    pub phase: GamePhase,
}

impl JudgementGame {
    pub fn new(names: &[&str]) -> Result<Self, GameError> {
        Self::new_with_rng(names, &mut thread_rng())
    }

    /// Set up a game from raw name entries: blanks are dropped, duplicates
    /// keep their first occurrence, and seating order is shuffled with the
    /// supplied generator.
    pub fn new_with_rng(names: &[&str], rng: &mut impl Rng) -> Result<Self, GameError> {
        let mut seen = HashSet::new();
        let mut players: Vec<Player> = Vec::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.to_string()) {
                players.push(Player {
                    name: name.to_string(),
                    score: 0,
                });
            }
        }
        if players.len() < MIN_PLAYERS {
            return Err(GameError::TooFewPlayers(players.len()));
        }
        if players.len() > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers(players.len()));
        }
        players.shuffle(rng);

        let max_cards = DECK_SIZE / players.len() as i32;
        let config = GameConfig {
            num_rounds: max_cards,
            game_type: GameType::Complete,
            multiplier: 10,
            max_cards_per_player: max_cards,
        };
        info!(players = players.len(), max_cards, "new game set up");

        Ok(JudgementGame {
            players,
            rounds: Vec::new(),
            config,
            current_round_index: 0,
            phase: GamePhase::Setup,
        })
    }

    /// Replace the user-settable configuration. Only allowed before start.
    pub fn reconfigure(
        &mut self,
        num_rounds: i32,
        game_type: GameType,
        multiplier: i32,
    ) -> Result<(), GameError> {
        self.require_phase(
            GamePhase::Setup,
            "configuration is only allowed before the game starts",
        )?;
        let max = self.config.max_cards_per_player;
        if num_rounds < 1 || num_rounds > max {
            return Err(GameError::InvalidConfig(format!(
                "number of rounds must be between 1 and {max}, got {num_rounds}"
            )));
        }
        if multiplier < 1 {
            return Err(GameError::InvalidConfig(format!(
                "multiplier must be positive, got {multiplier}"
            )));
        }
        self.config.num_rounds = num_rounds;
        self.config.game_type = game_type;
        self.config.multiplier = multiplier;
        Ok(())
    }

    /// Generate the round list from the current configuration and begin play.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.require_phase(GamePhase::Setup, "the game has already started")?;
        self.rounds = Self::generate_rounds(&self.config, &self.players);
        self.current_round_index = 0;
        self.phase = GamePhase::Playing;
        info!(rounds = self.rounds.len(), "game started");
        Ok(())
    }

    /// Card counts run 1..=num_rounds; a complete game appends the full
    /// descending run. Deterministic for a given config and seating order.
    pub fn generate_rounds(config: &GameConfig, players: &[Player]) -> Vec<Round> {
        let mut counts: Vec<i32> = (1..=config.num_rounds).collect();
        if config.game_type == GameType::Complete {
            counts.extend((1..=config.num_rounds).rev());
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(index, cards)| derive_round(index, players, cards))
            .collect()
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.get(self.current_round_index)
    }

    /// Open a bid session for a round that has no bids yet.
    pub fn start_bid(&self, round_index: usize) -> Result<BidSession, GameError> {
        self.require_phase(
            GamePhase::Playing,
            "bids can only be entered while the game is in play",
        )?;
        let round = self
            .rounds
            .get(round_index)
            .ok_or(GameError::UnknownRound(round_index))?;
        if round.is_complete {
            return Err(GameError::InvalidState(format!(
                "round {round_index} is already complete"
            )));
        }
        if round.bids_complete(self.players.len()) {
            return Err(GameError::InvalidState(format!(
                "round {round_index} already has a full set of bids"
            )));
        }
        let start = self
            .players
            .iter()
            .position(|p| p.name == round.first_to_act)
            .ok_or_else(|| GameError::UnknownPlayer(round.first_to_act.clone()))?;
        let names: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        debug!(round = round_index, first = %round.first_to_act, "bid session opened");
        Ok(BidSession {
            round_index,
            card_count: round.card_count,
            sequence: rotated_from(&names, start),
            bids: Vec::new(),
        })
    }

    /// Write a completed session's bids onto its round in one step.
    pub fn commit_bids(&mut self, session: &BidSession) -> Result<(), GameError> {
        self.require_phase(
            GamePhase::Playing,
            "bids can only be committed while the game is in play",
        )?;
        if !session.is_complete() {
            return Err(GameError::InvalidState(
                "the bid session is not complete".into(),
            ));
        }
        if session.sequence.len() != self.players.len()
            || !session
                .sequence
                .iter()
                .all(|name| self.players.iter().any(|p| &p.name == name))
        {
            return Err(GameError::InvalidState(
                "the bid session does not match the current players".into(),
            ));
        }
        let round = self
            .rounds
            .get_mut(session.round_index)
            .ok_or(GameError::UnknownRound(session.round_index))?;
        if round.is_complete {
            return Err(GameError::InvalidState(format!(
                "round {} is already complete",
                session.round_index
            )));
        }
        if !round.bids.is_empty() {
            return Err(GameError::InvalidState(format!(
                "round {} already has bids",
                session.round_index
            )));
        }
        if session.card_count != round.card_count {
            return Err(GameError::InvalidState(
                "the bid session no longer matches the round".into(),
            ));
        }
        round.bids = session
            .entered()
            .map(|(name, bid)| (name.to_string(), bid))
            .collect();
        debug!(
            round = session.round_index,
            total = round.bids.values().sum::<i32>(),
            "bids committed"
        );
        Ok(())
    }

    /// Score the round at the cursor from per-player success flags, then
    /// advance. Validation finishes before any state is touched.
    pub fn commit_scores(&mut self, outcomes: &HashMap<String, bool>) -> Result<(), GameError> {
        self.require_phase(
            GamePhase::Playing,
            "scores can only be committed while the game is in play",
        )?;
        let index = self.current_round_index;
        let player_count = self.players.len();
        let round = self
            .rounds
            .get(index)
            .ok_or_else(|| GameError::InvalidState("no round is awaiting play".into()))?;
        if round.is_complete {
            return Err(GameError::InvalidState(format!(
                "round {index} is already complete"
            )));
        }
        if !round.bids_complete(player_count) {
            return Err(GameError::InvalidState(format!(
                "round {index} is still missing bids"
            )));
        }
        for name in outcomes.keys() {
            if !round.bids.contains_key(name) {
                return Err(GameError::IncompleteOutcome(name.clone()));
            }
        }
        let mut points: Vec<(String, i32)> = Vec::with_capacity(player_count);
        for player in &self.players {
            let succeeded = *outcomes
                .get(&player.name)
                .ok_or_else(|| GameError::IncompleteOutcome(player.name.clone()))?;
            let bid = round.bids[&player.name];
            points.push((
                player.name.clone(),
                round_points(bid, succeeded, self.config.multiplier),
            ));
        }

        let round = &mut self.rounds[index];
        for (name, earned) in &points {
            round.outcomes.insert(name.clone(), *earned);
        }
        round.is_complete = true;
        for player in &mut self.players {
            if let Some((_, earned)) = points.iter().find(|(name, _)| name == &player.name) {
                player.score += *earned;
            }
        }
        self.current_round_index += 1;
        debug!(
            round = index,
            cursor = self.current_round_index,
            "scores committed"
        );
        if self.current_round_index >= self.rounds.len() {
            self.phase = GamePhase::Finished;
            info!("all rounds complete, game finished");
        }
        Ok(())
    }

    /// Append a round with caller-supplied attributes. Manual suit and
    /// first bidder stick until the next structural edit re-derives them.
    pub fn add_round(
        &mut self,
        suit: Suit,
        first_to_act: &str,
        card_count: i32,
    ) -> Result<(), GameError> {
        self.require_phase(
            GamePhase::Playing,
            "rounds can only be added while the game is in play",
        )?;
        let max = self.config.max_cards_per_player;
        if card_count < 1 || card_count > max {
            return Err(GameError::InvalidCardCount {
                cards: card_count,
                max,
            });
        }
        if !self.players.iter().any(|p| p.name == first_to_act) {
            return Err(GameError::UnknownPlayer(first_to_act.to_string()));
        }
        self.rounds
            .push(Round::fresh(suit, first_to_act.to_string(), card_count));
        debug!(rounds = self.rounds.len(), "round added");
        Ok(())
    }

    /// Remove the given rounds (highest index first), then re-derive suit
    /// and first bidder for every survivor from its new position.
    pub fn remove_rounds(&mut self, indices: &[usize]) -> Result<(), GameError> {
        self.require_phase(
            GamePhase::Playing,
            "rounds can only be removed while the game is in play",
        )?;
        if indices.is_empty() {
            return Ok(());
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.rounds.len()) {
            return Err(GameError::UnknownRound(bad));
        }
        let mut ordered: Vec<usize> = indices.to_vec();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        ordered.dedup();
        for index in ordered {
            self.rounds.remove(index);
        }
        // Position always wins after a structural edit, manual values included.
        for index in 0..self.rounds.len() {
            let derived = derive_round(index, &self.players, self.rounds[index].card_count);
            self.rounds[index].suit = derived.suit;
            self.rounds[index].first_to_act = derived.first_to_act;
        }
        debug!(rounds = self.rounds.len(), "rounds removed");
        Ok(())
    }

    /// End the game now and return the final ranking.
    pub fn finish(&mut self) -> Result<Vec<Player>, GameError> {
        self.require_phase(GamePhase::Playing, "only a game in play can be finished")?;
        self.phase = GamePhase::Finished;
        let ranking = self.ranking();
        info!(winner = %ranking[0].name, "game finished");
        Ok(ranking)
    }

    /// Players sorted by score, highest first; ties keep seating order.
    pub fn ranking(&self) -> Vec<Player> {
        let mut ranked = self.players.clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn winner(&self) -> Option<Player> {
        (self.phase == GamePhase::Finished).then(|| self.ranking().remove(0))
    }

    fn require_phase(&self, phase: GamePhase, why: &str) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidState(why.to_string()))
        }
    }
}
