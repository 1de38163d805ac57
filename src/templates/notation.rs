//! Player-slot notation: `P<n>`, `S<stage>P<rank>`, `Winner of <ref>`,
//! `Loser of <ref>`. Parsed once into a closed sum type; resolution against
//! a session happens in `logic::generator`.

use std::str::FromStr;

/// A parsed player slot from a schedule template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerSlot {
    /// `P<n>`: the n-th player, by creation order in stage 1 and by current
    /// rank from stage 2 on.
    Position(u32),
    /// `S<stage>P<rank>`: the player holding `rank` after the given stage.
    StageRank { stage: u8, rank: u32 },
    /// `Winner of <ref>` / `Loser of <ref>`: a player from the winning or
    /// losing team of a referenced completed game.
    FromGame { outcome: GameOutcome, game: GameRef },
}

/// Which side of a referenced game a slot selects from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameOutcome {
    Winner,
    Loser,
}

/// Reference to another game: by game number (`G12`) or by semifinal
/// position (`SF1`, `SF2`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameRef {
    Number(u32),
    Semifinal(u32),
}

/// A slot string that does not match any known notation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotParseError(pub String);

impl std::fmt::Display for SlotParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown player notation: {:?}", self.0)
    }
}

impl FromStr for PlayerSlot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((prefix, reference)) = s.split_once(" of ") {
            let outcome = match prefix.trim() {
                "Winner" => GameOutcome::Winner,
                "Loser" => GameOutcome::Loser,
                _ => return Err(SlotParseError(s.to_string())),
            };
            let game = reference.trim().parse()?;
            return Ok(PlayerSlot::FromGame { outcome, game });
        }
        if let Some(rest) = s.strip_prefix('S') {
            if let Some((stage, rank)) = rest.split_once('P') {
                let stage = stage.parse().map_err(|_| SlotParseError(s.to_string()))?;
                let rank = parse_number(rank).ok_or_else(|| SlotParseError(s.to_string()))?;
                return Ok(PlayerSlot::StageRank { stage, rank });
            }
        }
        if let Some(rest) = s.strip_prefix('P') {
            let position = parse_number(rest).ok_or_else(|| SlotParseError(s.to_string()))?;
            return Ok(PlayerSlot::Position(position));
        }
        Err(SlotParseError(s.to_string()))
    }
}

impl FromStr for GameRef {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("SF") {
            let n = parse_number(rest).ok_or_else(|| SlotParseError(s.to_string()))?;
            return Ok(GameRef::Semifinal(n));
        }
        if let Some(rest) = s.strip_prefix('G') {
            let n = parse_number(rest).ok_or_else(|| SlotParseError(s.to_string()))?;
            return Ok(GameRef::Number(n));
        }
        Err(SlotParseError(s.to_string()))
    }
}

/// Positive integer with no trailing garbage.
fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|&n| n > 0)
}
