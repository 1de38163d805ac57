//! Declarative schedule templates: labeled blocks of rounds, each round a
//! set of courts with two team slots in player notation.

mod notation;
mod store;

pub use notation::{GameOutcome, GameRef, PlayerSlot, SlotParseError};
pub use store::{DirTemplateStore, InMemoryTemplateStore, TemplateStore};

use crate::models::PlayoffRound;
use serde::{Deserialize, Serialize};

/// A full schedule template for one session configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub blocks: Vec<TemplateBlock>,
}

/// A labeled schedule phase, e.g. "Stage 1" or "Playoff Finals".
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateBlock {
    pub label: String,
    pub rounds: Vec<TemplateRound>,
}

/// One simultaneous round across the courts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateRound {
    pub courts: Vec<TemplateCourt>,
}

/// One game slot: two teams of two player notations each.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateCourt {
    #[serde(rename = "A")]
    pub team_a: [String; 2],
    #[serde(rename = "B")]
    pub team_b: [String; 2],
}

impl Template {
    /// Total games declared across every block (the tournament progress
    /// denominator).
    pub fn total_games(&self) -> u32 {
        self.blocks.iter().map(TemplateBlock::game_count).sum()
    }

    /// Block whose label names the given tournament stage.
    pub fn stage_block(&self, stage: u8) -> Option<&TemplateBlock> {
        self.blocks.iter().find(|b| b.stage() == Some(stage))
    }
}

impl TemplateBlock {
    pub fn game_count(&self) -> u32 {
        self.rounds.iter().map(|r| r.courts.len() as u32).sum()
    }

    /// Stage number parsed from a "Stage N" label.
    pub fn stage(&self) -> Option<u8> {
        let rest = self.label.split("Stage ").nth(1)?;
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// Bracket position inferred from the block label, if any. "Semi" is
    /// checked before "Final" because "Semifinals" contains both.
    pub fn playoff_round(&self) -> Option<PlayoffRound> {
        let label = self.label.to_lowercase();
        if label.contains("semi") {
            Some(PlayoffRound::Semifinal)
        } else if label.contains("gold") {
            Some(PlayoffRound::Gold)
        } else if label.contains("bronze") {
            Some(PlayoffRound::Bronze)
        } else if label.contains("medal") {
            Some(PlayoffRound::Medal)
        } else if label.contains("qualifier") {
            Some(PlayoffRound::Qualifier)
        } else if label.contains("final") {
            Some(PlayoffRound::Final)
        } else {
            None
        }
    }

    pub fn is_playoff(&self) -> bool {
        self.playoff_round().is_some()
    }
}
