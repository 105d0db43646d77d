//! Brackets: eight player, three game knockouts within a division.
//!
//! A [`Brkt`] defines the format and payouts, every [`OneBrkt`] is a single filled sheet of
//! that definition and its [`BrktSeed`]s place the players on the sheet.

use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{BrktId, DivId, OneBrktId, PlayerId, SquadId};
use crate::money::Money;
use crate::validate::{self, Validate, ValidationError, MAX_GAMES};

/// Number of games of a bracket.
pub const BRKT_GAMES: i32 = 3;
/// Number of players of a bracket.
pub const BRKT_PLAYERS: i32 = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brkt {
    pub id: BrktId,
    pub squad_id: SquadId,
    pub div_id: DivId,
    /// The first game of the bracket.
    pub start: i32,
    pub games: i32,
    pub players: i32,
    /// The fee per player.
    pub fee: Money,
    pub first: Money,
    pub second: Money,
    pub admin: Money,
    pub sort_order: i32,
}

impl Brkt {
    /// The amount collected for one full bracket.
    #[inline]
    pub fn fsa(&self) -> Money {
        self.first + self.second + self.admin
    }

    /// The last game of the bracket.
    #[inline]
    pub fn end(&self) -> i32 {
        self.start + self.games - 1
    }
}

impl Validate for Brkt {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("squad_id", &self.squad_id)?;
        validate::required_id("div_id", &self.div_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("squad_id", &self.squad_id)?;
        validate::valid_fk("div_id", &self.div_id)?;
        validate::in_range("start", self.start, 1, MAX_GAMES - BRKT_GAMES + 1)?;
        validate::check("games", self.games == BRKT_GAMES)?;
        validate::check("players", self.players == BRKT_PLAYERS)?;
        validate::valid_fee("fee", self.fee)?;
        validate::valid_fee("first", self.first)?;
        validate::valid_amount("second", self.second)?;
        validate::valid_amount("admin", self.admin)?;
        validate::valid_sort_order(self.sort_order)?;

        if self.fsa() != self.fee * i64::from(self.players) {
            return Err(ValidationError::invalid("fsa"));
        }

        Ok(())
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

impl Resource for Brkt {
    const PATH: &'static str = "brkts";
    const PARENT: &'static str = "squad";
    const PARENT_FIELD: &'static str = "squad_id";

    type ParentId = SquadId;

    fn parent_id(&self) -> &SquadId {
        &self.squad_id
    }
}

impl Keyed for Brkt {
    type Id = BrktId;

    fn id(&self) -> &BrktId {
        &self.id
    }
}

/// A single bracket sheet of a [`Brkt`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneBrkt {
    pub id: OneBrktId,
    pub brkt_id: BrktId,
    /// Position of the sheet within its bracket, starting at 0.
    pub bindex: i32,
}

impl Validate for OneBrkt {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("brkt_id", &self.brkt_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("brkt_id", &self.brkt_id)?;
        validate::check("bindex", self.bindex >= 0)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("bindex", values, |one_brkt| {
            (one_brkt.brkt_id.clone(), one_brkt.bindex)
        })
    }
}

impl Resource for OneBrkt {
    const PATH: &'static str = "oneBrkts";
    const PARENT: &'static str = "brkt";
    const PARENT_FIELD: &'static str = "brkt_id";

    type ParentId = BrktId;

    fn parent_id(&self) -> &BrktId {
        &self.brkt_id
    }
}

impl Keyed for OneBrkt {
    type Id = OneBrktId;

    fn id(&self) -> &OneBrktId {
        &self.id
    }
}

/// A player placed on a [`OneBrkt`]. Identified by the sheet and the seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrktSeed {
    pub one_brkt_id: OneBrktId,
    /// The slot on the sheet, `0..=7`.
    pub seed: i32,
    pub player_id: PlayerId,
}

impl Validate for BrktSeed {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("one_brkt_id", &self.one_brkt_id)?;
        validate::required_id("player_id", &self.player_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("one_brkt_id", &self.one_brkt_id)?;
        validate::valid_fk("player_id", &self.player_id)?;
        validate::in_range("seed", self.seed, 0, BRKT_PLAYERS - 1)
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("seed", values, |seed| (seed.one_brkt_id.clone(), seed.seed))?;
        validate::unique_by("player_id", values, |seed| {
            (seed.one_brkt_id.clone(), seed.player_id.clone())
        })
    }
}

impl Resource for BrktSeed {
    const PATH: &'static str = "brktSeeds";
    const PARENT: &'static str = "oneBrkt";
    const PARENT_FIELD: &'static str = "one_brkt_id";

    type ParentId = OneBrktId;

    fn parent_id(&self) -> &OneBrktId {
        &self.one_brkt_id
    }
}
