//! Paid entries of players into divisions, pots, brackets and eliminators.
//!
//! A player can only be entered once into the same parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{
    BrktEntryId, BrktId, DivEntryId, DivId, ElimEntryId, ElimId, PlayerId, PotEntryId, PotId,
    SquadId,
};
use crate::money::Money;
use crate::validate::{self, Validate};

/// Maximum number of brackets a single player can buy.
pub const MAX_BRACKETS: i32 = 999;

macro_rules! entry {
    ($t:ty, $id:ty, $path:expr, $parent:expr, $parent_field:ident: $parent_id:ty) => {
        impl Resource for $t {
            const PATH: &'static str = $path;
            const PARENT: &'static str = $parent;
            const PARENT_FIELD: &'static str = stringify!($parent_field);

            type ParentId = $parent_id;

            fn parent_id(&self) -> &$parent_id {
                &self.$parent_field
            }
        }

        impl Keyed for $t {
            type Id = $id;

            fn id(&self) -> &$id {
                &self.id
            }
        }
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivEntry {
    pub id: DivEntryId,
    pub squad_id: SquadId,
    pub div_id: DivId,
    pub player_id: PlayerId,
    pub fee: Money,
}

impl Validate for DivEntry {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("squad_id", &self.squad_id)?;
        validate::required_id("div_id", &self.div_id)?;
        validate::required_id("player_id", &self.player_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("squad_id", &self.squad_id)?;
        validate::valid_fk("div_id", &self.div_id)?;
        validate::valid_fk("player_id", &self.player_id)?;
        validate::valid_fee("fee", self.fee)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("player_id", values, |entry| {
            (entry.div_id.clone(), entry.player_id.clone())
        })
    }
}

entry!(DivEntry, DivEntryId, "divEntries", "squad", squad_id: SquadId);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotEntry {
    pub id: PotEntryId,
    pub pot_id: PotId,
    pub player_id: PlayerId,
    pub fee: Money,
}

impl Validate for PotEntry {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("pot_id", &self.pot_id)?;
        validate::required_id("player_id", &self.player_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("pot_id", &self.pot_id)?;
        validate::valid_fk("player_id", &self.player_id)?;
        validate::valid_fee("fee", self.fee)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("player_id", values, |entry| {
            (entry.pot_id.clone(), entry.player_id.clone())
        })
    }
}

entry!(PotEntry, PotEntryId, "potEntries", "pot", pot_id: PotId);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrktEntry {
    pub id: BrktEntryId,
    pub brkt_id: BrktId,
    pub player_id: PlayerId,
    pub num_brackets: i32,
    /// Brackets that were bought but could not be filled.
    pub num_refunds: i32,
    pub fee: Money,
    pub time_stamp: DateTime<Utc>,
}

impl Validate for BrktEntry {
    fn sanitize(&self) -> Self {
        Self {
            time_stamp: validate::timestamp(self.time_stamp),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("brkt_id", &self.brkt_id)?;
        validate::required_id("player_id", &self.player_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("brkt_id", &self.brkt_id)?;
        validate::valid_fk("player_id", &self.player_id)?;
        validate::in_range("num_brackets", self.num_brackets, 1, MAX_BRACKETS)?;
        validate::in_range("num_refunds", self.num_refunds, 0, self.num_brackets)?;
        validate::valid_fee("fee", self.fee)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("player_id", values, |entry| {
            (entry.brkt_id.clone(), entry.player_id.clone())
        })
    }
}

entry!(BrktEntry, BrktEntryId, "brktEntries", "brkt", brkt_id: BrktId);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElimEntry {
    pub id: ElimEntryId,
    pub elim_id: ElimId,
    pub player_id: PlayerId,
    pub fee: Money,
}

impl Validate for ElimEntry {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("elim_id", &self.elim_id)?;
        validate::required_id("player_id", &self.player_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("elim_id", &self.elim_id)?;
        validate::valid_fk("player_id", &self.player_id)?;
        validate::valid_fee("fee", self.fee)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("player_id", values, |entry| {
            (entry.elim_id.clone(), entry.player_id.clone())
        })
    }
}

entry!(ElimEntry, ElimEntryId, "elimEntries", "elim", elim_id: ElimId);
