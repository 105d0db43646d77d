use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{DivId, PotId, SquadId};
use crate::money::Money;
use crate::validate::{self, Validate};

/// A side wager within a division.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub id: PotId,
    pub squad_id: SquadId,
    pub div_id: DivId,
    pub pot_type: PotType,
    pub fee: Money,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotType {
    /// Paid out for every game.
    Game,
    /// Paid out for the last game only.
    #[serde(rename = "Last Game")]
    LastGame,
    Series,
}

impl PotType {
    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Game => 0,
            Self::LastGame => 1,
            Self::Series => 2,
        }
    }

    #[inline]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Game),
            1 => Some(Self::LastGame),
            2 => Some(Self::Series),
            _ => None,
        }
    }
}

impl Display for PotType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Game => "Game",
            Self::LastGame => "Last Game",
            Self::Series => "Series",
        })
    }
}

impl Validate for Pot {
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
        validate::valid_fee("fee", self.fee)?;
        validate::valid_sort_order(self.sort_order)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("pot_type", values, |pot| {
            (pot.squad_id.clone(), pot.div_id.clone(), pot.pot_type)
        })
    }
}

impl Resource for Pot {
    const PATH: &'static str = "pots";
    const PARENT: &'static str = "squad";
    const PARENT_FIELD: &'static str = "squad_id";

    type ParentId = SquadId;

    fn parent_id(&self) -> &SquadId {
        &self.squad_id
    }
}

impl Keyed for Pot {
    type Id = PotId;

    fn id(&self) -> &PotId {
        &self.id
    }
}
