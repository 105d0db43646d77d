use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{DivId, ElimId, SquadId};
use crate::money::Money;
use crate::validate::{self, Validate, MAX_GAMES};

/// An eliminator side game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elim {
    pub id: ElimId,
    pub squad_id: SquadId,
    pub div_id: DivId,
    pub start: i32,
    pub games: i32,
    pub fee: Money,
    pub sort_order: i32,
}

impl Elim {
    #[inline]
    pub fn end(&self) -> i32 {
        self.start + self.games - 1
    }
}

impl Validate for Elim {
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
        validate::in_range("start", self.start, 1, MAX_GAMES)?;
        validate::in_range("games", self.games, 1, MAX_GAMES)?;
        validate::check("games", self.end() <= MAX_GAMES)?;
        validate::valid_fee("fee", self.fee)?;
        validate::valid_sort_order(self.sort_order)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

impl Resource for Elim {
    const PATH: &'static str = "elims";
    const PARENT: &'static str = "squad";
    const PARENT_FIELD: &'static str = "squad_id";

    type ParentId = SquadId;

    fn parent_id(&self) -> &SquadId {
        &self.squad_id
    }
}

impl Keyed for Elim {
    type Id = ElimId;

    fn id(&self) -> &ElimId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::Elim;
    use crate::id::{DivId, ElimId, SquadId};
    use crate::money::Money;
    use crate::validate::{validate, ValidationError};

    #[test]
    fn test_elim_validate() {
        let elim = Elim {
            id: ElimId::generate(),
            squad_id: SquadId::generate(),
            div_id: DivId::generate(),
            start: 4,
            games: 3,
            fee: Money::from_cents(500),
            sort_order: 2,
        };
        assert!(validate(&elim).is_ok());
        assert_eq!(elim.end(), 6);

        let mut invalid = elim.clone();
        invalid.start = 98;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("games")
        );

        let mut invalid = elim;
        invalid.fee = Money::ZERO;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("fee")
        );
    }
}
