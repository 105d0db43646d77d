use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{EventId, TmntId};
use crate::money::Money;
use crate::validate::{
    self, sanitize, Validate, ValidationError, MAX_GAMES, MAX_LABEL_LENGTH, MAX_TEAM_SIZE,
};

/// An event of a tournament, e.g. singles or doubles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub tmnt_id: TmntId,
    pub event_name: String,
    pub team_size: i32,
    pub games: i32,
    pub entry_fee: Money,
    pub lineage: Money,
    pub prize_fund: Money,
    pub other: Money,
    pub expenses: Money,
    pub added_money: Money,
    pub sort_order: i32,
}

impl Event {
    /// The sum of lineage, prize fund, other and expenses. Must equal the entry fee.
    pub fn lpox(&self) -> Money {
        self.lineage + self.prize_fund + self.other + self.expenses
    }
}

impl Validate for Event {
    fn sanitize(&self) -> Self {
        Self {
            event_name: sanitize(&self.event_name),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("tmnt_id", &self.tmnt_id)?;
        validate::required("event_name", &self.event_name)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("tmnt_id", &self.tmnt_id)?;
        validate::valid_name("event_name", &self.event_name, MAX_LABEL_LENGTH)?;
        validate::in_range("team_size", self.team_size, 1, MAX_TEAM_SIZE)?;
        validate::in_range("games", self.games, 1, MAX_GAMES)?;
        validate::valid_fee("entry_fee", self.entry_fee)?;
        validate::valid_amount("lineage", self.lineage)?;
        validate::valid_amount("prize_fund", self.prize_fund)?;
        validate::valid_amount("other", self.other)?;
        validate::valid_amount("expenses", self.expenses)?;
        validate::valid_amount("added_money", self.added_money)?;
        validate::valid_sort_order(self.sort_order)?;

        if self.lpox() != self.entry_fee {
            return Err(ValidationError::invalid("lpox"));
        }

        Ok(())
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

impl Resource for Event {
    const PATH: &'static str = "events";
    const PARENT: &'static str = "tmnt";
    const PARENT_FIELD: &'static str = "tmnt_id";

    type ParentId = TmntId;

    fn parent_id(&self) -> &TmntId {
        &self.tmnt_id
    }
}

impl Keyed for Event {
    type Id = EventId;

    fn id(&self) -> &EventId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::Event;
    use crate::id::{EventId, TmntId};
    use crate::money::Money;
    use crate::validate::{validate, ValidationError};

    fn event() -> Event {
        Event {
            id: EventId::generate(),
            tmnt_id: TmntId::generate(),
            event_name: "Singles".into(),
            team_size: 1,
            games: 6,
            entry_fee: Money::from_cents(8000),
            lineage: Money::from_cents(1800),
            prize_fund: Money::from_cents(5500),
            other: Money::from_cents(200),
            expenses: Money::from_cents(500),
            added_money: Money::ZERO,
            sort_order: 1,
        }
    }

    #[test]
    fn test_event_validate() {
        assert!(validate(&event()).is_ok());

        let mut invalid = event();
        invalid.expenses = Money::from_cents(400);
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("lpox")
        );

        let mut invalid = event();
        invalid.team_size = 6;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("team_size")
        );

        let mut invalid = event();
        invalid.entry_fee = Money::ZERO;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("entry_fee")
        );
    }
}
