use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::lanes::Lane;
use super::resource::{Keyed, Resource};
use crate::id::{EventId, LaneId, SquadId};
use crate::validate::{
    self, sanitize, Validate, ValidationError, MAX_GAMES, MAX_LABEL_LENGTH, MAX_LANE,
};

/// A block of games bowled at the same time on the same set of lanes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub id: SquadId,
    pub event_id: EventId,
    pub squad_name: String,
    pub games: i32,
    /// Number of lanes in use. Lanes are used in pairs.
    pub lane_count: i32,
    /// The first, always odd, lane of the squad.
    pub starting_lane: i32,
    pub squad_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad_time: Option<NaiveTime>,
    pub sort_order: i32,
}

impl Squad {
    /// Returns the number of the last lane of the squad.
    #[inline]
    pub fn last_lane(&self) -> i32 {
        self.starting_lane + self.lane_count - 1
    }

    /// Returns the lane numbers of the squad in ascending order.
    pub fn lane_numbers(&self) -> impl Iterator<Item = i32> {
        self.starting_lane..=self.last_lane()
    }

    /// Creates one [`Lane`] row per lane of the squad, all in use.
    pub fn lanes(&self) -> Vec<Lane> {
        self.lane_numbers()
            .map(|lane_number| Lane {
                id: LaneId::generate(),
                squad_id: self.id.clone(),
                lane_number,
                in_use: true,
            })
            .collect()
    }
}

impl Validate for Squad {
    fn sanitize(&self) -> Self {
        Self {
            squad_name: sanitize(&self.squad_name),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("event_id", &self.event_id)?;
        validate::required("squad_name", &self.squad_name)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("event_id", &self.event_id)?;
        validate::valid_name("squad_name", &self.squad_name, MAX_LABEL_LENGTH)?;
        validate::in_range("games", self.games, 1, MAX_GAMES)?;

        validate::in_range("lane_count", self.lane_count, 2, MAX_LANE)?;
        validate::check("lane_count", self.lane_count % 2 == 0)?;
        validate::in_range("starting_lane", self.starting_lane, 1, MAX_LANE - 1)?;
        validate::check("starting_lane", self.starting_lane % 2 == 1)?;

        if self.last_lane() > MAX_LANE {
            return Err(ValidationError::invalid("lane_count"));
        }

        validate::valid_sort_order(self.sort_order)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

impl Resource for Squad {
    const PATH: &'static str = "squads";
    const PARENT: &'static str = "event";
    const PARENT_FIELD: &'static str = "event_id";

    type ParentId = EventId;

    fn parent_id(&self) -> &EventId {
        &self.event_id
    }
}

impl Keyed for Squad {
    type Id = SquadId;

    fn id(&self) -> &SquadId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use serde_test::{assert_tokens, Token};

    use super::Squad;
    use crate::id::{EventId, SquadId};
    use crate::validate::{validate, validate_many, ValidationError};

    fn squad() -> Squad {
        Squad {
            id: SquadId::from(String::from("sqd_7116ce5f80164830830a7157eb093396")),
            event_id: EventId::from(String::from("evt_cb97b73cb538418ab993fc867f860510")),
            squad_name: "Squad 1".into(),
            games: 6,
            lane_count: 12,
            starting_lane: 29,
            squad_date: NaiveDate::from_ymd_opt(2026, 12, 20).unwrap(),
            squad_time: None,
            sort_order: 1,
        }
    }

    #[test]
    fn test_squad_lanes() {
        let squad = squad();
        assert_eq!(squad.last_lane(), 40);

        let lanes = squad.lanes();
        assert_eq!(lanes.len(), 12);
        assert_eq!(lanes[0].lane_number, 29);
        assert_eq!(lanes[11].lane_number, 40);
        assert!(lanes.iter().all(|lane| lane.squad_id == squad.id));
        assert!(validate_many(&lanes).is_ok());
    }

    #[test]
    fn test_squad_validate() {
        assert!(validate(&squad()).is_ok());

        let mut invalid = squad();
        invalid.lane_count = 11;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("lane_count")
        );

        let mut invalid = squad();
        invalid.starting_lane = 30;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("starting_lane")
        );

        let mut invalid = squad();
        invalid.starting_lane = 191;
        invalid.lane_count = 12;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("lane_count")
        );

        let mut valid = squad();
        valid.starting_lane = 199;
        valid.lane_count = 2;
        assert!(validate(&valid).is_ok());
    }

    #[test]
    fn test_squad_serde() {
        let mut squad = squad();
        squad.squad_time = Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap());

        assert_tokens(
            &squad,
            &[
                Token::Struct {
                    name: "Squad",
                    len: 9,
                },
                Token::Str("id"),
                Token::Str("sqd_7116ce5f80164830830a7157eb093396"),
                Token::Str("event_id"),
                Token::Str("evt_cb97b73cb538418ab993fc867f860510"),
                Token::Str("squad_name"),
                Token::Str("Squad 1"),
                Token::Str("games"),
                Token::I32(6),
                Token::Str("lane_count"),
                Token::I32(12),
                Token::Str("starting_lane"),
                Token::I32(29),
                Token::Str("squad_date"),
                Token::Str("2026-12-20"),
                Token::Str("squad_time"),
                Token::Some,
                Token::Str("10:00:00"),
                Token::Str("sort_order"),
                Token::I32(1),
                Token::StructEnd,
            ],
        );
    }
}
