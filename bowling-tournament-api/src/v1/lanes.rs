use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{LaneId, SquadId};
use crate::validate::{self, Validate, MAX_LANE};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub squad_id: SquadId,
    pub lane_number: i32,
    pub in_use: bool,
}

impl Validate for Lane {
    fn sanitize(&self) -> Self {
        self.clone()
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("squad_id", &self.squad_id)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("squad_id", &self.squad_id)?;
        validate::in_range("lane_number", self.lane_number, 1, MAX_LANE)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("lane_number", values, |lane| {
            (lane.squad_id.clone(), lane.lane_number)
        })
    }
}

impl Resource for Lane {
    const PATH: &'static str = "lanes";
    const PARENT: &'static str = "squad";
    const PARENT_FIELD: &'static str = "squad_id";

    type ParentId = SquadId;

    fn parent_id(&self) -> &SquadId {
        &self.squad_id
    }
}

impl Keyed for Lane {
    type Id = LaneId;

    fn id(&self) -> &LaneId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::Lane;
    use crate::id::{LaneId, SquadId};
    use crate::validate::{validate, validate_many, ValidationError};

    #[test]
    fn test_lane_validate() {
        let squad_id = SquadId::generate();
        let lane = |lane_number| Lane {
            id: LaneId::generate(),
            squad_id: squad_id.clone(),
            lane_number,
            in_use: true,
        };

        assert!(validate(&lane(1)).is_ok());
        assert!(validate(&lane(200)).is_ok());
        assert_eq!(
            validate(&lane(201)).unwrap_err(),
            ValidationError::invalid("lane_number")
        );
        assert_eq!(
            validate(&lane(0)).unwrap_err(),
            ValidationError::invalid("lane_number")
        );

        let lanes = vec![lane(1), lane(2), lane(1)];
        assert_eq!(
            validate_many(&lanes).unwrap_err(),
            ValidationError::invalid("lane_number").at(2)
        );
    }
}
