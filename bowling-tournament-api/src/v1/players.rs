use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{PlayerId, SquadId};
use crate::validate::{self, sanitize, Validate, MAX_AVERAGE, MAX_LANE, MAX_PERSON_NAME_LENGTH};

/// A bowler entered into a squad.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub squad_id: SquadId,
    pub first_name: String,
    pub last_name: String,
    pub average: i32,
    pub lane: i32,
    /// The position on the lane, a single uppercase letter.
    pub position: String,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Validate for Player {
    fn sanitize(&self) -> Self {
        Self {
            first_name: sanitize(&self.first_name),
            last_name: sanitize(&self.last_name),
            position: sanitize(&self.position).to_uppercase(),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("squad_id", &self.squad_id)?;
        validate::required("first_name", &self.first_name)?;
        validate::required("last_name", &self.last_name)?;
        validate::required("position", &self.position)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("squad_id", &self.squad_id)?;
        validate::valid_name("first_name", &self.first_name, MAX_PERSON_NAME_LENGTH)?;
        validate::valid_name("last_name", &self.last_name, MAX_PERSON_NAME_LENGTH)?;
        validate::in_range("average", self.average, 0, MAX_AVERAGE)?;
        validate::in_range("lane", self.lane, 1, MAX_LANE)?;

        let mut chars = self.position.chars();
        let position_ok = matches!(
            (chars.next(), chars.next()),
            (Some('A'..='Z'), None)
        );
        validate::check("position", position_ok)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("position", values, |player| {
            (
                player.squad_id.clone(),
                player.lane,
                player.position.clone(),
            )
        })
    }
}

impl Resource for Player {
    const PATH: &'static str = "players";
    const PARENT: &'static str = "squad";
    const PARENT_FIELD: &'static str = "squad_id";

    type ParentId = SquadId;

    fn parent_id(&self) -> &SquadId {
        &self.squad_id
    }
}

impl Keyed for Player {
    type Id = PlayerId;

    fn id(&self) -> &PlayerId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::Player;
    use crate::id::{PlayerId, SquadId};
    use crate::validate::{validate, validate_many, ErrorKind, ValidationError};

    fn player(lane: i32, position: &str) -> Player {
        Player {
            id: PlayerId::generate(),
            squad_id: SquadId::from(String::from("sqd_7116ce5f80164830830a7157eb093396")),
            first_name: "John".into(),
            last_name: "Doe".into(),
            average: 220,
            lane,
            position: position.into(),
        }
    }

    #[test]
    fn test_player_validate() {
        let valid = validate(&player(1, " a ")).unwrap();
        assert_eq!(valid.position, "A");
        assert_eq!(valid.full_name(), "John Doe");

        assert_eq!(
            validate(&player(1, "AB")).unwrap_err(),
            ValidationError::invalid("position")
        );
        assert_eq!(
            validate(&player(1, "1")).unwrap_err(),
            ValidationError::invalid("position")
        );
        assert_eq!(validate(&player(1, "")).unwrap_err().kind, ErrorKind::Missing);

        let mut invalid = player(1, "A");
        invalid.average = 301;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("average")
        );
    }

    #[test]
    fn test_player_positions_unique() {
        let players = vec![player(1, "A"), player(1, "B"), player(2, "A")];
        assert!(validate_many(&players).is_ok());

        let players = vec![player(1, "A"), player(1, "a")];
        assert_eq!(
            validate_many(&players).unwrap_err(),
            ValidationError::invalid("position").at(1)
        );
    }
}
