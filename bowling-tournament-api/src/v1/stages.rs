//! The lifecycle of a squad.
//!
//! Every squad moves through [`StageKind::Define`], [`StageKind::Entries`] and
//! [`StageKind::Scores`]. Moving to the next stage is always possible; moving back or
//! skipping a stage requires the override to be enabled first, which records a reason and
//! a timestamp.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::resource::{Keyed, Resource, ResourceClient};
use crate::id::{SquadId, StageId};
use crate::validate::{
    self, sanitize, sanitize_opt, timestamp, Validate, ValidationError, MAX_REASON_LENGTH,
};
use crate::{Client, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageKind {
    /// The tournament is being set up.
    Define,
    /// Players and their entries are recorded.
    Entries,
    /// Scores are recorded.
    Scores,
}

impl StageKind {
    /// Returns the stage following `self`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Define => Some(Self::Entries),
            Self::Entries => Some(Self::Scores),
            Self::Scores => None,
        }
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Define => 0,
            Self::Entries => 1,
            Self::Scores => 2,
        }
    }

    #[inline]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Define),
            1 => Some(Self::Entries),
            2 => Some(Self::Scores),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Define => "DEFINE",
            Self::Entries => "ENTRIES",
            Self::Scores => "SCORES",
        }
    }
}

impl Display for StageKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = StageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEFINE" => Ok(Self::Define),
            "ENTRIES" => Ok(Self::Entries),
            "SCORES" => Ok(Self::Scores),
            _ => Err(StageError::Unknown(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("squad is already in stage {0}")]
    Unchanged(StageKind),
    #[error("cannot move from stage {from} to {to} without override")]
    InvalidTransition { from: StageKind, to: StageKind },
    #[error("unknown stage \"{0}\"")]
    Unknown(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The current stage of a squad.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub squad_id: SquadId,
    pub stage: StageKind,
    pub stage_set_at: DateTime<Utc>,
    /// Set when the squad first enters [`StageKind::Scores`].
    #[serde(default)]
    pub scores_started_at: Option<DateTime<Utc>>,
    pub stage_override_enabled: bool,
    #[serde(default)]
    pub stage_override_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stage_override_reason: Option<String>,
}

impl Stage {
    /// Creates the initial stage of a squad.
    pub fn new(id: StageId, squad_id: SquadId, now: DateTime<Utc>) -> Self {
        let now = timestamp(now);

        Self {
            id,
            squad_id,
            stage: StageKind::Define,
            stage_set_at: now,
            scores_started_at: None,
            stage_override_enabled: false,
            stage_override_at: None,
            stage_override_reason: None,
        }
    }

    /// Moves the squad to the stage `to`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Unchanged`] if the squad already is in `to` and
    /// [`StageError::InvalidTransition`] if `to` is not the next stage and the override is
    /// disabled.
    pub fn transition(
        &mut self,
        to: StageKind,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), StageError> {
        if to == self.stage {
            return Err(StageError::Unchanged(to));
        }

        if self.stage.next() != Some(to) && !self.stage_override_enabled {
            return Err(StageError::InvalidTransition {
                from: self.stage,
                to,
            });
        }

        let now = timestamp(now);

        self.stage = to;
        self.stage_set_at = now;

        if to == StageKind::Scores {
            if self.scores_started_at.is_none() {
                self.scores_started_at = Some(now);
            }
        } else {
            self.scores_started_at = None;
        }

        Ok(())
    }

    /// Enables the override with the given `reason`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sanitized `reason` is empty or too long.
    pub fn set_override(&mut self, reason: &str, now: DateTime<Utc>) -> validate::Result {
        let reason = check_reason(reason)?;

        self.stage_override_enabled = true;
        self.stage_override_at = Some(timestamp(now));
        self.stage_override_reason = Some(reason);
        Ok(())
    }

    pub fn clear_override(&mut self) {
        self.stage_override_enabled = false;
        self.stage_override_at = None;
        self.stage_override_reason = None;
    }
}

fn check_reason(reason: &str) -> std::result::Result<String, ValidationError> {
    let reason = sanitize(reason);
    validate::required("stage_override_reason", &reason)?;
    validate::valid_name("stage_override_reason", &reason, MAX_REASON_LENGTH)?;
    Ok(reason)
}

impl Validate for Stage {
    const BATCH_KEY_FIELD: &'static str = "squad_id";

    fn sanitize(&self) -> Self {
        Self {
            stage_set_at: timestamp(self.stage_set_at),
            scores_started_at: self.scores_started_at.map(timestamp),
            stage_override_at: self.stage_override_at.map(timestamp),
            stage_override_reason: sanitize_opt(&self.stage_override_reason),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("squad_id", &self.squad_id)?;

        if self.stage_override_enabled {
            if self.stage_override_reason.is_none() {
                return Err(ValidationError::missing("stage_override_reason"));
            }
            if self.stage_override_at.is_none() {
                return Err(ValidationError::missing("stage_override_at"));
            }
        }

        if self.stage == StageKind::Scores && self.scores_started_at.is_none() {
            return Err(ValidationError::missing("scores_started_at"));
        }

        Ok(())
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("squad_id", &self.squad_id)?;

        if let Some(reason) = &self.stage_override_reason {
            validate::valid_name("stage_override_reason", reason, MAX_REASON_LENGTH)?;
        }

        if !self.stage_override_enabled {
            validate::check(
                "stage_override_reason",
                self.stage_override_reason.is_none(),
            )?;
            validate::check("stage_override_at", self.stage_override_at.is_none())?;
        }

        if self.stage != StageKind::Scores {
            validate::check("scores_started_at", self.scores_started_at.is_none())?;
        }

        Ok(())
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.squad_id.to_string())
    }
}

impl Resource for Stage {
    const PATH: &'static str = "stages";
    const PARENT: &'static str = "squad";
    const PARENT_FIELD: &'static str = "squad_id";

    type ParentId = SquadId;

    fn parent_id(&self) -> &SquadId {
        &self.squad_id
    }
}

impl Keyed for Stage {
    type Id = StageId;

    fn id(&self) -> &StageId {
        &self.id
    }
}

/// Body of `POST /v1/stages/squad/{id}/advance`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStage {
    pub stage: StageKind,
}

/// Body of `PUT /v1/stages/squad/{id}/override`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOverride {
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct StagesClient<'a> {
    client: &'a Client,
    inner: ResourceClient<'a, Stage>,
}

impl<'a> StagesClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            inner: ResourceClient::new(client),
        }
    }

    fn squad_uri(squad: &SquadId, suffix: &str) -> String {
        format!("/v1/stages/squad/{}{}", squad, suffix)
    }

    /// Returns the stage of the given `squad`.
    pub async fn get(&self, squad: &SquadId) -> Result<Stage> {
        validate::valid_fk("squad_id", squad)?;

        let req = self
            .client
            .request()
            .uri(&Self::squad_uri(squad, ""))
            .build();

        self.client.send(req).await?.json().await
    }

    pub async fn create(&self, stage: &Stage) -> Result<Stage> {
        self.inner.create(stage).await
    }

    /// Moves the stage of `squad` to `to`. The server rejects the move with `409 Conflict`
    /// if it is not allowed.
    pub async fn advance(&self, squad: &SquadId, to: StageKind) -> Result<Stage> {
        validate::valid_fk("squad_id", squad)?;

        let req = self
            .client
            .request()
            .post()
            .uri(&Self::squad_uri(squad, "/advance"))
            .body(&AdvanceStage { stage: to })?
            .build();

        self.client.send(req).await?.json().await
    }

    pub async fn set_override(&self, squad: &SquadId, reason: &str) -> Result<Stage> {
        validate::valid_fk("squad_id", squad)?;
        let reason = check_reason(reason)?;

        let req = self
            .client
            .request()
            .put()
            .uri(&Self::squad_uri(squad, "/override"))
            .body(&StageOverride { reason })?
            .build();

        self.client.send(req).await?.json().await
    }

    pub async fn clear_override(&self, squad: &SquadId) -> Result<Stage> {
        validate::valid_fk("squad_id", squad)?;

        let req = self
            .client
            .request()
            .delete()
            .uri(&Self::squad_uri(squad, "/override"))
            .build();

        self.client.send(req).await?.json().await
    }

    pub async fn delete(&self, id: &StageId) -> Result<u64> {
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
    use serde_test::{assert_tokens, Token};

    use super::{Stage, StageError, StageKind};
    use crate::id::{SquadId, StageId};
    use crate::validate::{validate, validate_many, ErrorKind, ValidationError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 12, 20, 9, 0, 0).unwrap()
    }

    fn stage() -> Stage {
        Stage::new(StageId::generate(), SquadId::generate(), now())
    }

    #[test]
    fn test_stage_kind_serde() {
        assert_tokens(
            &StageKind::Entries,
            &[Token::UnitVariant {
                name: "StageKind",
                variant: "ENTRIES",
            }],
        );

        assert_eq!("scores".parse::<StageKind>(), Ok(StageKind::Scores));
        assert_eq!(
            "final".parse::<StageKind>(),
            Err(StageError::Unknown("final".into()))
        );
        assert_eq!(StageKind::Scores.next(), None);
    }

    #[test]
    fn test_stage_forward() {
        let mut stage = stage();
        assert_eq!(stage.stage, StageKind::Define);
        assert!(validate(&stage).is_ok());

        let later = now() + Duration::hours(1);
        stage.transition(StageKind::Entries, later).unwrap();
        assert_eq!(stage.stage, StageKind::Entries);
        assert_eq!(stage.stage_set_at, later);
        assert_eq!(stage.scores_started_at, None);

        stage.transition(StageKind::Scores, later).unwrap();
        assert_eq!(stage.scores_started_at, Some(later));
        assert!(validate(&stage).is_ok());

        assert_eq!(
            stage.transition(StageKind::Scores, later),
            Err(StageError::Unchanged(StageKind::Scores))
        );
    }

    #[test]
    fn test_stage_requires_override() {
        let mut stage = stage();
        assert_eq!(
            stage.transition(StageKind::Scores, now()),
            Err(StageError::InvalidTransition {
                from: StageKind::Define,
                to: StageKind::Scores,
            })
        );

        stage.set_override("  Lane   machine <b>broke</b> ", now()).unwrap();
        assert_eq!(
            stage.stage_override_reason.as_deref(),
            Some("Lane machine broke")
        );
        assert!(validate(&stage).is_ok());

        stage.transition(StageKind::Scores, now()).unwrap();
        assert!(stage.scores_started_at.is_some());

        stage.transition(StageKind::Entries, now()).unwrap();
        assert_eq!(stage.scores_started_at, None);

        stage.clear_override();
        assert!(!stage.stage_override_enabled);
        assert_eq!(stage.stage_override_at, None);
        assert_eq!(
            stage.transition(StageKind::Define, now()),
            Err(StageError::InvalidTransition {
                from: StageKind::Entries,
                to: StageKind::Define,
            })
        );
    }

    #[test]
    fn test_stage_override_reason() {
        let mut stage = stage();
        assert_eq!(
            stage.set_override("<i> </i>", now()),
            Err(ValidationError::missing("stage_override_reason"))
        );
        assert_eq!(
            stage.set_override(&"x".repeat(201), now()),
            Err(ValidationError::invalid("stage_override_reason"))
        );
        assert!(!stage.stage_override_enabled);
    }

    #[test]
    fn test_stage_validate() {
        let mut invalid = stage();
        invalid.stage_override_enabled = true;
        assert_eq!(validate(&invalid).unwrap_err().kind, ErrorKind::Missing);

        let mut invalid = stage();
        invalid.stage_override_reason = Some("reason".into());
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("stage_override_reason")
        );

        let mut invalid = stage();
        invalid.stage = StageKind::Scores;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::missing("scores_started_at")
        );

        let mut invalid = stage();
        invalid.scores_started_at = Some(now());
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("scores_started_at")
        );
    }

    #[test]
    fn test_stage_millisecond_timestamps() {
        let precise = now() + Duration::nanoseconds(123_456_789);

        let mut stage = Stage::new(StageId::generate(), SquadId::generate(), precise);
        assert_eq!(stage.stage_set_at.nanosecond(), 123_000_000);

        stage.set_override("Late start", precise).unwrap();
        assert_eq!(
            stage.stage_override_at.map(|at| at.nanosecond()),
            Some(123_000_000)
        );

        stage.transition(StageKind::Scores, precise).unwrap();
        assert_eq!(stage.stage_set_at.nanosecond(), 123_000_000);
        assert_eq!(stage.scores_started_at, Some(stage.stage_set_at));

        let mut raw = stage.clone();
        raw.stage_set_at = precise;
        assert_eq!(validate(&raw).unwrap().stage_set_at, stage.stage_set_at);
    }

    #[test]
    fn test_stage_duplicate_squad() {
        let first = stage();
        let mut second = stage();
        second.squad_id = first.squad_id.clone();

        assert_eq!(
            validate_many(&[first, second]).unwrap_err(),
            ValidationError::invalid("squad_id").at(1)
        );
    }
}
