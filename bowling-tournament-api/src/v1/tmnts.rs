use std::ops::Deref;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::brkts::Brkt;
use super::divs::Div;
use super::elims::Elim;
use super::events::Event;
use super::lanes::Lane;
use super::pots::Pot;
use super::resource::{item_uri, Keyed, Resource, ResourceClient};
use super::squads::Squad;
use super::stages::Stage;
use crate::id::{BowlId, TmntId, UserId};
use crate::validate::{self, sanitize, Validate, ValidationError, MAX_TMNT_NAME_LENGTH};
use crate::{Client, Result};

/// A tournament, the root of all other rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tmnt {
    pub id: TmntId,
    pub user_id: UserId,
    pub bowl_id: BowlId,
    pub tmnt_name: String,
    /// `YYYY-MM-DD`
    pub start_date: NaiveDate,
    /// `YYYY-MM-DD`
    pub end_date: NaiveDate,
}

impl Validate for Tmnt {
    fn sanitize(&self) -> Self {
        Self {
            tmnt_name: sanitize(&self.tmnt_name),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("user_id", &self.user_id)?;
        validate::required_id("bowl_id", &self.bowl_id)?;
        validate::required("tmnt_name", &self.tmnt_name)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("user_id", &self.user_id)?;
        validate::valid_fk("bowl_id", &self.bowl_id)?;
        validate::valid_name("tmnt_name", &self.tmnt_name, MAX_TMNT_NAME_LENGTH)?;

        if self.end_date < self.start_date {
            return Err(ValidationError::invalid("end_date"));
        }

        Ok(())
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

impl Resource for Tmnt {
    const PATH: &'static str = "tmnts";
    const PARENT: &'static str = "user";
    const PARENT_FIELD: &'static str = "user_id";

    type ParentId = UserId;

    fn parent_id(&self) -> &UserId {
        &self.user_id
    }
}

impl Keyed for Tmnt {
    type Id = TmntId;

    fn id(&self) -> &TmntId {
        &self.id
    }
}

/// The listing form of a [`Tmnt`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmntOverview {
    pub id: TmntId,
    pub tmnt_name: String,
    pub bowl_id: BowlId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<Tmnt> for TmntOverview {
    fn from(tmnt: Tmnt) -> Self {
        Self {
            id: tmnt.id,
            tmnt_name: tmnt.tmnt_name,
            bowl_id: tmnt.bowl_id,
            start_date: tmnt.start_date,
            end_date: tmnt.end_date,
        }
    }
}

/// A tournament together with everything defined for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TmntFull {
    pub tmnt: Tmnt,
    pub events: Vec<Event>,
    pub divs: Vec<Div>,
    pub squads: Vec<Squad>,
    pub lanes: Vec<Lane>,
    pub pots: Vec<Pot>,
    pub brkts: Vec<Brkt>,
    pub elims: Vec<Elim>,
    pub stages: Vec<Stage>,
}

#[derive(Clone, Debug)]
pub struct TmntsClient<'a> {
    client: &'a Client,
    inner: ResourceClient<'a, Tmnt>,
}

impl<'a> TmntsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            inner: ResourceClient::new(client),
        }
    }

    /// Returns a list of all tournaments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<TmntOverview>> {
        let req = self.client.request().uri("/v1/tmnts").build();

        self.client.send(req).await?.json().await
    }

    /// Returns the tournament with the given `id` and all of its events, divisions, squads,
    /// lanes, pots, brackets, eliminators and stages.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn full(&self, id: &TmntId) -> Result<TmntFull> {
        validate::valid_fk("id", id)?;

        let uri = format!("{}/full", item_uri::<Tmnt>(id));
        let req = self.client.request().uri(&uri).build();

        self.client.send(req).await?.json().await
    }
}

impl<'a> Deref for TmntsClient<'a> {
    type Target = ResourceClient<'a, Tmnt>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::Tmnt;
    use crate::id::{BowlId, TmntId, UserId};
    use crate::validate::{validate, ErrorKind, ValidationError};

    use chrono::NaiveDate;

    fn tmnt() -> Tmnt {
        Tmnt {
            id: TmntId::generate(),
            user_id: UserId::generate(),
            bowl_id: BowlId::generate(),
            tmnt_name: " Summer  Classic ".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(),
        }
    }

    #[test]
    fn test_tmnt_validate() {
        let tmnt = validate(&tmnt()).unwrap();
        assert_eq!(tmnt.tmnt_name, "Summer Classic");

        let mut invalid = tmnt.clone();
        invalid.tmnt_name = "<p></p>".into();
        assert_eq!(validate(&invalid).unwrap_err().kind, ErrorKind::Missing);

        let mut invalid = tmnt.clone();
        invalid.end_date = NaiveDate::from_ymd_opt(2026, 7, 3).unwrap();
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("end_date")
        );

        let mut invalid = tmnt;
        invalid.bowl_id = BowlId::from(UserId::generate().to_string());
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("bowl_id")
        );
    }

    #[test]
    fn test_tmnt_json() {
        let json = r#"{
            "id": "tmt_fd99387c33d9c78aba290286576ddce5",
            "user_id": "usr_5bcefb5d314fff1ff5da6521a2fa7bde",
            "bowl_id": "bwl_561540bd64974da9abdd97765fdb3659",
            "tmnt_name": "Gold Pin",
            "start_date": "2026-12-20",
            "end_date": "2026-12-20"
        }"#;

        let tmnt: Tmnt = serde_json::from_str(json).unwrap();
        assert_eq!(tmnt.tmnt_name, "Gold Pin");
        assert_eq!(
            tmnt.start_date,
            NaiveDate::from_ymd_opt(2026, 12, 20).unwrap()
        );
        assert!(validate(&tmnt).is_ok());
    }
}
