use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::resource::{Keyed, Resource};
use crate::id::{DivId, TmntId};
use crate::validate::{
    self, sanitize, Validate, MAX_HDCP_FROM, MAX_HDCP_PER, MAX_LABEL_LENGTH,
};

/// A scoring category, e.g. scratch or handicap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Div {
    pub id: DivId,
    pub tmnt_id: TmntId,
    pub div_name: String,
    /// Handicap percentage as a fraction, `0.9` for 90%.
    pub hdcp_per: f64,
    /// The average handicaps are calculated from.
    pub hdcp_from: i32,
    /// Whether handicaps are truncated to integers.
    pub int_hdcp: bool,
    pub hdcp_for: HdcpFor,
    pub sort_order: i32,
}

impl Div {
    /// Returns the per game handicap for a bowler with the given `average`.
    pub fn hdcp(&self, average: i32) -> f64 {
        let hdcp = (f64::from(self.hdcp_from - average) * self.hdcp_per).max(0.0);

        if self.int_hdcp {
            hdcp.floor()
        } else {
            hdcp
        }
    }
}

/// Whether the handicap is added per game or per series.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HdcpFor {
    Game,
    Series,
}

impl HdcpFor {
    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Game => 0,
            Self::Series => 1,
        }
    }

    #[inline]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Game),
            1 => Some(Self::Series),
            _ => None,
        }
    }
}

impl Display for HdcpFor {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Game => "Game",
            Self::Series => "Series",
        })
    }
}

impl Validate for Div {
    fn sanitize(&self) -> Self {
        Self {
            div_name: sanitize(&self.div_name),
            ..self.clone()
        }
    }

    fn validate_required(&self) -> validate::Result {
        validate::required_id("id", &self.id)?;
        validate::required_id("tmnt_id", &self.tmnt_id)?;
        validate::required("div_name", &self.div_name)
    }

    fn validate_format(&self) -> validate::Result {
        validate::valid_fk("id", &self.id)?;
        validate::valid_fk("tmnt_id", &self.tmnt_id)?;
        validate::valid_name("div_name", &self.div_name, MAX_LABEL_LENGTH)?;
        validate::in_range("hdcp_per", self.hdcp_per, 0.0, MAX_HDCP_PER)?;
        validate::in_range("hdcp_from", self.hdcp_from, 0, MAX_HDCP_FROM)?;
        validate::valid_sort_order(self.sort_order)
    }

    fn batch_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn validate_batch(values: &[Self]) -> validate::Result {
        validate::unique_by("div_name", values, |div| {
            (div.tmnt_id.clone(), div.div_name.to_lowercase())
        })
    }
}

impl Resource for Div {
    const PATH: &'static str = "divs";
    const PARENT: &'static str = "tmnt";
    const PARENT_FIELD: &'static str = "tmnt_id";

    type ParentId = TmntId;

    fn parent_id(&self) -> &TmntId {
        &self.tmnt_id
    }
}

impl Keyed for Div {
    type Id = DivId;

    fn id(&self) -> &DivId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{Div, HdcpFor};
    use crate::id::{DivId, TmntId};
    use crate::validate::{validate, validate_many, ValidationError};

    fn div(name: &str) -> Div {
        Div {
            id: DivId::generate(),
            tmnt_id: TmntId::from(String::from("tmt_fd99387c33d9c78aba290286576ddce5")),
            div_name: name.into(),
            hdcp_per: 0.9,
            hdcp_from: 220,
            int_hdcp: true,
            hdcp_for: HdcpFor::Game,
            sort_order: 1,
        }
    }

    #[test]
    fn test_div_hdcp() {
        let div = div("Handicap");
        assert_eq!(div.hdcp(200), 18.0);
        assert_eq!(div.hdcp(199), 18.0);
        assert_eq!(div.hdcp(230), 0.0);

        let mut div = div;
        div.int_hdcp = false;
        assert!((div.hdcp(199) - 18.9).abs() < 1e-9);
    }

    #[test]
    fn test_div_validate() {
        assert!(validate(&div("Scratch")).is_ok());

        let mut invalid = div("Scratch");
        invalid.hdcp_per = 1.5;
        assert_eq!(
            validate(&invalid).unwrap_err(),
            ValidationError::invalid("hdcp_per")
        );

        let mut invalid = div("Scratch");
        invalid.hdcp_per = f64::NAN;
        assert!(validate(&invalid).is_err());

        let divs = vec![div("Scratch"), div("scratch")];
        assert_eq!(
            validate_many(&divs).unwrap_err(),
            ValidationError::invalid("div_name").at(1)
        );
    }
}
