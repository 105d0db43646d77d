pub mod brkts;
pub mod divs;
pub mod elims;
pub mod entries;
pub mod events;
pub mod lanes;
pub mod players;
pub mod pots;
pub mod resource;
pub mod squads;
pub mod stages;
pub mod tmnts;

use brkts::{Brkt, BrktSeed, OneBrkt};
use divs::Div;
use elims::Elim;
use entries::{BrktEntry, DivEntry, ElimEntry, PotEntry};
use events::Event;
use lanes::Lane;
use players::Player;
use pots::Pot;
use resource::ResourceClient;
use squads::Squad;
use stages::StagesClient;
use tmnts::TmntsClient;

#[derive(Copy, Clone, Debug)]
pub struct Client<'a> {
    inner: &'a crate::Client,
}

impl<'a> Client<'a> {
    pub(crate) fn new(inner: &'a crate::Client) -> Self {
        Self { inner }
    }

    pub fn tmnts(&self) -> TmntsClient<'a> {
        TmntsClient::new(self.inner)
    }

    pub fn events(&self) -> ResourceClient<'a, Event> {
        ResourceClient::new(self.inner)
    }

    pub fn divs(&self) -> ResourceClient<'a, Div> {
        ResourceClient::new(self.inner)
    }

    pub fn squads(&self) -> ResourceClient<'a, Squad> {
        ResourceClient::new(self.inner)
    }

    pub fn lanes(&self) -> ResourceClient<'a, Lane> {
        ResourceClient::new(self.inner)
    }

    pub fn players(&self) -> ResourceClient<'a, Player> {
        ResourceClient::new(self.inner)
    }

    pub fn pots(&self) -> ResourceClient<'a, Pot> {
        ResourceClient::new(self.inner)
    }

    pub fn brkts(&self) -> ResourceClient<'a, Brkt> {
        ResourceClient::new(self.inner)
    }

    pub fn one_brkts(&self) -> ResourceClient<'a, OneBrkt> {
        ResourceClient::new(self.inner)
    }

    /// Seeds have no id of their own and only support the by-sheet operations.
    pub fn brkt_seeds(&self) -> ResourceClient<'a, BrktSeed> {
        ResourceClient::new(self.inner)
    }

    pub fn elims(&self) -> ResourceClient<'a, Elim> {
        ResourceClient::new(self.inner)
    }

    pub fn div_entries(&self) -> ResourceClient<'a, DivEntry> {
        ResourceClient::new(self.inner)
    }

    pub fn pot_entries(&self) -> ResourceClient<'a, PotEntry> {
        ResourceClient::new(self.inner)
    }

    pub fn brkt_entries(&self) -> ResourceClient<'a, BrktEntry> {
        ResourceClient::new(self.inner)
    }

    pub fn elim_entries(&self) -> ResourceClient<'a, ElimEntry> {
        ResourceClient::new(self.inner)
    }

    pub fn stages(&self) -> StagesClient<'a> {
        StagesClient::new(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::brkts::BrktSeed;
    use super::entries::ElimEntry;
    use super::resource::{collection_uri, item_uri, parent_uri, Resource};
    use super::squads::Squad;
    use crate::id::{OneBrktId, SquadId};

    #[test]
    fn test_uris() {
        let id = SquadId::from(String::from("sqd_7116ce5f80164830830a7157eb093396"));

        assert_eq!(collection_uri::<Squad>(), "/v1/squads");
        assert_eq!(
            item_uri::<Squad>(&id),
            "/v1/squads/sqd_7116ce5f80164830830a7157eb093396"
        );
        assert_eq!(
            parent_uri::<ElimEntry>(&"elm_45d884582e7042bb95b4818ccdd9974c".parse().unwrap()),
            "/v1/elimEntries/elim/elm_45d884582e7042bb95b4818ccdd9974c"
        );
        assert_eq!(
            parent_uri::<BrktSeed>(&OneBrktId::from(String::from(
                "obk_0cc7a3c0b5824a1aa6b2e36e1a4f6b8e"
            ))),
            "/v1/brktSeeds/oneBrkt/obk_0cc7a3c0b5824a1aa6b2e36e1a4f6b8e"
        );
        assert_eq!(BrktSeed::PARENT_FIELD, "one_brkt_id");
    }
}
