mod resource;
mod stages;
mod tmnts;

use bowling_tournament_api::v1::brkts::{Brkt, BrktSeed, OneBrkt};
use bowling_tournament_api::v1::divs::Div;
use bowling_tournament_api::v1::elims::Elim;
use bowling_tournament_api::v1::entries::{BrktEntry, DivEntry, ElimEntry, PotEntry};
use bowling_tournament_api::v1::events::Event;
use bowling_tournament_api::v1::lanes::Lane;
use bowling_tournament_api::v1::players::Player;
use bowling_tournament_api::v1::pots::Pot;
use bowling_tournament_api::v1::squads::Squad;

use crate::http::{Request, RequestUri, Result};
use crate::StatusCodeError;

pub async fn route(req: Request, mut uri: RequestUri<'_>) -> Result {
    let path = match uri.take_str() {
        Some(path) => path,
        None => return Err(StatusCodeError::not_found().into()),
    };

    match path {
        "tmnts" => tmnts::route(req, uri).await,
        "stages" => stages::route(req, uri).await,
        "events" => resource::route::<Event>(req, uri).await,
        "divs" => resource::route::<Div>(req, uri).await,
        "squads" => resource::route::<Squad>(req, uri).await,
        "lanes" => resource::route::<Lane>(req, uri).await,
        "players" => resource::route::<Player>(req, uri).await,
        "pots" => resource::route::<Pot>(req, uri).await,
        "brkts" => resource::route::<Brkt>(req, uri).await,
        "oneBrkts" => resource::route::<OneBrkt>(req, uri).await,
        "brktSeeds" => resource::route_collection::<BrktSeed>(req, uri).await,
        "elims" => resource::route::<Elim>(req, uri).await,
        "divEntries" => resource::route::<DivEntry>(req, uri).await,
        "potEntries" => resource::route::<PotEntry>(req, uri).await,
        "brktEntries" => resource::route::<BrktEntry>(req, uri).await,
        "elimEntries" => resource::route::<ElimEntry>(req, uri).await,
        _ => Err(StatusCodeError::not_found().into()),
    }
}
