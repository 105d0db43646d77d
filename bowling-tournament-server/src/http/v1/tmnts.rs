use bowling_tournament_api::id::TmntId;
use bowling_tournament_api::v1::tmnts::Tmnt;
use bowling_tournament_macros::method;

use super::resource;
use crate::http::{Request, RequestUri, Response, Result};
use crate::StatusCodeError;

pub async fn route(req: Request, uri: RequestUri<'_>) -> Result {
    let mut rem = uri;

    let id = rem.take_str();
    let action = rem.take_str();

    match (id, action) {
        (None, _) => method!(req, {
            GET => list(req).await,
            POST => resource::create::<Tmnt>(req).await,
        }),
        (Some(id), Some("full")) => {
            let id = resource::parse_id("id", id)?;
            rem.end()?;

            method!(req, {
                GET => full(req, id).await,
            })
        }
        _ => resource::route::<Tmnt>(req, uri).await,
    }
}

async fn list(req: Request) -> Result {
    let tmnts = req.state().store.tmnts().list().await?;

    Ok(Response::ok().json(&tmnts))
}

async fn full(req: Request, id: TmntId) -> Result {
    match req.state().store.tmnts().full(&id).await? {
        Some(tmnt) => Ok(Response::ok().json(&tmnt)),
        None => Err(StatusCodeError::not_found().into()),
    }
}
