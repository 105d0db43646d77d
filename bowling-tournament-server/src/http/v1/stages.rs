//! The stage of a squad is only changed through the transitions below, never by writing the
//! row directly.

use bowling_tournament_api::id::{SquadId, StageId};
use bowling_tournament_api::v1::stages::{AdvanceStage, Stage, StageOverride};
use bowling_tournament_api::Count;
use bowling_tournament_macros::method;
use chrono::Utc;

use super::resource;
use crate::http::{Request, RequestUri, Response, Result};
use crate::StatusCodeError;

pub async fn route(req: Request, mut uri: RequestUri<'_>) -> Result {
    match uri.take_str() {
        None => method!(req, {
            POST => resource::create::<Stage>(req).await,
        }),
        Some("squad") => {
            let squad = match uri.take_str() {
                Some(squad) => resource::parse_id("squad_id", squad)?,
                None => return Err(StatusCodeError::not_found().into()),
            };

            match uri.take_str() {
                None => method!(req, {
                    GET => get(req, squad).await,
                }),
                Some("advance") => {
                    uri.end()?;

                    method!(req, {
                        POST => advance(req, squad).await,
                    })
                }
                Some("override") => {
                    uri.end()?;

                    method!(req, {
                        PUT => set_override(req, squad).await,
                        DELETE => clear_override(req, squad).await,
                    })
                }
                Some(_) => Err(StatusCodeError::not_found().into()),
            }
        }
        Some(id) => {
            let id: StageId = resource::parse_id("id", id)?;
            uri.end()?;

            method!(req, {
                DELETE => delete(req, id).await,
            })
        }
    }
}

async fn get(req: Request, squad: SquadId) -> Result {
    match req.state().store.stages().get_for_squad(&squad).await? {
        Some(stage) => Ok(Response::ok().json(&stage)),
        None => Err(StatusCodeError::not_found().into()),
    }
}

async fn advance(mut req: Request, squad: SquadId) -> Result {
    let body: AdvanceStage = req.json().await?;
    let now = Utc::now();

    let stage = req
        .state()
        .store
        .stages()
        .modify(&squad, |stage| {
            stage.transition(body.stage, now)?;
            Ok(())
        })
        .await?;

    respond(stage, &squad)
}

async fn set_override(mut req: Request, squad: SquadId) -> Result {
    let body: StageOverride = req.json().await?;
    let now = Utc::now();

    let stage = req
        .state()
        .store
        .stages()
        .modify(&squad, |stage| {
            stage.set_override(&body.reason, now)?;
            Ok(())
        })
        .await?;

    respond(stage, &squad)
}

async fn clear_override(req: Request, squad: SquadId) -> Result {
    let stage = req
        .state()
        .store
        .stages()
        .modify(&squad, |stage| {
            stage.clear_override();
            Ok(())
        })
        .await?;

    respond(stage, &squad)
}

async fn delete(req: Request, id: StageId) -> Result {
    let count = req.state().store.records::<Stage>().delete(&id).await?;
    if count == 0 {
        return Err(StatusCodeError::not_found().into());
    }

    Ok(Response::ok().json(&Count::from(count)))
}

fn respond(stage: Option<Stage>, squad: &SquadId) -> Result {
    match stage {
        Some(stage) => {
            log::info!(
                "Squad {} is in stage {} (override: {})",
                squad,
                stage.stage,
                stage.stage_override_enabled
            );

            Ok(Response::ok().json(&stage))
        }
        None => Err(StatusCodeError::not_found().into()),
    }
}
