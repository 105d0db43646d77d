//! Handlers shared by all collections.
//!
//! Every collection `T` is served under `/v1/{path}`:
//! - `POST /v1/{path}`: create one row
//! - `POST /v1/{path}/many`: create many rows
//! - `GET|PUT|DELETE /v1/{path}/{id}`: a single row
//! - `GET|PUT|DELETE /v1/{path}/{parent}/{id}`: all rows of a parent

use bowling_tournament_api::v1::resource::check_parent;
use bowling_tournament_api::{validate, Count, Identifier, ValidationError};
use bowling_tournament_macros::method;

use crate::http::{Request, RequestUri, Response, Result};
use crate::store::{KeyedRecord, Record};
use crate::{Error, StatusCodeError};

pub async fn route<T>(req: Request, uri: RequestUri<'_>) -> Result
where
    T: KeyedRecord,
{
    let mut rem = uri;

    match rem.take_str() {
        None => method!(req, {
            POST => create::<T>(req).await,
        }),
        Some(segment) if segment == "many" || segment == T::PARENT => {
            route_collection::<T>(req, uri).await
        }
        Some(id) => {
            let id = parse_id::<T::Id>("id", id)?;
            rem.end()?;

            method!(req, {
                GET => get::<T>(req, id).await,
                PUT => update::<T>(req, id).await,
                DELETE => delete::<T>(req, id).await,
            })
        }
    }
}

/// Routes the operations that work on many rows at once. This is all a collection without
/// keys supports.
pub async fn route_collection<T>(req: Request, mut uri: RequestUri<'_>) -> Result
where
    T: Record,
{
    match uri.take_str() {
        Some("many") => {
            uri.end()?;

            method!(req, {
                POST => create_many::<T>(req).await,
            })
        }
        Some(segment) if segment == T::PARENT => {
            let parent = match uri.take_str() {
                Some(parent) => parse_id::<T::ParentId>(T::PARENT_FIELD, parent)?,
                None => return Err(StatusCodeError::not_found().into()),
            };
            uri.end()?;

            method!(req, {
                GET => list_for::<T>(req, parent).await,
                PUT => replace_for::<T>(req, parent).await,
                DELETE => delete_for::<T>(req, parent).await,
            })
        }
        _ => Err(StatusCodeError::not_found().into()),
    }
}

/// Parses an id taken from the path. A malformed id is rejected like an invalid field.
pub fn parse_id<I>(field: &'static str, segment: &str) -> std::result::Result<I, Error>
where
    I: Identifier,
{
    match segment.parse() {
        Ok(id) => Ok(id),
        Err(err) => {
            log::debug!("Rejecting {} {:?}: {}", field, segment, err);
            Err(ValidationError::invalid(field).into())
        }
    }
}

pub async fn create<T>(mut req: Request) -> Result
where
    T: KeyedRecord,
{
    let value: T = req.json().await?;
    let value = validate::validate(&value)?;

    req.state().store.records::<T>().insert(&value).await?;

    log::debug!("Created {} {}", T::PATH, value.id());

    Ok(Response::created().json(&value))
}

async fn create_many<T>(mut req: Request) -> Result
where
    T: Record,
{
    let values: Vec<T> = req.json().await?;
    let values = validate::validate_many(&values)?;

    let count = req.state().store.records::<T>().insert_many(&values).await?;

    Ok(Response::created().json(&Count::from(count)))
}

async fn get<T>(req: Request, id: T::Id) -> Result
where
    T: KeyedRecord,
{
    match req.state().store.records::<T>().get(&id).await? {
        Some(value) => Ok(Response::ok().json(&value)),
        None => Err(StatusCodeError::not_found().into()),
    }
}

async fn update<T>(mut req: Request, id: T::Id) -> Result
where
    T: KeyedRecord,
{
    let value: T = req.json().await?;
    let value = prepare_update(&id, &value)?;

    let records = req.state().store.records::<T>();

    // The affected row count is 0 for rows written with identical values, so check first.
    if records.get(&id).await?.is_none() {
        return Err(StatusCodeError::not_found().into());
    }

    records.update(&value).await?;

    Ok(Response::ok().json(&value))
}

async fn delete<T>(req: Request, id: T::Id) -> Result
where
    T: KeyedRecord,
{
    let count = req.state().store.records::<T>().delete(&id).await?;
    if count == 0 {
        return Err(StatusCodeError::not_found().into());
    }

    log::debug!("Deleted {} {}", T::PATH, id);

    Ok(Response::ok().json(&Count::from(count)))
}

async fn list_for<T>(req: Request, parent: T::ParentId) -> Result
where
    T: Record,
{
    let values = req.state().store.records::<T>().list_for(&parent).await?;

    Ok(Response::ok().json(&values))
}

async fn replace_for<T>(mut req: Request, parent: T::ParentId) -> Result
where
    T: Record,
{
    let values: Vec<T> = req.json().await?;
    let values = prepare_replace(&parent, &values)?;

    let count = req
        .state()
        .store
        .records::<T>()
        .replace_for(&parent, &values)
        .await?;

    log::debug!("Replaced {} of {} {} with {} rows", T::PATH, T::PARENT, parent, count);

    Ok(Response::ok().json(&Count::from(count)))
}

/// Validates the body of a `PUT` to a single row. The body must carry the id from the path.
fn prepare_update<T>(id: &T::Id, value: &T) -> std::result::Result<T, Error>
where
    T: KeyedRecord,
{
    if value.id() != id {
        return Err(ValidationError::invalid("id").into());
    }

    Ok(validate::validate(value)?)
}

/// Validates the rows replacing all rows of `parent`. Every row must belong to `parent`.
fn prepare_replace<T>(parent: &T::ParentId, values: &[T]) -> std::result::Result<Vec<T>, Error>
where
    T: Record,
{
    let values = validate::validate_many(values)?;
    check_parent(parent, &values)?;

    Ok(values)
}

async fn delete_for<T>(req: Request, parent: T::ParentId) -> Result
where
    T: Record,
{
    let count = req.state().store.records::<T>().delete_for(&parent).await?;

    Ok(Response::ok().json(&Count::from(count)))
}
