//! The operations shared by all collections.
//!
//! Every collection lives under `/v1/{path}` and belongs to a parent row, e.g. divisions
//! belong to a tournament and are listed under `/v1/divs/tmnt/{tmnt_id}`. Child collections
//! are usually edited as a whole: [`ResourceClient::replace_for`] swaps all rows of a parent
//! for a new validated set in one request.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::id::Identifier;
use crate::validate::{self, Validate, ValidationError};
use crate::{Client, Count, Result};

/// A collection exposed by the API.
pub trait Resource: Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static {
    /// The collection segment, e.g. `divs`.
    const PATH: &'static str;
    /// The parent segment used by the by-parent operations, e.g. `tmnt`.
    const PARENT: &'static str;
    /// The field holding the parent id, e.g. `tmnt_id`.
    const PARENT_FIELD: &'static str;

    type ParentId: Identifier;

    fn parent_id(&self) -> &Self::ParentId;
}

/// A [`Resource`] whose rows have their own id.
pub trait Keyed: Resource {
    type Id: Identifier;

    fn id(&self) -> &Self::Id;
}

/// `/v1/{path}`
pub fn collection_uri<T>() -> String
where
    T: Resource,
{
    format!("/v1/{}", T::PATH)
}

/// `/v1/{path}/{id}`
pub fn item_uri<T>(id: &T::Id) -> String
where
    T: Keyed,
{
    format!("/v1/{}/{}", T::PATH, id)
}

/// `/v1/{path}/{parent}/{parent_id}`
pub fn parent_uri<T>(parent: &T::ParentId) -> String
where
    T: Resource,
{
    format!("/v1/{}/{}/{}", T::PATH, T::PARENT, parent)
}

/// Checks that all `values` belong to `parent`.
pub fn check_parent<T>(parent: &T::ParentId, values: &[T]) -> validate::Result
where
    T: Resource,
{
    for (index, value) in values.iter().enumerate() {
        if value.parent_id() != parent {
            return Err(ValidationError::invalid(T::PARENT_FIELD).at(index));
        }
    }

    Ok(())
}

fn check_id<I>(field: &'static str, id: &I) -> validate::Result
where
    I: Identifier,
{
    validate::valid_fk(field, id)
}

#[derive(Debug)]
pub struct ResourceClient<'a, T> {
    client: &'a Client,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> Clone for ResourceClient<'a, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> ResourceClient<'a, T>
where
    T: Resource,
{
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    /// Returns all rows belonging to `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not a valid id or the request fails.
    pub async fn list_for(&self, parent: &T::ParentId) -> Result<Vec<T>> {
        check_id(T::PARENT_FIELD, parent)?;

        let req = self.client.request().uri(&parent_uri::<T>(parent)).build();

        self.client.send(req).await?.json().await
    }

    /// Creates all `values` at once and returns the number of created rows. Nothing is
    /// created if any value is invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the request fails.
    pub async fn create_many(&self, values: &[T]) -> Result<u64> {
        let values = validate::validate_many(values)?;
        if values.is_empty() {
            return Ok(0);
        }

        let req = self
            .client
            .request()
            .post()
            .uri(&format!("{}/many", collection_uri::<T>()))
            .body(&values)?
            .build();

        let count: Count = self.client.send(req).await?.json().await?;
        Ok(count.count)
    }

    /// Deletes all rows belonging to `parent` and returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not a valid id or the request fails.
    pub async fn delete_for(&self, parent: &T::ParentId) -> Result<u64> {
        check_id(T::PARENT_FIELD, parent)?;

        let req = self
            .client
            .request()
            .delete()
            .uri(&parent_uri::<T>(parent))
            .build();

        let count: Count = self.client.send(req).await?.json().await?;
        Ok(count.count)
    }

    /// Replaces all rows belonging to `parent` with `values`. The rows are validated
    /// before anything is sent; the server deletes and reinserts within a single
    /// transaction. Returns the number of inserted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, any value belongs to another parent or the
    /// request fails.
    pub async fn replace_for(&self, parent: &T::ParentId, values: &[T]) -> Result<u64> {
        check_id(T::PARENT_FIELD, parent)?;

        let values = validate::validate_many(values)?;
        check_parent(parent, &values)?;

        let req = self
            .client
            .request()
            .put()
            .uri(&parent_uri::<T>(parent))
            .body(&values)?
            .build();

        let count: Count = self.client.send(req).await?.json().await?;
        Ok(count.count)
    }
}

impl<'a, T> ResourceClient<'a, T>
where
    T: Keyed,
{
    /// Returns the row with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    ///
    /// [`Error::NotFound`]: crate::Error::NotFound
    pub async fn get(&self, id: &T::Id) -> Result<T> {
        check_id("id", id)?;

        let req = self.client.request().uri(&item_uri::<T>(id)).build();

        self.client.send(req).await?.json().await
    }

    /// Creates a new row and returns it as stored by the server.
    pub async fn create(&self, value: &T) -> Result<T> {
        let value = validate::validate(value)?;

        let req = self
            .client
            .request()
            .post()
            .uri(&collection_uri::<T>())
            .body(&value)?
            .build();

        self.client.send(req).await?.json().await
    }

    /// Overwrites the row with the id of `value`.
    pub async fn update(&self, value: &T) -> Result<T> {
        let value = validate::validate(value)?;

        let req = self
            .client
            .request()
            .put()
            .uri(&item_uri::<T>(value.id()))
            .body(&value)?
            .build();

        self.client.send(req).await?.json().await
    }

    /// Deletes the row with the given `id`. Rows depending on it are deleted with it.
    pub async fn delete(&self, id: &T::Id) -> Result<u64> {
        check_id("id", id)?;

        let req = self
            .client
            .request()
            .delete()
            .uri(&item_uri::<T>(id))
            .build();

        let count: Count = self.client.send(req).await?.json().await?;
        Ok(count.count)
    }
}
