mod records;
mod schema;
mod sql;

use std::marker::PhantomData;

use bowling_tournament_api::id::{SquadId, TmntId};
use bowling_tournament_api::v1::brkts::Brkt;
use bowling_tournament_api::v1::divs::Div;
use bowling_tournament_api::v1::elims::Elim;
use bowling_tournament_api::v1::events::Event;
use bowling_tournament_api::v1::lanes::Lane;
use bowling_tournament_api::v1::pots::Pot;
use bowling_tournament_api::v1::resource::{Keyed, Resource};
use bowling_tournament_api::v1::squads::Squad;
use bowling_tournament_api::v1::stages::Stage;
use bowling_tournament_api::v1::tmnts::{Tmnt, TmntFull, TmntOverview};
use bowling_tournament_api::{validate, Identifier};
use futures::TryStreamExt;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Row, Transaction};

use crate::Error;

pub use records::Column;

/// A prepared statement with its bound values.
pub type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

#[derive(Clone, Debug)]
pub struct Store {
    pub pool: MySqlPool,
    pub table_prefix: String,
}

impl Store {
    /// Creates all missing tables.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if an database error occured.
    pub async fn init(&self) -> Result<(), Error> {
        for stmt in schema::statements(&self.table_prefix) {
            sqlx::query(&stmt).execute(&self.pool).await?;
        }

        Ok(())
    }

    #[inline]
    pub fn records<T>(&self) -> Records<'_, T>
    where
        T: Record,
    {
        Records {
            store: self,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn tmnts(&self) -> TmntsClient<'_> {
        TmntsClient { store: self }
    }

    #[inline]
    pub fn stages(&self) -> StagesClient<'_> {
        StagesClient { store: self }
    }
}

/// A [`Resource`] stored in its own table.
pub trait Record: Resource {
    /// The table name without the prefix.
    const TABLE: &'static str;
    /// All columns, the key column first.
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;

    /// Binds all columns in the order of [`Record::COLUMNS`].
    fn bind<'q>(&self, query: MySqlQuery<'q>) -> MySqlQuery<'q>;

    /// Binds all columns except the key, followed by the key.
    fn bind_update<'q>(&self, query: MySqlQuery<'q>) -> MySqlQuery<'q>;

    fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error>;
}

/// A [`Record`] with an `id` key column.
pub trait KeyedRecord: Record + Keyed {}

impl<T> KeyedRecord for T where T: Record + Keyed {}

/// Reads the column `name` from `row`.
pub fn get<C>(row: &MySqlRow, name: &str) -> Result<C, sqlx::Error>
where
    C: Column,
{
    let value = row.try_get::<C::Sql, _>(name)?;

    C::from_sql(value).map_err(|source| sqlx::Error::ColumnDecode {
        index: name.to_owned(),
        source,
    })
}

macro_rules! get_one {
    ($query:expr) => {
        match $query {
            Ok(v) => v,
            Err(sqlx::Error::RowNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    };
}

/// Typed access to the table of `T`.
#[derive(Debug)]
pub struct Records<'a, T> {
    store: &'a Store,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> Records<'a, T>
where
    T: Record,
{
    fn select(&self, condition: &str) -> String {
        sql::select(
            &self.store.table_prefix,
            T::TABLE,
            T::COLUMNS,
            condition,
            T::ORDER_BY,
        )
    }

    /// Returns all rows matching `condition`, which must contain exactly one placeholder
    /// that is bound to `value`.
    pub async fn list_where(&self, condition: &str, value: &str) -> Result<Vec<T>, Error> {
        let sql = self.select(condition);

        let mut rows = sqlx::query(&sql).bind(value).fetch(&self.store.pool);

        let mut values = Vec::new();
        while let Some(row) = rows.try_next().await? {
            values.push(T::from_row(&row)?);
        }

        Ok(values)
    }

    /// Returns all rows belonging to `parent`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if an database error occured.
    pub async fn list_for(&self, parent: &T::ParentId) -> Result<Vec<T>, Error> {
        let condition = format!("{} = ?", T::PARENT_FIELD);

        self.list_where(&condition, parent.as_str()).await
    }

    pub async fn insert(&self, value: &T) -> Result<(), Error> {
        let sql = sql::insert(&self.store.table_prefix, T::TABLE, T::COLUMNS, 1);

        value.bind(sqlx::query(&sql)).execute(&self.store.pool).await?;

        Ok(())
    }

    /// Inserts all `values` in a single transaction and returns the number of inserted rows.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if an database error occured. No rows are inserted in that
    /// case.
    pub async fn insert_many(&self, values: &[T]) -> Result<u64, Error> {
        let mut tx = self.store.pool.begin().await?;

        let count = insert_rows(&mut tx, &self.store.table_prefix, values).await?;

        tx.commit().await?;
        Ok(count)
    }

    /// Deletes all rows belonging to `parent` and returns the number of deleted rows.
    pub async fn delete_for(&self, parent: &T::ParentId) -> Result<u64, Error> {
        let sql = sql::delete(&self.store.table_prefix, T::TABLE, T::PARENT_FIELD);

        let res = sqlx::query(&sql)
            .bind(parent.as_str())
            .execute(&self.store.pool)
            .await?;

        Ok(res.rows_affected())
    }

    /// Replaces all rows belonging to `parent` with `values`. Either all rows are replaced
    /// or none.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if an database error occured.
    pub async fn replace_for(&self, parent: &T::ParentId, values: &[T]) -> Result<u64, Error> {
        let mut tx = self.store.pool.begin().await?;

        let sql = sql::delete(&self.store.table_prefix, T::TABLE, T::PARENT_FIELD);
        sqlx::query(&sql)
            .bind(parent.as_str())
            .execute(&mut tx)
            .await?;

        let count = insert_rows(&mut tx, &self.store.table_prefix, values).await?;

        tx.commit().await?;
        Ok(count)
    }
}

impl<'a, T> Records<'a, T>
where
    T: KeyedRecord,
{
    /// Returns the row with the given `id`. Returns `None` if no such row exists.
    pub async fn get(&self, id: &T::Id) -> Result<Option<T>, Error> {
        let sql = self.select("id = ?");

        let row = get_one!(
            sqlx::query(&sql)
                .bind(id.as_str())
                .fetch_one(&self.store.pool)
                .await
        );

        Ok(Some(T::from_row(&row)?))
    }

    /// Overwrites the row with the id of `value`.
    pub async fn update(&self, value: &T) -> Result<u64, Error> {
        let sql = sql::update(&self.store.table_prefix, T::TABLE, T::COLUMNS);

        let res = value
            .bind_update(sqlx::query(&sql))
            .execute(&self.store.pool)
            .await?;

        Ok(res.rows_affected())
    }

    pub async fn delete(&self, id: &T::Id) -> Result<u64, Error> {
        let sql = sql::delete(&self.store.table_prefix, T::TABLE, "id");

        let res = sqlx::query(&sql)
            .bind(id.as_str())
            .execute(&self.store.pool)
            .await?;

        Ok(res.rows_affected())
    }
}

async fn insert_rows<T>(
    tx: &mut Transaction<'_, MySql>,
    prefix: &str,
    values: &[T],
) -> Result<u64, Error>
where
    T: Record,
{
    let mut count = 0;

    for chunk in values.chunks(sql::rows_per_insert(T::COLUMNS.len())) {
        let sql = sql::insert(prefix, T::TABLE, T::COLUMNS, chunk.len());

        let mut query = sqlx::query(&sql);
        for value in chunk {
            query = value.bind(query);
        }

        count += query.execute(&mut *tx).await?.rows_affected();
    }

    Ok(count)
}

#[derive(Copy, Clone, Debug)]
pub struct TmntsClient<'a> {
    store: &'a Store,
}

impl<'a> TmntsClient<'a> {
    /// Returns a list of all [`TmntOverview`]s, latest first.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if an database error occured.
    pub async fn list(&self) -> Result<Vec<TmntOverview>, Error> {
        let sql = sql::select(
            &self.store.table_prefix,
            Tmnt::TABLE,
            &["id", "tmnt_name", "bowl_id", "start_date", "end_date"],
            "TRUE",
            Tmnt::ORDER_BY,
        );

        let mut rows = sqlx::query(&sql).fetch(&self.store.pool);

        let mut tmnts = Vec::new();
        while let Some(row) = rows.try_next().await? {
            tmnts.push(TmntOverview {
                id: get(&row, "id")?,
                tmnt_name: get(&row, "tmnt_name")?,
                bowl_id: get(&row, "bowl_id")?,
                start_date: get(&row, "start_date")?,
                end_date: get(&row, "end_date")?,
            });
        }

        Ok(tmnts)
    }

    /// Returns the [`Tmnt`] with the given `id` together with all rows defining it. Returns
    /// `None` if no tournament with the given `id` exists.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if an database error occured.
    pub async fn full(&self, id: &TmntId) -> Result<Option<TmntFull>, Error> {
        let tmnt = match self.store.records::<Tmnt>().get(id).await? {
            Some(tmnt) => tmnt,
            None => return Ok(None),
        };

        let prefix = &self.store.table_prefix;
        let squads_of_tmnt = sql::squads_of_tmnt(prefix);
        let squad_children = sql::squad_children_of_tmnt(prefix);

        let (events, divs, squads, lanes, pots, brkts, elims, stages) = (
            self.store.records::<Event>(),
            self.store.records::<Div>(),
            self.store.records::<Squad>(),
            self.store.records::<Lane>(),
            self.store.records::<Pot>(),
            self.store.records::<Brkt>(),
            self.store.records::<Elim>(),
            self.store.records::<Stage>(),
        );

        let (events, divs, squads, lanes, pots, brkts, elims, stages) = futures::try_join!(
            events.list_for(id),
            divs.list_for(id),
            squads.list_where(&squads_of_tmnt, id.as_str()),
            lanes.list_where(&squad_children, id.as_str()),
            pots.list_where(&squad_children, id.as_str()),
            brkts.list_where(&squad_children, id.as_str()),
            elims.list_where(&squad_children, id.as_str()),
            stages.list_where(&squad_children, id.as_str()),
        )?;

        Ok(Some(TmntFull {
            tmnt,
            events,
            divs,
            squads,
            lanes,
            pots,
            brkts,
            elims,
            stages,
        }))
    }
}

#[derive(Copy, Clone, Debug)]
pub struct StagesClient<'a> {
    store: &'a Store,
}

impl<'a> StagesClient<'a> {
    /// Returns the [`Stage`] of the given `squad`.
    pub async fn get_for_squad(&self, squad: &SquadId) -> Result<Option<Stage>, Error> {
        let stages = self.store.records::<Stage>().list_for(squad).await?;

        Ok(stages.into_iter().next())
    }

    /// Locks the [`Stage`] of `squad`, applies `f` to it and stores the result. Nothing is
    /// written if `f` fails or the result is invalid. Returns `None` if the squad has no
    /// stage.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, a validation error or an [`enum@Error`] if an database
    /// error occured.
    pub async fn modify<F>(&self, squad: &SquadId, f: F) -> Result<Option<Stage>, Error>
    where
        F: FnOnce(&mut Stage) -> Result<(), Error> + Send,
    {
        let prefix = &self.store.table_prefix;

        let mut tx = self.store.pool.begin().await?;

        let sql = format!(
            "{} FOR UPDATE",
            sql::select(
                prefix,
                Stage::TABLE,
                Stage::COLUMNS,
                "squad_id = ?",
                Stage::ORDER_BY
            )
        );

        let row = match sqlx::query(&sql)
            .bind(squad.as_str())
            .fetch_optional(&mut tx)
            .await?
        {
            Some(row) => row,
            None => return Ok(None),
        };

        let mut stage = Stage::from_row(&row)?;
        f(&mut stage)?;
        let stage = validate::validate(&stage)?;

        let sql = sql::update(prefix, Stage::TABLE, Stage::COLUMNS);
        stage.bind_update(sqlx::query(&sql)).execute(&mut tx).await?;

        tx.commit().await?;
        Ok(Some(stage))
    }
}
