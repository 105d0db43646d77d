//! Row mappings of all stored entities.

use bowling_tournament_api::id::{
    BowlId, BrktEntryId, BrktId, DivEntryId, DivId, ElimEntryId, ElimId, EventId, LaneId,
    OneBrktId, PlayerId, PotEntryId, PotId, SquadId, StageId, TmntId, UserId,
};
use bowling_tournament_api::v1::brkts::{Brkt, BrktSeed, OneBrkt};
use bowling_tournament_api::v1::divs::{Div, HdcpFor};
use bowling_tournament_api::v1::elims::Elim;
use bowling_tournament_api::v1::entries::{BrktEntry, DivEntry, ElimEntry, PotEntry};
use bowling_tournament_api::v1::events::Event;
use bowling_tournament_api::v1::lanes::Lane;
use bowling_tournament_api::v1::players::Player;
use bowling_tournament_api::v1::pots::{Pot, PotType};
use bowling_tournament_api::v1::squads::Squad;
use bowling_tournament_api::v1::stages::{Stage, StageKind};
use bowling_tournament_api::v1::tmnts::Tmnt;
use bowling_tournament_api::Money;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::error::BoxDynError;
use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Decode, Encode, Type};

use super::{get, MySqlQuery, Record};

/// Conversion between a field and the value stored in its column.
pub trait Column: Sized {
    type Sql: for<'q> Encode<'q, MySql> + for<'r> Decode<'r, MySql> + Type<MySql> + Send + 'static;

    fn to_sql(&self) -> Self::Sql;

    fn from_sql(value: Self::Sql) -> Result<Self, BoxDynError>;
}

macro_rules! plain {
    ($($t:ty),*$(,)?) => {
        $(
            impl Column for $t {
                type Sql = $t;

                #[inline]
                fn to_sql(&self) -> Self::Sql {
                    self.clone()
                }

                #[inline]
                fn from_sql(value: Self::Sql) -> Result<Self, BoxDynError> {
                    Ok(value)
                }
            }
        )*
    };
}

plain!(
    i32,
    f64,
    bool,
    String,
    NaiveDate,
    NaiveTime,
    DateTime<Utc>,
);

// Ids are stored as is. Their format is checked when they are written.
macro_rules! id {
    ($($t:ty),*$(,)?) => {
        $(
            impl Column for $t {
                type Sql = String;

                #[inline]
                fn to_sql(&self) -> Self::Sql {
                    self.to_string()
                }

                #[inline]
                fn from_sql(value: Self::Sql) -> Result<Self, BoxDynError> {
                    Ok(Self::from(value))
                }
            }
        )*
    };
}

id!(
    UserId,
    BowlId,
    TmntId,
    EventId,
    DivId,
    SquadId,
    LaneId,
    PlayerId,
    PotId,
    BrktId,
    OneBrktId,
    ElimId,
    DivEntryId,
    PotEntryId,
    BrktEntryId,
    ElimEntryId,
    StageId,
);

// Enums are stored as `TINYINT UNSIGNED`.
macro_rules! byte_enum {
    ($($t:ty),*$(,)?) => {
        $(
            impl Column for $t {
                type Sql = u8;

                #[inline]
                fn to_sql(&self) -> Self::Sql {
                    self.to_u8()
                }

                fn from_sql(value: Self::Sql) -> Result<Self, BoxDynError> {
                    <$t>::from_u8(value).ok_or_else(|| {
                        format!("invalid {} value: {}", stringify!($t), value).into()
                    })
                }
            }
        )*
    };
}

byte_enum!(HdcpFor, PotType, StageKind);

/// Money is stored as cents in a `BIGINT`.
impl Column for Money {
    type Sql = i64;

    #[inline]
    fn to_sql(&self) -> Self::Sql {
        self.cents()
    }

    fn from_sql(value: Self::Sql) -> Result<Self, BoxDynError> {
        if value < 0 {
            return Err(format!("negative amount: {}", value).into());
        }

        Ok(Self::from_cents(value))
    }
}

impl<T> Column for Option<T>
where
    T: Column,
{
    type Sql = Option<T::Sql>;

    fn to_sql(&self) -> Self::Sql {
        self.as_ref().map(T::to_sql)
    }

    fn from_sql(value: Self::Sql) -> Result<Self, BoxDynError> {
        value.map(T::from_sql).transpose()
    }
}

/// Implements [`Record`] by mapping every listed field to the column of the same name. The
/// first field is the key.
macro_rules! record {
    ($t:ty, $table:expr, order_by: $order_by:expr, [$key:ident $(, $field:ident)* $(,)?]) => {
        impl Record for $t {
            const TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &[stringify!($key) $(, stringify!($field))*];
            const ORDER_BY: &'static str = $order_by;

            fn bind<'q>(&self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
                query
                    .bind(Column::to_sql(&self.$key))
                    $(.bind(Column::to_sql(&self.$field)))*
            }

            fn bind_update<'q>(&self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
                query
                    $(.bind(Column::to_sql(&self.$field)))*
                    .bind(Column::to_sql(&self.$key))
            }

            fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
                Ok(Self {
                    $key: get(row, stringify!($key))?,
                    $($field: get(row, stringify!($field))?,)*
                })
            }
        }
    };
}

record!(Tmnt, "tmnts", order_by: "start_date DESC, tmnt_name", [
    id, user_id, bowl_id, tmnt_name, start_date, end_date,
]);

record!(Event, "events", order_by: "sort_order", [
    id, tmnt_id, event_name, team_size, games, entry_fee, lineage, prize_fund, other,
    expenses, added_money, sort_order,
]);

record!(Div, "divs", order_by: "sort_order", [
    id, tmnt_id, div_name, hdcp_per, hdcp_from, int_hdcp, hdcp_for, sort_order,
]);

record!(Squad, "squads", order_by: "sort_order", [
    id, event_id, squad_name, games, lane_count, starting_lane, squad_date, squad_time,
    sort_order,
]);

record!(Lane, "lanes", order_by: "lane_number", [id, squad_id, lane_number, in_use]);

record!(Player, "players", order_by: "lane, position", [
    id, squad_id, first_name, last_name, average, lane, position,
]);

record!(Pot, "pots", order_by: "sort_order", [id, squad_id, div_id, pot_type, fee, sort_order]);

record!(Brkt, "brkts", order_by: "sort_order", [
    id, squad_id, div_id, start, games, players, fee, first, second, admin, sort_order,
]);

record!(OneBrkt, "one_brkts", order_by: "bindex", [id, brkt_id, bindex]);

// Seeds are keyed by (one_brkt_id, seed) and never updated in place.
record!(BrktSeed, "brkt_seeds", order_by: "seed", [one_brkt_id, seed, player_id]);

record!(Elim, "elims", order_by: "sort_order", [
    id, squad_id, div_id, start, games, fee, sort_order,
]);

record!(DivEntry, "div_entries", order_by: "id", [id, squad_id, div_id, player_id, fee]);

record!(PotEntry, "pot_entries", order_by: "id", [id, pot_id, player_id, fee]);

record!(BrktEntry, "brkt_entries", order_by: "time_stamp, id", [
    id, brkt_id, player_id, num_brackets, num_refunds, fee, time_stamp,
]);

record!(ElimEntry, "elim_entries", order_by: "id", [id, elim_id, player_id, fee]);

record!(Stage, "stages", order_by: "id", [
    id, squad_id, stage, stage_set_at, scores_started_at, stage_override_enabled,
    stage_override_at, stage_override_reason,
]);
