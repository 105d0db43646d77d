use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolOptions;
use sqlx::MySqlPool;

use crate::config::Config;
use crate::signal::Shutdown;
use crate::store::Store;
use crate::Error;

#[cfg(feature = "metrics")]
use crate::metrics::Metrics;

#[derive(Clone, Debug)]
pub struct State(Arc<StateInner>);

impl State {
    /// Creates the shared state. The database pool connects lazily on first use.
    pub fn new(config: Config) -> Result<Self, Error> {
        let pool: MySqlPool = PoolOptions::new()
            .min_connections(0)
            .max_connections(8)
            .max_lifetime(Duration::new(3600, 0))
            .idle_timeout(Duration::new(60, 0))
            .connect_lazy(&config.database.connect_string())?;

        let store = Store {
            pool,
            table_prefix: config.database.prefix.clone(),
        };

        Ok(Self(Arc::new(StateInner {
            store,
            config,
            shutdown: Shutdown::new(),

            #[cfg(feature = "metrics")]
            metrics: Metrics::default(),
        })))
    }
}

impl Deref for State {
    type Target = StateInner;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub struct StateInner {
    pub store: Store,
    pub config: Config,
    pub shutdown: Shutdown,

    #[cfg(feature = "metrics")]
    pub metrics: Metrics,
}
