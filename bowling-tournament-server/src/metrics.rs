use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyper::StatusCode;

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub http_requests_total: Counter,
    pub http_responses_4xx_total: Counter,
    pub http_responses_5xx_total: Counter,

    pub http_connections_total: Counter,
    pub http_connections_current: Gauge,
}

macro_rules! impl_serialize {
    ($this:expr, $($metric:ident),*$(,)?) => {
        let mut capacity = 0;

        $(
            let $metric = $this.$metric.0.load(Ordering::Relaxed);

            // Two extra bytes for space and '\n'.
            capacity += stringify!($metric).len() + 2;

            capacity += ((($metric as f32).log10().floor() + 1.0) as usize).max(1);
        )*

        let mut buf = Vec::with_capacity(capacity);

        $(
            let _ = writeln!(buf, "{} {}", stringify!($metric), $metric);
        )*

        buf
    };
}

impl Metrics {
    pub fn serialize(&self) -> Vec<u8> {
        impl_serialize! {
            self,
            http_requests_total,
            http_responses_4xx_total,
            http_responses_5xx_total,
            http_connections_total,
            http_connections_current,
        }
    }

    /// Counts a finished response by its status class.
    pub fn record_status(&self, status: StatusCode) {
        if status.is_client_error() {
            self.http_responses_4xx_total.inc();
        } else if status.is_server_error() {
            self.http_responses_5xx_total.inc();
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Gauge(Arc<AtomicUsize>);

impl Gauge {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}
