use std::sync::Arc;

use minitwit_db::Database;

use crate::latest::LatestCursor;
use crate::metrics::Metrics;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Expected value of the `Authorization` header on simulator endpoints.
    pub sim_secret: String,
    pub latest: LatestCursor,
    pub metrics: Metrics,
}

impl AppStateInner {
    pub fn new(db: Database, sim_secret: impl Into<String>) -> prometheus::Result<AppState> {
        Ok(Arc::new(Self {
            db,
            sim_secret: sim_secret.into(),
            latest: LatestCursor::default(),
            metrics: Metrics::new()?,
        }))
    }
}
