use crate::bootstrap::{SharedCatalogSource, SharedMarketData};
use std::sync::Arc;
use tracker_application::catalog::load_catalog_or_fallback;
use tracker_application::config::CatalogConfig;
use tracker_application::dashboard::{
    load_dashboard, DashboardOptions, DashboardRequest, DashboardSnapshot,
};
use tracker_domain::services::catalog::TickerCatalog;
use tracker_domain::value_objects::warning::DashboardWarning;

pub enum TaskEvent {
    Input(crossterm::event::Event),
    CatalogLoaded {
        catalog: TickerCatalog,
        warning: Option<DashboardWarning>,
    },
    SnapshotReady(Box<DashboardSnapshot>),
}

/// Runs blocking provider work off the async reactor and reports back over the event channel.
#[derive(Clone)]
pub struct TaskRunner {
    inner: Arc<TaskRunnerInner>,
}

struct TaskRunnerInner {
    tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
    market_data: SharedMarketData,
    catalog_source: SharedCatalogSource,
    catalog_config: CatalogConfig,
    options: DashboardOptions,
}

impl TaskRunner {
    pub fn new(
        tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
        market_data: SharedMarketData,
        catalog_source: SharedCatalogSource,
        catalog_config: CatalogConfig,
        options: DashboardOptions,
    ) -> Self {
        Self {
            inner: Arc::new(TaskRunnerInner {
                tx,
                market_data,
                catalog_source,
                catalog_config,
                options,
            }),
        }
    }

    pub fn load_catalog(&self) {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let (catalog, warning) =
                load_catalog_or_fallback(inner.catalog_source.as_ref(), &inner.catalog_config);
            let _ = inner.tx.send(TaskEvent::CatalogLoaded { catalog, warning });
        });
    }

    /// The caller keeps at most one of these in flight.
    pub fn load_dashboard(&self, request: DashboardRequest) {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let snapshot = load_dashboard(inner.market_data.as_ref(), &request, inner.options);
            let _ = inner.tx.send(TaskEvent::SnapshotReady(Box::new(snapshot)));
        });
    }
}
