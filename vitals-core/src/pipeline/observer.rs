//! Anomaly observer registration types
//!
//! Observers are handed every anomalous batch the drain produces. Each
//! observer runs in its own spawned task so one failing (or panicking)
//! observer never prevents the others from being notified.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use vitals_common::TelemetryRecord;

/// Callback invoked with each batch of anomalous records
///
/// Registration is for the lifetime of the process; there is no
/// deregistration. Returned errors are logged by the pipeline and never
/// propagated.
pub trait AnomalyObserver: Send + Sync {
    /// Human-readable name used in log lines
    fn name(&self) -> &str {
        "observer"
    }

    /// Handle one batch of anomalous records
    fn on_anomalies(&self, batch: Vec<TelemetryRecord>) -> BoxFuture<'static, anyhow::Result<()>>;
}

struct FnObserver<F> {
    callback: F,
}

impl<F, Fut> AnomalyObserver for FnObserver<F>
where
    F: Fn(Vec<TelemetryRecord>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn on_anomalies(&self, batch: Vec<TelemetryRecord>) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin((self.callback)(batch))
    }
}

/// Wrap an async closure as an [`AnomalyObserver`]
///
/// ```
/// use vitals_core::pipeline::observer_fn;
///
/// let observer = observer_fn(|batch| async move {
///     println!("{} anomalous records", batch.len());
///     Ok(())
/// });
/// ```
pub fn observer_fn<F, Fut>(callback: F) -> Arc<dyn AnomalyObserver>
where
    F: Fn(Vec<TelemetryRecord>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnObserver { callback })
}
