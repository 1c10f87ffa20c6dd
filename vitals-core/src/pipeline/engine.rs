//! Telemetry ingestion pipeline
//!
//! Buffers incoming vital-sign records and drains them in bounded batches,
//! either on a fixed cadence or immediately when the buffer crosses the
//! high-water mark. Each drained batch is screened against the anomaly
//! rule set and anomalous subsets are delivered to registered observers.
//!
//! The pipeline holds everything in memory: the pending buffer is a live
//! stream, not a durable log, and its contents are lost on process exit.

use crate::pipeline::anomaly::evaluate_record;
use crate::pipeline::observer::AnomalyObserver;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;
use vitals_common::config::PipelineConfig;
use vitals_common::events::{DrainTrigger, EventBus, VitalsEvent};
use vitals_common::TelemetryRecord;

/// Buffering pipeline for streamed telemetry
///
/// Clone-able handle over shared state; all clones observe the same buffer,
/// observer list, and drain flag. Drains are mutually exclusive: a trigger
/// arriving while a drain is running is dropped, and the running drain
/// loops until the buffer is empty so nothing is left behind.
#[derive(Clone)]
pub struct IngestPipeline {
    config: Arc<PipelineConfig>,

    /// Pending records awaiting analysis, FIFO
    buffer: Arc<RwLock<VecDeque<TelemetryRecord>>>,

    /// Observers notified with each anomalous batch, in registration order
    observers: Arc<RwLock<Vec<Arc<dyn AnomalyObserver>>>>,

    /// Drain state: false = idle, true = draining
    draining: Arc<AtomicBool>,

    /// Optional diagnostics bus
    event_bus: Option<EventBus>,
}

impl IngestPipeline {
    /// Create a pipeline with the given tuning
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
            buffer: Arc::new(RwLock::new(VecDeque::new())),
            observers: Arc::new(RwLock::new(Vec::new())),
            draining: Arc::new(AtomicBool::new(false)),
            event_bus: None,
        }
    }

    /// Attach a bus for drain/anomaly diagnostic events
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Append a record to the pending buffer
    ///
    /// Always succeeds; the ingestion endpoint validates records before
    /// handing them over. When the buffer crosses the high-water mark and
    /// no drain is running, an immediate drain is started instead of
    /// waiting for the next scheduled tick.
    pub async fn ingest(&self, record: TelemetryRecord) {
        let len = {
            let mut buffer = self.buffer.write().await;
            buffer.push_back(record);
            buffer.len()
        };
        trace!("Ingested record, buffer length {}", len);

        if len > self.config.high_water_mark && !self.draining.load(Ordering::Acquire) {
            debug!(
                "Buffer length {} over high-water mark {}, triggering drain",
                len, self.config.high_water_mark
            );
            let pipeline = self.clone();
            tokio::spawn(async move {
                pipeline.drain(DrainTrigger::Backpressure).await;
            });
        }
    }

    /// Register an observer for anomalous batches
    ///
    /// Observers are invoked in registration order for every anomalous
    /// batch. There is no deregistration; registration lasts for the
    /// lifetime of the process.
    pub async fn on_anomaly_detected(&self, observer: Arc<dyn AnomalyObserver>) {
        let mut observers = self.observers.write().await;
        observers.push(observer);
        debug!("Registered anomaly observer ({} total)", observers.len());
    }

    /// Current pending buffer length
    pub async fn buffer_len(&self) -> usize {
        self.buffer.read().await.len()
    }

    /// Number of registered observers
    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Whether a drain cycle is currently running
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Spawn the scheduled drain loop on the current tokio runtime
    ///
    /// Fires every `drain_interval_ms` regardless of ingest activity so
    /// low-traffic buffers still get flushed. Returns a shutdown flag; set
    /// it to true to stop the loop after its next tick.
    pub fn spawn_drain_task(&self) -> Arc<AtomicBool> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let pipeline = self.clone();
        let period = std::time::Duration::from_millis(self.config.drain_interval_ms);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Consume the immediate first tick so the first drain happens
            // one full period after startup
            interval.tick().await;

            debug!("Scheduled drain task started ({}ms cadence)", period.as_millis());
            loop {
                interval.tick().await;
                if shutdown_flag.load(Ordering::Relaxed) {
                    break;
                }
                pipeline.drain(DrainTrigger::Scheduled).await;
            }
            info!("Scheduled drain task stopped");
        });

        shutdown
    }

    /// Run one drain cycle
    ///
    /// No-op when the buffer is empty or a drain is already running (the
    /// running drain loops until the buffer is empty, so a dropped trigger
    /// loses nothing). Removes up to `batch_size` records at a time from
    /// the buffer head and analyzes each chunk as an independent batch;
    /// records appended mid-drain are picked up in the same cycle. The
    /// pipeline always returns to idle, whatever happens inside a batch.
    pub async fn drain(&self, trigger: DrainTrigger) {
        let buffer_len = self.buffer.read().await.len();
        if buffer_len == 0 {
            return;
        }

        // Idle -> Draining; lose the race and the drain already underway
        // will consume our records
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("Drain already in progress, dropping {:?} trigger", trigger);
            return;
        }

        let drain_id = Uuid::new_v4();
        debug!(
            "Drain {} started ({:?}, {} records pending)",
            drain_id, trigger, buffer_len
        );
        self.emit(VitalsEvent::DrainStarted {
            drain_id,
            buffer_len,
            trigger,
            timestamp: Utc::now(),
        });

        let mut batches = 0usize;
        let mut records = 0usize;
        let mut anomalies = 0usize;

        loop {
            let batch: Vec<TelemetryRecord> = {
                let mut buffer = self.buffer.write().await;
                let take = self.config.batch_size.min(buffer.len());
                buffer.drain(..take).collect()
            };
            if batch.is_empty() {
                break;
            }

            batches += 1;
            records += batch.len();
            anomalies += self.process_batch(drain_id, batch).await;
        }

        self.emit(VitalsEvent::DrainCompleted {
            drain_id,
            batches,
            records,
            anomalies,
            timestamp: Utc::now(),
        });
        debug!(
            "Drain {} completed: {} batches, {} records, {} anomalies",
            drain_id, batches, records, anomalies
        );

        // Draining -> Idle, unconditionally
        self.draining.store(false, Ordering::Release);
    }

    /// Analyze one batch and notify observers of its anomalous subset
    ///
    /// Returns the number of records flagged anomalous.
    async fn process_batch(&self, drain_id: Uuid, batch: Vec<TelemetryRecord>) -> usize {
        let batch_size = batch.len();
        let mut anomalous = Vec::new();

        for record in batch {
            if let Some(kind) = evaluate_record(&record, &self.config.thresholds) {
                debug!("Record for user {} flagged: {:?}", record.user_id, kind);
                anomalous.push(record);
            }
        }

        if anomalous.is_empty() {
            trace!("Batch of {} records contained no anomalies", batch_size);
            return 0;
        }

        let anomaly_count = anomalous.len();
        info!(
            "Batch of {} records contained {} anomalies, notifying observers",
            batch_size, anomaly_count
        );
        self.emit(VitalsEvent::AnomalyBatch {
            drain_id,
            batch_size,
            anomaly_count,
            timestamp: Utc::now(),
        });

        self.notify_observers(anomalous).await;
        anomaly_count
    }

    /// Deliver one anomalous batch to every registered observer
    ///
    /// Each observer runs in its own spawned task; the handles are awaited
    /// in registration order so delivery order is deterministic. An
    /// observer returning an error, or panicking, is logged and never
    /// affects the other observers or the drain itself.
    async fn notify_observers(&self, anomalous: Vec<TelemetryRecord>) {
        let observers: Vec<Arc<dyn AnomalyObserver>> =
            self.observers.read().await.iter().cloned().collect();
        if observers.is_empty() {
            return;
        }

        let handles: Vec<_> = observers
            .iter()
            .map(|observer| {
                let observer = Arc::clone(observer);
                let batch = anomalous.clone();
                tokio::spawn(async move { observer.on_anomalies(batch).await })
            })
            .collect();

        for (observer, handle) in observers.iter().zip(handles) {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Anomaly observer '{}' failed: {:#}", observer.name(), e);
                }
                Err(e) => {
                    warn!("Anomaly observer '{}' panicked: {}", observer.name(), e);
                }
            }
        }
    }

    fn emit(&self, event: VitalsEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }
}
