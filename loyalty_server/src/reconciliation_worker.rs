use log::*;
use loyalty_engine::{AccrualClient, ReconciliationWorker, SqliteDatabase, WorkerConfig};
use tokio::{sync::broadcast, task::JoinHandle};

/// Starts the reconciliation worker on the tokio runtime.
///
/// The worker runs until a message is sent on (or every sender of) the `shutdown` channel is dropped. Await the
/// returned handle after signalling shutdown to wait for the worker to stop.
pub fn start_reconciliation_worker(
    db: SqliteDatabase,
    client: AccrualClient,
    config: WorkerConfig,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("🔁️ Sending pending orders to the accrual authority at {}", client.config().base_url);
        let worker = ReconciliationWorker::new(db, client, config);
        worker.run(shutdown).await;
    })
}
