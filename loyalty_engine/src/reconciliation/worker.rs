use std::{collections::HashSet, fmt::Display, time::Duration};

use log::*;
use loyalty_common::Points;
use tokio::sync::{broadcast, Mutex};

use crate::{
    accrual::{AccrualGateway, GatewayError, Verdict},
    db_types::{OrderNumber, OrderStatusType, PendingOrder},
    traits::{CreditOutcome, LedgerError, OrderCrediting, PendingOrders},
};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(2) }
    }
}

/// What happened to the pending orders during one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Orders that were pending at the start of the cycle.
    pub pending: usize,
    /// Orders that became `PROCESSED`, crediting the owner's balance.
    pub credited: usize,
    /// Orders that became `INVALID`.
    pub invalidated: usize,
    /// Orders that moved between the non-terminal statuses.
    pub updated: usize,
    /// Orders left alone because there was no usable verdict or nothing to change.
    pub skipped: usize,
    /// Orders that could not be resolved because the gateway or the database failed.
    pub failed: usize,
    /// Number of times the accrual authority told us to back off.
    pub throttled: usize,
}

impl CycleReport {
    pub fn changed(&self) -> usize {
        self.credited + self.invalidated + self.updated
    }
}

impl Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pending, {} credited, {} invalidated, {} updated, {} skipped, {} failed, {} throttled",
            self.pending, self.credited, self.invalidated, self.updated, self.skipped, self.failed, self.throttled
        )
    }
}

pub struct ReconciliationWorker<S, G> {
    store: S,
    gateway: G,
    config: WorkerConfig,
    stalled: StalledOrders,
}

impl<S, G> ReconciliationWorker<S, G>
where
    S: PendingOrders + OrderCrediting,
    G: AccrualGateway,
{
    pub fn new(store: S, gateway: G, config: WorkerConfig) -> Self {
        Self { store, gateway, config, stalled: StalledOrders::default() }
    }

    /// Polls until a shutdown signal arrives (or the sender is dropped).
    ///
    /// Both the cycle and the pause between cycles are raced against the shutdown signal. An interrupted cycle is
    /// dropped on the spot. Any transaction it had open rolls back, and the orders it had not finished with stay
    /// pending.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        info!("🔁️ Reconciliation worker started. Polling every {}ms", self.config.poll_interval.as_millis());
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                result = self.run_cycle() => match result {
                    Ok(report) if report.pending == 0 => trace!("🔁️ No orders awaiting a verdict"),
                    Ok(report) if report.changed() == 0 => debug!("🔁️ Reconciliation cycle complete. {report}"),
                    Ok(report) => info!("🔁️ Reconciliation cycle complete. {report}"),
                    Err(e) => error!("🔁️ Could not fetch the orders awaiting a verdict. {e}"),
                },
            }
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {},
            }
        }
        info!("🔁️ Reconciliation worker stopped");
    }

    /// Runs a single reconciliation pass over every pending order.
    ///
    /// Orders are processed one at a time, so there is at most one request to the accrual authority in flight. When the
    /// authority rate limits us, the whole pass pauses for the requested period and then moves on to the next order.
    /// The throttled order is picked up again on the next cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, LedgerError> {
        let pending = self.store.list_pending_orders().await?;
        let mut report = CycleReport { pending: pending.len(), ..Default::default() };
        self.stalled.retain_pending(&pending).await;
        for order in &pending {
            self.reconcile(order, &mut report).await;
        }
        Ok(report)
    }

    async fn reconcile(&self, order: &PendingOrder, report: &mut CycleReport) {
        let number = &order.number;
        let verdict = match self.gateway.fetch_verdict(number).await {
            Ok(verdict) => verdict,
            Err(GatewayError::RateLimited { retry_after }) => {
                report.throttled += 1;
                info!("🔁️ Pausing reconciliation for {}s. Order {number} will be retried", retry_after.as_secs());
                tokio::time::sleep(retry_after).await;
                return;
            },
            Err(GatewayError::NotReady) => {
                trace!("🔁️ No verdict for order {number} yet");
                report.skipped += 1;
                return;
            },
            Err(e) => {
                warn!("🔁️ Order {number} was not reconciled. {e}");
                report.failed += 1;
                return;
            },
        };
        let Verdict { status, accrual } = match usable_verdict(order, verdict) {
            Ok(verdict) => verdict,
            Err(Unusable::UnknownStatus) => {
                debug!("🔁️ The accrual authority reported a status for order {number} that we don't act on");
                report.skipped += 1;
                return;
            },
            Err(Unusable::Unchanged(status)) => {
                trace!("🔁️ Order {number} is still {status}");
                report.skipped += 1;
                return;
            },
            Err(Unusable::MissingAccrual(accrual)) => {
                if self.stalled.first_sighting(number).await {
                    warn!("🔁️ Order {number} is PROCESSED but the accrual is {accrual:?}. Will keep asking every cycle");
                } else {
                    debug!("🔁️ Order {number} is still PROCESSED with an accrual of {accrual:?}");
                }
                report.skipped += 1;
                return;
            },
        };
        match self.store.credit_order(number, order.user_id, status, accrual).await {
            Ok(CreditOutcome::Applied { status: OrderStatusType::Processed, credited }) => {
                info!("🔁️ Order {number} processed. {credited} points credited to user {}", order.user_id);
                report.credited += 1;
            },
            Ok(CreditOutcome::Applied { status: OrderStatusType::Invalid, .. }) => {
                info!("🔁️ Order {number} was rejected by the accrual authority");
                report.invalidated += 1;
            },
            Ok(CreditOutcome::Applied { status, .. }) => {
                debug!("🔁️ Order {number} is now {status}");
                report.updated += 1;
            },
            Ok(CreditOutcome::AlreadyFinal) => {
                debug!("🔁️ Order {number} was finalised elsewhere");
                report.skipped += 1;
            },
            Err(e) => {
                error!("🔁️ Could not apply verdict {status} to order {number}. {e}");
                report.failed += 1;
            },
        }
    }
}

/// Why a verdict was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unusable {
    UnknownStatus,
    /// `PROCESSED` without a positive accrual. Accruals under half a hundredth of a point round to zero and end up here.
    MissingAccrual(Option<Points>),
    Unchanged(OrderStatusType),
}

/// Decides whether a verdict should be written, and strips anything that should not be.
///
/// Unknown statuses and `PROCESSED` verdicts without a positive accrual are left for the next cycle. A verdict that
/// repeats the order's current status has nothing to write. Accruals attached to anything other than `PROCESSED` are
/// dropped.
fn usable_verdict(order: &PendingOrder, verdict: Verdict) -> Result<Verdict, Unusable> {
    match verdict.status {
        OrderStatusType::Undefined => Err(Unusable::UnknownStatus),
        OrderStatusType::Processed => match verdict.accrual {
            Some(accrual) if accrual.is_positive() => Ok(verdict),
            accrual => Err(Unusable::MissingAccrual(accrual)),
        },
        status if status == order.status => Err(Unusable::Unchanged(status)),
        status => Ok(Verdict::new(status, None)),
    }
}

/// Orders that keep coming back `PROCESSED` without a usable accrual. Each one is reported loudly once.
#[derive(Debug, Default)]
struct StalledOrders(Mutex<HashSet<OrderNumber>>);

impl StalledOrders {
    /// `true` the first time `number` is seen since it last left the pending list.
    async fn first_sighting(&self, number: &OrderNumber) -> bool {
        self.0.lock().await.insert(number.clone())
    }

    /// Forgets orders that are no longer pending.
    async fn retain_pending(&self, pending: &[PendingOrder]) {
        let mut stalled = self.0.lock().await;
        if !stalled.is_empty() {
            let pending = pending.iter().map(|o| &o.number).collect::<HashSet<_>>();
            stalled.retain(|n| pending.contains(n));
        }
    }
}
