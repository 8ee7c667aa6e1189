use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use cucumber::World;
use log::*;
use loyalty_engine::{
    db_types::{OrderNumber, Withdrawal},
    traits::WithdrawalError,
    AccrualGateway,
    BalanceApi,
    CycleReport,
    GatewayError,
    OrderApi,
    OrderApiError,
    RegisterOrderResult,
    SqliteDatabase,
    Verdict,
};

use crate::support::prepare_env::{create_database, random_db_path, run_migrations};

#[derive(Default, Debug, World)]
pub struct LedgerWorld {
    pub system: Option<LedgerSystem>,
    pub last_registration: Option<Result<RegisterOrderResult, OrderApiError>>,
    pub last_withdrawal: Option<Result<Withdrawal, WithdrawalError>>,
    pub last_report: Option<CycleReport>,
}

impl LedgerWorld {
    pub fn system(&self) -> &LedgerSystem {
        self.system.as_ref().expect("Ledger system not initialised")
    }
}

#[derive(Debug)]
pub struct LedgerSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderApi<SqliteDatabase>,
    pub balances: BalanceApi<SqliteDatabase>,
    pub authority: ScriptedAuthority,
}

impl LedgerSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        create_database(&url).await;
        run_migrations(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        Self {
            db_path: url,
            orders: OrderApi::new(db.clone()),
            balances: BalanceApi::new(db.clone()),
            db,
            authority: ScriptedAuthority::default(),
        }
    }
}

/// An accrual authority whose answers are set by the scenario. Orders without a scripted answer are not ready.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAuthority {
    verdicts: Arc<Mutex<HashMap<OrderNumber, Result<Verdict, GatewayError>>>>,
}

impl ScriptedAuthority {
    pub fn script(&self, number: &str, answer: Result<Verdict, GatewayError>) {
        self.verdicts.lock().unwrap().insert(number.into(), answer);
    }
}

impl AccrualGateway for ScriptedAuthority {
    async fn fetch_verdict(&self, order_number: &OrderNumber) -> Result<Verdict, GatewayError> {
        self.verdicts.lock().unwrap().get(order_number).cloned().unwrap_or(Err(GatewayError::NotReady))
    }
}
