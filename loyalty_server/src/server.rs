use std::{future::Future, time::Duration};

use actix_web::{
    dev::{Server, ServerHandle},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use log::*;
use loyalty_engine::{AccrualClient, BalanceApi, OrderApi, SqliteDatabase};
use tokio::{sync::broadcast, task::JoinHandle};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    reconciliation_worker::start_reconciliation_worker,
    routes::{health, json_config, MyBalanceRoute, MyOrdersRoute, MyWithdrawalsRoute, RegisterOrderRoute, WithdrawRoute},
};

/// Runs the HTTP server and the reconciliation worker until the process receives SIGINT or SIGTERM.
///
/// The signal reaches the worker and the HTTP server at the same time. The worker abandons whatever it is doing, and
/// the server drains its open connections. Both are given `shutdown_timeout`, after which the database is closed.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate database. {e}")))?;
    let client = AccrualClient::new(config.accrual_config())
        .map_err(|e| ServerError::ConfigurationError(format!("Could not create the accrual client. {e}")))?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let worker = start_reconciliation_worker(db.clone(), client, config.worker_config(), shutdown_rx);
    let shutdown_timeout = config.shutdown_timeout;
    let srv = create_server_instance(config, db.clone())?;
    let signals = tokio::spawn(stop_when(shutdown_signal(), srv.handle(), shutdown_tx.clone()));
    let result = serve_until_stopped(srv, worker, shutdown_tx, shutdown_timeout).await;
    signals.abort();
    db.close().await;
    result
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderApi::new(db.clone());
        let balance_api = BalanceApi::new(db.clone());
        let user_scope = web::scope("/api/user")
            .service(RegisterOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new())
            .service(WithdrawRoute::<SqliteDatabase>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lps::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(balance_api))
            .service(health)
            .service(user_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .disable_signals()
    .shutdown_timeout(config.shutdown_timeout.as_secs())
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Waits for `signal`, then tells the reconciliation worker and the HTTP server to stop.
///
/// The worker is told first, so it never waits on the HTTP server's connection drain.
pub async fn stop_when<F>(signal: F, server: ServerHandle, shutdown_tx: broadcast::Sender<()>)
where F: Future<Output = ()> {
    signal.await;
    info!("🚀️ Shutdown requested. Stopping the reconciliation worker and the HTTP server");
    let _ = shutdown_tx.send(());
    server.stop(true).await;
}

/// Drives the HTTP server to completion, then makes sure the reconciliation worker has stopped too.
///
/// The worker gets at most `shutdown_timeout` once the server has stopped. It is left to die with the runtime if it
/// does not make it.
pub async fn serve_until_stopped(
    srv: Server,
    worker: JoinHandle<()>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_timeout: Duration,
) -> Result<(), ServerError> {
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    debug!("🚀️ HTTP server has stopped");
    let _ = shutdown_tx.send(());
    match tokio::time::timeout(shutdown_timeout, worker).await {
        Ok(Ok(())) => debug!("🚀️ Reconciliation worker has stopped"),
        Ok(Err(e)) => error!("🚀️ Reconciliation worker terminated abnormally. {e}"),
        Err(_) => warn!("🚀️ Reconciliation worker did not stop within {}s", shutdown_timeout.as_secs()),
    }
    result
}

/// Resolves on Ctrl-C, or on SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("🚀️ Could not listen for Ctrl-C. {e}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            },
            Err(e) => {
                error!("🚀️ Could not listen for SIGTERM. {e}");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
