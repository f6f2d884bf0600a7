//! Application startup and lifecycle management.

use crate::config::CheckoutConfig;
use crate::services::{
    AsaasPaymentClient, MongoOrderStore, OrderReconciler, OrderStore, PaymentGateway,
};
use crate::{build_router, AppState};
use axum::Router;
use mongodb::{options::ClientOptions, Client};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application against MongoDB and the Asaas endpoint.
    pub async fn build(config: CheckoutConfig) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(&config.mongodb.uri)
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::from(e)
            })?;
        client_options.app_name = Some("checkout-service".to_string());

        let client = Client::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.mongodb.database);

        let store = MongoOrderStore::new(&db);
        store.init_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            AppError::DatabaseError(e)
        })?;

        let gateway = AsaasPaymentClient::new(config.asaas.clone());
        if config.asaas.api_key.is_none() {
            tracing::warn!("ASAAS_API_KEY not configured - payment requests are sent unauthenticated");
        }

        Self::build_with(config, Arc::new(store), Arc::new(gateway)).await
    }

    /// Build the application over explicit collaborators.
    pub async fn build_with(
        config: CheckoutConfig,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, AppError> {
        let reconciler =
            OrderReconciler::new(store.clone(), gateway, config.orders.dedupe_window());

        let state = AppState {
            store,
            reconciler,
        };

        // Port 0 picks a random port for tests
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = listener.local_addr()?.port();

        tracing::info!("Checkout service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            listener,
            router: build_router(state),
        })
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
