use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

use axum::{extract::MatchedPath, http::Request};
use tower_http::trace::TraceLayer;
use tracing::info_span;

pub mod email;
pub mod error;
pub mod extrator;
pub mod otp;
pub mod password;
pub mod store;

use crate::{
    app::{
        email::client::EmailClient,
        store::{
            postgres::{PgOtpStore, PgUserStore},
            OtpStore, UserStore,
        },
    },
    config::AppConfig,
    routes::{auth, docs, health_check},
};

pub struct Application {
    listener: TcpListener,
    pub port: u16,
    app: Router,
}

#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub otps: Arc<dyn OtpStore>,
    pub email_client: Arc<EmailClient>,
}

impl Application {
    /// Build the app backed by Postgres.
    pub async fn build(config: AppConfig) -> Result<Self, anyhow::Error> {
        // Database
        let db_pool = get_db_connection_pool(&config);

        let users = Arc::new(PgUserStore::new(db_pool.clone()));
        let otps = Arc::new(PgOtpStore::new(db_pool));

        Self::build_with_stores(config, users, otps).await
    }

    /// Build the app on top of the given stores.
    pub async fn build_with_stores(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        otps: Arc<dyn OtpStore>,
    ) -> Result<Self, anyhow::Error> {
        // Connection
        let addr = format!(
            "{}:{}",
            config.app_application_host, config.app_application_port
        );
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        let email_client = get_email_client(&config);

        let api_context = ApiContext {
            config: Arc::new(config),
            users,
            otps,
            email_client: Arc::new(email_client),
        };

        let app = build_routes(api_context);

        Ok(Self {
            port,
            listener,
            app,
        })
    }

    /// Used in main, run the app
    pub async fn run_gracefully(
        self,
        close_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> std::io::Result<()> {
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async move {
                _ = close_rx.await;
            })
            .await
    }

    /// Useful for tests
    /// Don't use in main
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.app).await
    }
}

fn build_routes(api_context: ApiContext) -> Router {
    Router::new()
        .merge(health_check::router())
        .merge(docs::router())
        .merge(auth::router())
        .with_state(api_context)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let request_id = Uuid::new_v4();

                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str);

                    info_span!(
                        "http_request",
                        method = ?req.method(),
                        matched_path,
                        request_id = ?request_id,
                    )
                })
                .on_failure(()),
        )
}

pub fn get_db_connection_pool(config: &AppConfig) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(config.db_connect_options())
}

pub fn get_email_client(config: &AppConfig) -> EmailClient {
    EmailClient::new(
        reqwest::Client::new(),
        config.brevo_base_url.clone(),
        SecretString::from(config.brevo_api_key.expose_secret().to_string()),
        config.mail_id.clone(),
        config.mail_sender_name.clone(),
    )
}
