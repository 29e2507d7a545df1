//! Service wiring.

use std::sync::Arc;

use tracing::{info, warn};

use hireboard_events::{EventPublisher, InMemoryBroker, MessageBroker};
use hireboard_identity::{HttpIdentityClient, IdentityProvider};
use hireboard_jobs::{
    ApplicationService, ApplicationStore, InMemoryApplicationStore, InMemoryJobStore, JobService,
    JobStore,
};
use hireboard_notifications::{
    ConsumerConfig, DeliverySink, LoggingSink, NotificationWorker, SmtpConfig, SmtpSink,
    WorkerHandle,
};

use crate::config::ApiConfig;

/// Everything the handlers touch.
pub struct AppState {
    pub jobs: JobService,
    pub applications: ApplicationService,
}

/// Wire services over explicit components. Used by `build_services` and by
/// tests that swap in their own identity directory or broker.
pub fn assemble(
    job_store: Arc<dyn JobStore>,
    application_store: Arc<dyn ApplicationStore>,
    identity: Arc<dyn IdentityProvider>,
    broker: Arc<dyn MessageBroker>,
) -> Arc<AppState> {
    let publisher = EventPublisher::new(broker);
    let jobs = JobService::new(job_store.clone(), identity.clone(), publisher.clone());
    let applications = ApplicationService::new(application_store, job_store, identity, publisher);

    Arc::new(AppState { jobs, applications })
}

/// Production wiring from environment configuration: stores, identity
/// client, broker, and the notification worker consuming from it.
pub async fn build_services(config: &ApiConfig) -> (Arc<AppState>, WorkerHandle) {
    let broker = Arc::new(InMemoryBroker::new());

    let sink: Arc<dyn DeliverySink> = match &config.smtp {
        Some(smtp) => {
            let smtp_config = SmtpConfig {
                host: smtp.host.clone(),
                username: smtp.username.clone(),
                password: smtp.password.clone(),
                from: smtp.from.clone(),
                timeout: smtp.timeout,
            };
            match SmtpSink::new(smtp_config) {
                Ok(sink) => {
                    info!(host = %smtp.host, "smtp delivery sink configured");
                    Arc::new(sink)
                }
                Err(e) => {
                    warn!(error = %e, "smtp sink setup failed, falling back to logging sink");
                    Arc::new(LoggingSink)
                }
            }
        }
        None => Arc::new(LoggingSink),
    };
    let worker = NotificationWorker::spawn(broker.as_ref(), sink, ConsumerConfig::default());

    let identity: Arc<dyn IdentityProvider> = Arc::new(
        HttpIdentityClient::new(&config.identity_url, config.identity_timeout)
            .expect("failed to build identity client"),
    );

    let (job_store, application_store) = build_stores(config).await;

    (
        assemble(job_store, application_store, identity, broker),
        worker,
    )
}

async fn build_stores(config: &ApiConfig) -> (Arc<dyn JobStore>, Arc<dyn ApplicationStore>) {
    #[cfg(feature = "postgres")]
    if let Some(url) = &config.database_url {
        let pool = sqlx::PgPool::connect(url)
            .await
            .expect("failed to connect to Postgres");
        hireboard_jobs::postgres::ensure_schema(&pool)
            .await
            .expect("failed to bootstrap database schema");
        info!("using Postgres stores");
        return (
            Arc::new(hireboard_jobs::postgres::PgJobStore::new(pool.clone())),
            Arc::new(hireboard_jobs::postgres::PgApplicationStore::new(pool)),
        );
    }

    #[cfg(not(feature = "postgres"))]
    if config.database_url.is_some() {
        warn!("DATABASE_URL is set but the postgres feature is not compiled in");
    }

    info!("using in-memory stores");
    (
        Arc::new(InMemoryJobStore::new()),
        Arc::new(InMemoryApplicationStore::new()),
    )
}
