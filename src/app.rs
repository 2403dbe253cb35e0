use std::{sync::Arc, time::Duration};

use actix_web::web::Data;
use anyhow::Result;
use reqwest::Client;
use tokio::time::timeout;
use tokio_cron_scheduler::JobScheduler;

use crate::{
    ai::GroqClient,
    config::AppConfig,
    http::{self, AppState},
    infrastructure::{
        clock::{Clock, SystemClock},
        directories::ResolvedPaths,
        shutdown::Shutdown,
    },
    limiter::{MemoryUsageStore, UsageLimiter, UsageStore},
    monitor::ContactMonitor,
    security::{RequestRateLimiter, SubmissionTracker},
    tasks::scheduler::{configure_sweep_jobs, SweepCallback},
};

pub struct ContactGuardApp {
    _paths: ResolvedPaths,
    scheduler: JobScheduler,
    state: Data<AppState>,
    shutdown: Shutdown,
    config: Arc<AppConfig>,
}

impl ContactGuardApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let usage_store: Arc<dyn UsageStore> = Arc::new(MemoryUsageStore::new());
        let usage_limiter = Arc::new(UsageLimiter::new(
            usage_store.clone(),
            clock.clone(),
            config.limits.max_uses_per_ip,
            config.limits.usage_window,
        ));

        let monitor = Arc::new(ContactMonitor::new(clock.clone(), config.monitor.retention));
        let request_limiter = Arc::new(RequestRateLimiter::new(
            clock.clone(),
            config.limits.contact_window,
            config.limits.contact_max_requests,
        ));
        let tracker = Arc::new(SubmissionTracker::new(clock.clone()));

        let http_client = Client::builder()
            .user_agent(format!("contact-guard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        let groq = Arc::new(GroqClient::new(http_client, config.groq.clone()));

        let sweep_callback = build_sweep_callback(
            monitor.clone(),
            usage_store.clone(),
            tracker.clone(),
            clock.clone(),
        );
        let scheduler = configure_sweep_jobs(&config.scheduler.sweep_crons, sweep_callback).await?;

        let state = Data::new(AppState {
            config: config.clone(),
            clock,
            monitor,
            usage_limiter,
            request_limiter,
            tracker,
            groq,
        });

        Ok(Self {
            _paths: paths,
            scheduler,
            state,
            shutdown,
            config,
        })
    }

    pub async fn run(self) -> Result<()> {
        let ContactGuardApp {
            _paths: _,
            mut scheduler,
            state,
            shutdown,
            config,
        } = self;

        tracing::info!("contact-guard starting");

        let shutdown_timeout = Duration::from_secs(5);
        let server = http::serve(
            state,
            &config.server.bind_addr,
            config.server.port,
            shutdown.subscribe(),
        );
        let mut shutdown_listener = shutdown.subscribe();

        tokio::pin!(server);
        let server_result = tokio::select! {
            res = &mut server => Some(res),
            _ = shutdown_listener.notified() => {
                tracing::info!("shutdown signal received (CTRL+C / SIGTERM)");
                None
            }
        };

        shutdown.trigger();

        let server_result = match server_result {
            Some(res) => res,
            // the server drains in-flight requests before resolving
            None => match timeout(shutdown_timeout, &mut server).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!(
                        target: "http",
                        "api server did not stop within {:?}; forcing exit",
                        shutdown_timeout
                    );
                    Ok(())
                }
            },
        };
        if let Err(err) = &server_result {
            tracing::error!(error = %err, "api server terminated with an error");
        }

        match timeout(shutdown_timeout, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(?err, "sweep scheduler shutdown failed");
            }
            Err(_) => {
                tracing::warn!(
                    target: "scheduler",
                    "sweep scheduler did not stop within {:?}",
                    shutdown_timeout
                );
            }
        }

        tracing::info!("contact-guard stopped");
        server_result
    }
}

fn build_sweep_callback(
    monitor: Arc<ContactMonitor>,
    usage_store: Arc<dyn UsageStore>,
    tracker: Arc<SubmissionTracker>,
    clock: Arc<dyn Clock>,
) -> SweepCallback {
    Arc::new(move || {
        let removed_history = monitor.sweep();
        let removed_windows = usage_store.sweep_expired(clock.now_ms());
        let removed_trackers = tracker.sweep();
        if removed_history + removed_windows + removed_trackers > 0 {
            tracing::info!(
                target: "scheduler",
                removed_history,
                removed_windows,
                removed_trackers,
                "retention sweep completed"
            );
        }
    })
}
