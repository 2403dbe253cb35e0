use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

use crate::infrastructure::shutdown::ShutdownListener;

pub mod handlers;
pub mod types;
pub mod utils;

pub use types::AppState;

/// Runs the API server until it exits on its own or the shutdown signal
/// fires, then stops it gracefully.
pub async fn serve(
    state: web::Data<AppState>,
    bind_addr: &str,
    port: u16,
    mut shutdown: ShutdownListener,
) -> Result<()> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(web::resource("/api/health").route(web::get().to(handlers::health)))
            .service(web::resource("/api/contact").route(web::post().to(handlers::submit_contact)))
            .service(
                web::resource("/api/admin/contact")
                    .route(web::get().to(handlers::admin_contact_overview))
                    .route(web::post().to(handlers::admin_contact_action)),
            )
            .service(web::resource("/api/rewrite").route(web::post().to(handlers::rewrite_email)))
            .service(web::resource("/api/analyze").route(web::post().to(handlers::analyze_email)))
            .service(
                web::resource("/api/rewrite/remaining")
                    .route(web::get().to(handlers::remaining_uses)),
            )
    })
    .disable_signals()
    .bind((bind_addr, port))
    .with_context(|| format!("failed to bind {bind_addr}:{port}"))?
    .run();

    tracing::info!(target: "http", bind_addr, port, "api server listening");

    let handle = server.handle();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => {
            res.context("api server exited with an error")?;
        }
        _ = shutdown.notified() => {
            tracing::info!(target: "http", "stopping api server");
            handle.stop(true).await;
            server.await.context("api server failed during shutdown")?;
        }
    }
    Ok(())
}
