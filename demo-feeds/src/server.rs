use axum::Router;
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;

/// In-flight requests get this long to finish after Ctrl-C
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<()> {
    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!("Feed server listening on http://{}", addr);
        if let Err(e) = axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("Feed server stopped: {}", e);
        }
    })
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!(
                "Shutting down, waiting up to {:?} for open requests",
                SHUTDOWN_GRACE
            );
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
        Err(e) => {
            tracing::warn!("Cannot listen for Ctrl-C, graceful shutdown disabled: {}", e)
        }
    }
}
