use localmart::services::{AuthService, OrderService};
use localmart::{ApiClient, NotificationCenter, OrderPoller, SessionEvent};
use shared::config::Config;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    let client = ApiClient::from_config(&config)?;
    let auth = AuthService::new(client.clone());

    let user = match &config.credentials {
        Some(credentials) => auth.login(&credentials.username, &credentials.password).await?,
        None if auth.is_authenticated() => auth.current_user().await?,
        None => {
            warn!(
                "No stored session at {:?}; set LOCALMART_USERNAME and LOCALMART_PASSWORD to log in",
                config.token_path
            );
            return Ok(());
        }
    };

    let center = Arc::new(NotificationCenter::new());
    let Some(poller) = OrderPoller::for_user(&user, OrderService::new(client.clone()), center.clone())
    else {
        info!("{} is not a shop owner, there are no orders to watch", user.username);
        return Ok(());
    };

    let mut notifications = center.subscribe();
    let mut session = client.subscribe_session();
    let cancel = CancellationToken::new();
    let poller_handle = poller.with_interval(config.poll_interval).spawn(cancel.clone());

    info!("Watching orders for {}", user.username);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            event = session.recv() => match event {
                Ok(SessionEvent::Expired { path }) => {
                    warn!("Session expired while requesting {}, log in again", path);
                    break;
                }
                Ok(SessionEvent::SignedOut) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            },
            record = notifications.recv() => match record {
                Ok(record) => info!(order_id = ?record.order_id, "{}", record.message),
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} notification(s)", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    cancel.cancel();
    poller_handle.await?;

    info!("localmart-watch shutting down");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
