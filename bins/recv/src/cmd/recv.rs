use tokio_util::sync::CancellationToken;

use telelink_transport::{Receiver, ReceiverConfig};

use super::error::RecvError;

/// Bind, then receive until Ctrl-C, `count` connections, or a fatal error.
pub async fn run(config: ReceiverConfig) -> Result<(), RecvError> {
    let receiver = Receiver::bind(config).await?;
    let token = CancellationToken::new();

    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => token.cancel(),
                Err(e) => tracing::error!(error = %e, "cannot listen for Ctrl-C"),
            }
        })
    };

    let result = receiver.run(&token).await;
    watcher.abort();

    if token.is_cancelled() {
        println!();
    }
    result?;
    Ok(())
}
