use tokio_util::sync::CancellationToken;

use telelink_transport::{Sender, SenderConfig};

/// Run the send loop until Ctrl-C or until `count` cycles are done.
/// Transport errors never end the loop, so there is nothing to return.
pub async fn run(config: SenderConfig) {
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

    let mut sender = Sender::new(config);
    sender.run(&token).await;
    watcher.abort();

    if token.is_cancelled() {
        println!();
    }
}
