//! Sender and receiver loops of the telemetry link.
//!
//! Both sides are strictly sequential: one socket, one operation at a time.
//! Suspension points are connect/accept, write, read and the pause between
//! cycles; each of them also watches a [`CancellationToken`] so Ctrl-C ends
//! the loop promptly.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod receiver;
pub mod sender;

pub use receiver::{Delivery, Receiver, ReceiverConfig};
pub use sender::{CycleReport, Delivered, SendStats, Sender, SenderConfig};

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use telelink_api::LinkError;

/// Верхняя граница для `size`/`rsize`: буферы выделяются целиком на каждый цикл.
pub const MAX_BUFFER: usize = 16 * 1024 * 1024;

pub(crate) fn check_range(name: &str, value: usize, min: usize) -> Result<(), LinkError> {
    if (min..=MAX_BUFFER).contains(&value) {
        Ok(())
    } else {
        Err(LinkError::Config(format!("{name} must be in {min}..={MAX_BUFFER}, got {value}")))
    }
}

/// Пауза между циклами. Возвращает `false`, если во время паузы пришла отмена.
pub(crate) async fn pause(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
