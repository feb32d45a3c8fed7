/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::Notify;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::register_quit;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::register_quit;

pub trait AsyncSignalAction: Clone {
    fn run(&self) -> impl Future<Output = ()> + Send;
}

/// Wakes up whoever waits for the process to quit.
///
/// Only the first notification matters, a later signal finds the waiter
/// already gone.
#[derive(Clone, Default)]
pub struct QuitAction {
    notify: Arc<Notify>,
}

impl QuitAction {
    pub async fn wait(&self) {
        self.notify.notified().await
    }
}

impl AsyncSignalAction for QuitAction {
    fn run(&self) -> impl Future<Output = ()> + Send {
        let notify = Arc::clone(&self.notify);
        async move { notify.notify_one() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn quit_before_wait() {
        let action = QuitAction::default();
        action.clone().run().await;
        tokio::time::timeout(Duration::from_secs(1), action.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn quit_while_waiting() {
        let action = QuitAction::default();
        let notifier = action.clone();
        let waiter = tokio::spawn(async move { action.wait().await });
        tokio::task::yield_now().await;
        notifier.run().await;
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
