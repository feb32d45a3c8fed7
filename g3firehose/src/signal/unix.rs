/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::future::poll_fn;

use anyhow::anyhow;
use log::info;
use tokio::signal::unix::{SignalKind, signal};

use super::AsyncSignalAction;

fn listen<QUIT>(kind: SignalKind, name: &str, do_quit: QUIT) -> anyhow::Result<()>
where
    QUIT: AsyncSignalAction + Send + 'static,
{
    let mut sig = signal(kind).map_err(|e| anyhow!("failed to create {name} listener: {e}"))?;
    let name = name.to_string();
    tokio::spawn(async move {
        if poll_fn(|cx| sig.poll_recv(cx)).await.is_some() {
            info!("got {name} signal");
            do_quit.run().await;
        }
    });
    Ok(())
}

pub fn register_quit<QUIT>(do_quit: QUIT) -> anyhow::Result<()>
where
    QUIT: AsyncSignalAction + Send + 'static,
{
    listen(SignalKind::quit(), "SIGQUIT", do_quit.clone())?;
    listen(SignalKind::interrupt(), "SIGINT", do_quit.clone())?;
    listen(SignalKind::terminate(), "SIGTERM", do_quit)
}
