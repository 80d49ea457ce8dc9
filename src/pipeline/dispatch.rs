// src/pipeline/dispatch.rs

//! Single reader of the update queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::Update;
use crate::services::{Bot, Router};

/// Drain the queue in delivery order, resolving each update and spawning its
/// handler. Returns once every sender is gone.
pub async fn run_dispatcher(mut rx: mpsc::Receiver<Update>, router: Arc<Router>, bot: Arc<Bot>) {
    while let Some(update) = rx.recv().await {
        dispatch(update, &router, &bot);
    }
    log::info!("Update queue drained, dispatcher stopping");
}

/// Resolve one update and spawn its handler, if any.
pub fn dispatch(update: Update, router: &Router, bot: &Arc<Bot>) -> Option<JoinHandle<()>> {
    let id = update.id;
    let Some(route) = router.route(update) else {
        log::debug!("Update {} has no route", id);
        return None;
    };

    let bot = Arc::clone(bot);
    Some(tokio::spawn(async move {
        if let Err(e) = bot.handle(route).await {
            log::warn!("Handler for update {} failed: {}", id, e);
        }
    }))
}
