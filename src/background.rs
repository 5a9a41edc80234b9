//! Fire-and-forget work scheduled off the request path. Failures are
//! logged and never surface to the client.

use crate::AppState;

pub fn spawn_click_increment(state: &AppState, recipe_id: i32) {
    let db = state.db.clone();
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(move || db.increment_clicks(recipe_id)).await {
            Ok(Err(e)) => {
                tracing::warn!("Failed to increment clicks for recipe {}: {}", recipe_id, e)
            }
            Err(e) => tracing::warn!("Click increment task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    });
}

/// Sweep images that lost their last recipe or step reference and have
/// aged past the grace window.
pub fn spawn_image_sweep(state: &AppState) {
    let db = state.db.clone();
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(move || db.delete_unused_images()).await {
            Ok(Err(e)) => tracing::warn!("Orphaned image sweep failed: {}", e),
            Err(e) => tracing::warn!("Orphaned image sweep task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    });
}
