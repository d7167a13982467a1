use padhai::cache::CachedStudyApi;
use padhai::{ApiError, StudyApi};
use tracing::warn;

use crate::app::App;

/// Load the signed-in student before the first frame. Only a rejected session
/// is fatal; the UI works without a name to greet.
pub async fn initialize_app_state<A: StudyApi>(
    app: &mut App,
    api: &CachedStudyApi<A>,
) -> Result<(), ApiError> {
    match api.me().await {
        Ok(user) => app.user = Some(user),
        Err(e) if e.is_unauthorized() => return Err(e),
        Err(e) => warn!(error = %e, "could not load profile"),
    }
    Ok(())
}
