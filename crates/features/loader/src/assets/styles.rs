use crate::document::Document;
use crate::error::LoaderError;
use futures::future::try_join_all;
use stager_domain::manifest::LoaderConfig;
use tracing::{debug, info};

/// Attaches every stylesheet in configuration order, then waits for all of them.
///
/// The first rejection wins; stylesheets still in flight keep loading but their
/// outcome is ignored.
///
/// # Errors
/// Returns [`LoaderError::Stylesheet`] for the first stylesheet that fails to load.
pub async fn load_styles(
    document: &dyn Document,
    config: &LoaderConfig,
) -> Result<usize, LoaderError> {
    let pending = config.styles.iter().map(|path| {
        let completion = document.attach_stylesheet(&config.asset_url(path));
        async move {
            completion.await.map_err(|reason| LoaderError::Stylesheet {
                path: path.clone(),
                context: Some(reason),
            })?;
            debug!(%path, "Stylesheet loaded");
            Ok::<_, LoaderError>(())
        }
    });

    let loaded = try_join_all(pending).await?.len();
    info!(styles = loaded, "All stylesheets loaded");
    Ok(loaded)
}
