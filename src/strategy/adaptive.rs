//! Adaptive strategy: pick a concrete mode per text, then delegate.

use crate::config::{Mode, ProcessingConfig};
use crate::features;
use crate::result::ProcessingResult;

use super::{ensemble, parallel, single};

/// Run the selector over the text and the configured backends, restrict
/// the config to the chosen subset, and delegate to the chosen concrete
/// strategy. The result reports the effective mode, not `Adaptive`, so
/// callers can see which strategy actually ran.
pub(crate) async fn process(text: &str, config: &ProcessingConfig) -> ProcessingResult {
    let selection = features::select(text, &config.backends);
    let restricted = config
        .restricted_to(&selection.backend_ids)
        .with_mode(selection.mode);

    match selection.mode {
        Mode::Single => single::process(text, &restricted).await,
        Mode::Ensemble => ensemble::process(text, &restricted).await,
        // The selector never emits Sequential or Adaptive; anything else
        // runs the parallel path.
        _ => parallel::process(text, &restricted).await,
    }
}
