//! Variant batch: alternate renders of the final visual.

use std::collections::BTreeMap;

use futures::future::join_all;
use log::{debug, warn};

use crate::{config::VariantConfig, gateway::GenerationGateway, models::Image};

/// Renders every configuration in parallel and collects the successes.
///
/// A failing member is logged and left out; it never cancels its siblings.
/// The map is only returned once every call has resolved.
pub async fn render_batch(
    gateway: &dyn GenerationGateway,
    base: &Image,
    configs: &[VariantConfig],
    style_context: &str,
) -> BTreeMap<String, Image> {
    let calls = configs.iter().map(|config| async move {
        let result = gateway
            .synthesize_variant_image(base, &config.angle, &config.lighting, style_context)
            .await;
        (config.name.as_str(), result)
    });

    let mut rendered = BTreeMap::new();
    for (name, result) in join_all(calls).await {
        match result {
            Ok(image) => {
                debug!("Variant '{name}' rendered");
                rendered.insert(name.to_string(), image);
            }
            Err(e) => warn!("Variant '{name}' failed and is omitted: {e}"),
        }
    }
    rendered
}
