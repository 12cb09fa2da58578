//! Static HTML index rendering.
//!
//! A pure function of the processed-descriptor list: the template receives
//! the binary count and, per binary, its name, description, version, and
//! architecture count. Everything else on the page is static.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use binhub_schema::ProcessedDescriptor;

const INDEX_TEMPLATE: &str = include_str!("templates/index.html.hbs");

#[derive(Serialize)]
struct IndexContext {
    binary_count: usize,
    binaries: Vec<BinaryContext>,
}

#[derive(Serialize)]
struct BinaryContext {
    name: String,
    description: String,
    version: String,
    arch_count: usize,
}

/// Render the static discovery page for the given descriptors.
///
/// # Errors
///
/// Returns an error if the embedded template fails to compile or render,
/// which indicates a packaging bug rather than bad input.
pub fn render_index(descriptors: &[ProcessedDescriptor]) -> Result<String> {
    let mut registry = Handlebars::new();
    registry
        .register_template_string("index", INDEX_TEMPLATE)
        .context("failed to compile index template")?;

    let context = IndexContext {
        binary_count: descriptors.len(),
        binaries: descriptors
            .iter()
            .map(|descriptor| BinaryContext {
                name: descriptor.name.as_str().to_string(),
                description: descriptor.description.clone(),
                version: descriptor.version.as_str().to_string(),
                arch_count: descriptor.architectures.len(),
            })
            .collect(),
    };

    registry
        .render("index", &context)
        .context("failed to render index template")
}
