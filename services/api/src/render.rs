use crate::infra::{
    locate, locate_base_uri, templates_dir, FileTemplateResolver, FixtureApplicationLookup,
    HandlebarsViewRenderer, HtmlPreviewConverter, DEFAULT_FIXTURES,
};
use application_docs::config::AppConfig;
use application_docs::documents::{ApplicationId, DocumentDispatcher};
use application_docs::error::AppError;
use application_docs::telemetry;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Identifier of the application to render
    #[arg(long)]
    pub(crate) application_id: String,
    /// JSON file holding the applications (defaults to fixtures/applications.json)
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
    /// Template base URI (defaults to APP_TEMPLATE_BASE_URI)
    #[arg(long)]
    pub(crate) templates: Option<String>,
    /// Write the document here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let RenderArgs {
        application_id,
        fixtures,
        templates,
        output,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let base_uri = locate_base_uri(&templates.unwrap_or(config.templates.base_uri));
    let lookup = FixtureApplicationLookup::from_path(locate(
        fixtures.unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES)),
    ))?;

    let dispatcher = DocumentDispatcher::new(
        Arc::new(lookup),
        Arc::new(FileTemplateResolver),
        Arc::new(HandlebarsViewRenderer::new()),
        Arc::new(HtmlPreviewConverter::new(templates_dir(&base_uri))),
        config.documents,
    );

    let id = ApplicationId(application_id);
    let Some(document) = dispatcher.generate_document(&id, &base_uri)? else {
        println!("No document available for application {id}.");
        return Ok(());
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &document.bytes)?;
            println!(
                "Wrote {} bytes ({}) to {}",
                document.bytes.len(),
                document.media_type,
                path.display()
            );
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&document.bytes)?;
        }
    }

    Ok(())
}
