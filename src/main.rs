use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tower::ServiceExt;
use tracing::{info, Level};

use gridsight::{
    build_backend, AnalysisOrchestrator, AnalysisRequest, AnalysisService, AnalyzeOptions,
    AppError, Configuration, GridOverlayRenderer, Renderer,
};

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

fn annotated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("analysis");
    let stamp = Utc::now().format("%Y%m%dT%H%M%S");
    input.with_file_name(format!("{stem}-annotated-{stamp}.png"))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let Some(image_arg) = args.next() else {
        eprintln!("usage: gridsight <image.png> <prompt...>");
        std::process::exit(2);
    };
    let prompt = args.collect::<Vec<_>>().join(" ");
    if prompt.is_empty() {
        eprintln!("usage: gridsight <image.png> <prompt...>");
        std::process::exit(2);
    }
    let image_path = PathBuf::from(image_arg);

    let configuration = Configuration::load()?;
    let backend = build_backend(&configuration)?;
    let renderer: Arc<dyn Renderer> = Arc::new(GridOverlayRenderer::new());
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        backend,
        renderer,
        &configuration,
    )?);

    let image = Arc::new(tokio::fs::read(&image_path).await?);
    info!(path = %image_path.display(), bytes = image.len(), "loaded image");

    let result = AnalysisService::new(Arc::clone(&orchestrator))
        .oneshot(AnalysisRequest {
            image: Arc::clone(&image),
            prompt,
            options: AnalyzeOptions {
                contiguous_regions: configuration.contiguous_regions,
            },
        })
        .await?;

    let annotated = orchestrator.render_result(&image, &result)?;
    let output_path = annotated_path(&image_path);
    tokio::fs::write(&output_path, annotated).await?;
    info!(path = %output_path.display(), "wrote annotated image");

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
