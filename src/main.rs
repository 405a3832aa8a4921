use std::env;
use std::process::ExitCode;

use log::error;
use tokio_util::sync::CancellationToken;

use menu_analyzer::render::render_state;
use menu_analyzer::{AnalyzerConfig, MenuPipeline, ProviderKind, RunOutcome, SelectedImage};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(RunOutcome::Complete) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let image_path = args
        .get(1)
        .ok_or("Usage: menu-analyzer <image> [provider]")?;

    let config = AnalyzerConfig::load()?;
    let kind = match args.get(2) {
        Some(name) => name.parse::<ProviderKind>()?,
        None => config.default_provider_kind()?,
    };

    let image = SelectedImage::from_path(image_path).await?;
    let mut pipeline = MenuPipeline::from_config(&config, kind)?;

    let mut states = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            println!("{}", render_state(&state));
        }
    });

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let outcome = pipeline.run_with_cancel(image, cancel).await;

    // Closing the channel ends the printer once it has drained
    drop(pipeline);
    printer.await?;

    if outcome == RunOutcome::Abandoned {
        eprintln!("Cancelled.");
    }
    Ok(outcome)
}
