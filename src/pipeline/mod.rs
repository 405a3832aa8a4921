//! Orchestration of one menu analysis run: image in, OCR, provider,
//! results out, with every step published as a whole [`AnalysisState`].

mod image;
mod state;

pub use image::{ImagePreview, SelectedImage};
pub use state::{
    transition, AnalysisEvent, AnalysisState, AnalysisStatus, InvalidTransition, NO_TEXT_MESSAGE,
};

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::{AnalyzerConfig, ProviderConfig};
use crate::error::AnalyzerError;
use crate::model::DishAnalysis;
use crate::ocr::{self, OcrEngine};
use crate::providers::{LlmProvider, ProviderFactory, ProviderKind};

/// How a call to [`MenuPipeline::run`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Results are in the `complete` state
    Complete,
    /// The message is in the `error` state
    Failed,
    /// Cancelled mid-flight; the pipeline is back to `idle`
    Abandoned,
    /// A run was requested while the state was not `idle`; nothing changed
    Rejected,
}

enum ProviderSource {
    /// Built at the start of every run, so credential problems surface there
    Configured {
        kind: ProviderKind,
        config: ProviderConfig,
    },
    Ready(Arc<dyn LlmProvider>),
}

impl ProviderSource {
    fn provider(&self) -> Result<Arc<dyn LlmProvider>, AnalyzerError> {
        match self {
            ProviderSource::Configured { kind, config } => {
                ProviderFactory::create(*kind, config).map(Arc::from)
            }
            ProviderSource::Ready(provider) => Ok(Arc::clone(provider)),
        }
    }
}

/// Stateful driver of the analysis state machine.
///
/// The pipeline is the only writer of [`AnalysisState`]. Observers call
/// [`subscribe`](Self::subscribe) and see each state only after it has been
/// fully applied. Runs take `&mut self`, so two can never overlap.
pub struct MenuPipeline {
    ocr: Box<dyn OcrEngine>,
    providers: ProviderSource,
    state_tx: watch::Sender<AnalysisState>,
    image: Option<SelectedImage>,
}

impl MenuPipeline {
    pub fn new(ocr: Box<dyn OcrEngine>, kind: ProviderKind, config: ProviderConfig) -> Self {
        Self::with_source(ocr, ProviderSource::Configured { kind, config })
    }

    /// Use an already constructed provider
    pub fn with_provider(ocr: Box<dyn OcrEngine>, provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_source(ocr, ProviderSource::Ready(provider))
    }

    /// Build the OCR engine and provider settings from loaded configuration
    pub fn from_config(config: &AnalyzerConfig, kind: ProviderKind) -> Result<Self, AnalyzerError> {
        let ocr = ocr::create_engine(&config.ocr, Duration::from_secs(config.timeout))?;
        Ok(Self::new(ocr, kind, config.provider_config(kind)))
    }

    fn with_source(ocr: Box<dyn OcrEngine>, providers: ProviderSource) -> Self {
        let (state_tx, _) = watch::channel(AnalysisState::Idle);
        Self {
            ocr,
            providers,
            state_tx,
            image: None,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AnalysisState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state_tx.subscribe()
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// Run the whole pipeline on `image` to completion or failure
    pub async fn run(&mut self, image: SelectedImage) -> RunOutcome {
        self.run_with_cancel(image, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), abandoning the in-flight OCR or provider
    /// call as soon as `cancel` fires.
    pub async fn run_with_cancel(
        &mut self,
        image: SelectedImage,
        cancel: CancellationToken,
    ) -> RunOutcome {
        if !self.apply(AnalysisEvent::ImageSelected) {
            return RunOutcome::Rejected;
        }
        self.image = Some(image);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.execute() => Some(result),
        };

        match result {
            Some(Ok(dishes)) => {
                info!("Analysis complete: {} dishes", dishes.len());
                self.apply(AnalysisEvent::AnalysisFinished(dishes));
                RunOutcome::Complete
            }
            Some(Err(AnalyzerError::NoTextExtracted)) => {
                self.apply(AnalysisEvent::TextExtracted { characters: 0 });
                RunOutcome::Failed
            }
            Some(Err(e)) => {
                error!("Menu analysis failed: {}", e);
                self.apply(AnalysisEvent::Failed(e.to_string()));
                RunOutcome::Failed
            }
            None => {
                info!("Analysis abandoned");
                self.apply(AnalysisEvent::Abandoned);
                self.discard_image();
                RunOutcome::Abandoned
            }
        }
    }

    /// Return to `idle` from `complete` or `error`, releasing the preview.
    /// Returns false when there is nothing to reset.
    pub fn reset(&mut self) -> bool {
        if !self.apply(AnalysisEvent::Reset) {
            return false;
        }
        self.discard_image();
        true
    }

    async fn execute(&self) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        let provider = self.providers.provider()?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| AnalyzerError::InvalidImage("no image selected".to_string()))?;

        let text = ocr::extract_text(self.ocr.as_ref(), image.bytes()).await?;
        self.apply(AnalysisEvent::TextExtracted {
            characters: text.trim().chars().count(),
        });

        info!("Analyzing menu with {}", provider.provider_name());
        provider.analyze_menu(&text).await
    }

    fn apply(&self, event: AnalysisEvent) -> bool {
        let next = transition(&self.state_tx.borrow(), event);
        match next {
            Ok(state) => {
                info!("Analysis state is now {}", state.status());
                self.state_tx.send_replace(state);
                true
            }
            Err(e) => {
                warn!("Ignoring event: {}", e);
                false
            }
        }
    }

    fn discard_image(&mut self) {
        if let Some(mut image) = self.image.take() {
            image.release_preview();
        }
    }
}
