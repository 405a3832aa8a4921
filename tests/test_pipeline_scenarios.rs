use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use menu_analyzer::render::render_state;
use menu_analyzer::{
    AnalysisState, AnalysisStatus, AnalyzerError, DishAnalysis, ImagePreview, LlmProvider,
    MenuPipeline, OcrEngine, ProviderConfig, ProviderKind, RunOutcome, SelectedImage,
};
use mockito::Server;

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

struct StaticOcr {
    text: &'static str,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl OcrEngine for StaticOcr {
    fn engine_name(&self) -> &str {
        "static"
    }

    async fn recognize(&self, _image: &[u8]) -> Result<String, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

/// Records the menu text it was given
struct RecordingProvider {
    dishes: Vec<DishAnalysis>,
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LlmProvider for RecordingProvider {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn analyze_menu(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        self.seen.lock().unwrap().push(menu_text.to_string());
        Ok(self.dishes.clone())
    }
}

fn dish(name: &str, is_vegetarian: bool, is_vegan: bool, confidence: f64) -> DishAnalysis {
    DishAnalysis {
        name: name.to_string(),
        is_vegetarian,
        is_vegan,
        confidence,
        reasoning: String::new(),
        ingredients: vec![],
    }
}

fn static_ocr(text: &'static str) -> (Box<dyn OcrEngine>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = StaticOcr {
        text,
        calls: Arc::clone(&calls),
    };
    (Box::new(engine), calls)
}

#[tokio::test]
async fn test_salad_and_burger_grouping() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (ocr, _) = static_ocr("Caesar Salad, Veggie Burger");
    let mut pipeline = MenuPipeline::with_provider(
        ocr,
        Arc::new(RecordingProvider {
            dishes: vec![
                dish("Caesar Salad", true, false, 85.0),
                dish("Veggie Burger", false, true, 90.0),
            ],
            seen: Arc::clone(&seen),
        }),
    );

    let outcome = pipeline.run(SelectedImage::from_bytes(JPEG_BYTES)).await;
    assert_eq!(outcome, RunOutcome::Complete);
    assert_eq!(*seen.lock().unwrap(), ["Caesar Salad, Veggie Burger"]);

    let grouped = pipeline.state().grouped_results().unwrap();
    assert_eq!(grouped.vegan.len(), 1);
    assert_eq!(grouped.vegan[0].name, "Veggie Burger");
    assert_eq!(grouped.vegetarian.len(), 1);
    assert_eq!(grouped.vegetarian[0].name, "Caesar Salad");
    assert!(grouped.non_vegetarian.is_empty());

    let text = render_state(&pipeline.state());
    let vegan = text.find("Vegan Dishes").unwrap();
    let burger = text.find("Veggie Burger").unwrap();
    let vegetarian = text.find("Vegetarian Dishes").unwrap();
    let salad = text.find("Caesar Salad").unwrap();
    assert!(vegan < burger && burger < vegetarian && vegetarian < salad);
}

#[tokio::test]
async fn test_empty_ocr_text_never_calls_provider() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (ocr, ocr_calls) = static_ocr("");
    let mut pipeline = MenuPipeline::with_provider(
        ocr,
        Arc::new(RecordingProvider {
            dishes: vec![],
            seen: Arc::clone(&seen),
        }),
    );

    let outcome = pipeline.run(SelectedImage::from_bytes(JPEG_BYTES)).await;

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(
        pipeline.state(),
        AnalysisState::Error {
            message: "No text could be extracted from the image".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_credential_fails_before_ocr() {
    let (ocr, ocr_calls) = static_ocr("Caesar Salad");
    let mut pipeline = MenuPipeline::new(ocr, ProviderKind::Gemini, ProviderConfig::default());

    let outcome = pipeline.run(SelectedImage::from_bytes(JPEG_BYTES)).await;

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
    let state = pipeline.state();
    assert_eq!(state.status(), AnalysisStatus::Error);
    let message = state.error().unwrap();
    assert!(message.contains("gemini"), "{}", message);
    assert!(message.contains("GEMINI_API_KEY"), "{}", message);
}

#[tokio::test]
async fn test_reset_releases_preview_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let on_release = Arc::clone(&released);
    let image = SelectedImage::from_bytes(JPEG_BYTES).with_preview(ImagePreview::new(
        "file:///tmp/menu-preview.jpg",
        move |_| {
            on_release.fetch_add(1, Ordering::SeqCst);
        },
    ));

    let (ocr, _) = static_ocr("Minestrone");
    let mut pipeline = MenuPipeline::with_provider(
        ocr,
        Arc::new(RecordingProvider {
            dishes: vec![dish("Minestrone", true, true, 70.0)],
            seen: Arc::new(Mutex::new(Vec::new())),
        }),
    );

    assert_eq!(pipeline.run(image).await, RunOutcome::Complete);
    assert_eq!(released.load(Ordering::SeqCst), 0);

    assert!(pipeline.reset());
    assert_eq!(pipeline.state(), AnalysisState::Idle);
    assert!(pipeline.state().results().is_none());
    assert!(pipeline.state().error().is_none());
    assert_eq!(released.load(Ordering::SeqCst), 1);

    drop(pipeline);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_vendor_error_becomes_error_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body("invalid api key")
        .create_async()
        .await;

    let (ocr, _) = static_ocr("Ramen");
    let mut pipeline = MenuPipeline::new(
        ocr,
        ProviderKind::DeepSeek,
        ProviderConfig {
            base_url: Some(server.url()),
            ..ProviderConfig::with_api_key("bad-key")
        },
    );

    let outcome = pipeline.run(SelectedImage::from_bytes(JPEG_BYTES)).await;

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(
        pipeline.state().error(),
        Some("deepseek API error: 401 Unauthorized - invalid api key")
    );
    assert!(render_state(&pipeline.state()).contains("Try again"));
}

#[tokio::test]
async fn test_observer_sees_final_state() {
    let (ocr, _) = static_ocr("Gnocchi");
    let mut pipeline = MenuPipeline::with_provider(
        ocr,
        Arc::new(RecordingProvider {
            dishes: vec![],
            seen: Arc::new(Mutex::new(Vec::new())),
        }),
    );
    let mut observer = pipeline.subscribe();

    assert_eq!(
        pipeline.run(SelectedImage::from_bytes(JPEG_BYTES)).await,
        RunOutcome::Complete
    );

    observer.changed().await.unwrap();
    let state = observer.borrow_and_update().clone();
    assert_eq!(state, AnalysisState::Complete { results: vec![] });
    assert!(render_state(&state).contains("No dishes found to analyze."));
}
