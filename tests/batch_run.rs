//! End-to-end runs against a mocked Gemini endpoint.

use base64::Engine;
use genbatch::{
    enumerate_inputs, BatchRunner, GeminiProvider, Outcome, Pacing, RunLog, RunMode,
    RunObserver, WorkItem,
};
use std::collections::BTreeMap;
use std::path::Path;

const GENERATE_PATH: &str = "/v1beta/models/gemini-3-pro-image-preview:generateContent";

fn result_png() -> Vec<u8> {
    let mut buf = Vec::new();
    image::RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]))
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn image_response() -> String {
    serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"inlineData": {
                "mimeType": "image/png",
                "data": base64::engine::general_purpose::STANDARD.encode(result_png())
            }}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn provider(server: &mockito::Server) -> GeminiProvider {
    GeminiProvider::builder()
        .api_key("test-key")
        .base_url(server.url())
        .build()
        .unwrap()
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, std::fs::read(&path).unwrap())
        })
        .collect()
}

#[derive(Default)]
struct Outcomes(Vec<(String, &'static str)>);

impl RunObserver for Outcomes {
    fn item_finished(&mut self, item: &WorkItem, _total: usize, outcome: &Outcome) {
        self.0.push((item.file_name(), outcome.label()));
    }
}

#[tokio::test]
async fn test_example_scenario_skips_existing_and_processes_rest() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    image::RgbImage::new(512, 768)
        .save(input_dir.path().join("a.png"))
        .unwrap();
    image::RgbImage::new(600, 600)
        .save(input_dir.path().join("b.jpg"))
        .unwrap();
    std::fs::write(output_dir.path().join("a_processed.png"), b"from an earlier run").unwrap();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(image_response())
        .expect(1)
        .create_async()
        .await;

    let inputs = enumerate_inputs(input_dir.path()).unwrap();
    let items = inputs.work_items(output_dir.path(), RunMode::Full);
    let log_path = output_dir.path().join("processing_log.txt");
    let mut log = RunLog::open(&log_path).unwrap();

    let runner = BatchRunner::new(provider(&server), "Make it a product shot")
        .with_pacing(Pacing::none());
    let mut outcomes = Outcomes::default();
    let summary = runner.run(&items, Some(&mut log), &mut outcomes).await;

    mock.assert_async().await;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_balanced());
    assert_eq!(
        outcomes.0,
        vec![("a.png".to_string(), "SKIP"), ("b.jpg".to_string(), "OK")]
    );

    assert_eq!(
        std::fs::read(output_dir.path().join("a_processed.png")).unwrap(),
        b"from an earlier run"
    );
    assert_eq!(
        std::fs::read(output_dir.path().join("b_processed.png")).unwrap(),
        result_png()
    );

    let log_text = std::fs::read_to_string(&log_path).unwrap();
    assert!(log_text.contains("SKIP [1/2] a.png (already processed)"));
    assert!(log_text.contains("OK [2/2] b.jpg -> b_processed.png"));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    for (name, w, h) in [("one.png", 30, 20), ("two.jpeg", 20, 30), ("three.png", 25, 25)] {
        image::RgbImage::new(w, h)
            .save(input_dir.path().join(name))
            .unwrap();
    }

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(image_response())
        .expect(3)
        .create_async()
        .await;

    let inputs = enumerate_inputs(input_dir.path()).unwrap();
    let items = inputs.work_items(output_dir.path(), RunMode::Full);
    let runner =
        BatchRunner::new(provider(&server), "Make it a product shot").with_pacing(Pacing::none());

    let first = runner.run(&items, None, &mut ()).await;
    assert_eq!(first.processed, 3);
    let before = snapshot(output_dir.path());

    let second = runner.run(&items, None, &mut ()).await;
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(snapshot(output_dir.path()), before);

    // Only the first run reached the service.
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_error_is_isolated_and_retried_next_run() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    image::RgbImage::new(10, 10)
        .save(input_dir.path().join("cake.png"))
        .unwrap();

    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", GENERATE_PATH)
        .with_status(500)
        .with_body(r#"{"error": {"message": "Internal error"}}"#)
        .create_async()
        .await;

    let inputs = enumerate_inputs(input_dir.path()).unwrap();
    let items = inputs.work_items(output_dir.path(), RunMode::Sample { count: 5 });
    let runner =
        BatchRunner::new(provider(&server), "Make it a product shot").with_pacing(Pacing::none());

    let summary = runner.run(&items, None, &mut ()).await;
    assert_eq!((summary.processed, summary.failed), (0, 1));
    assert!(!output_dir.path().join("cake_test_processed.png").exists());

    failing.remove_async().await;
    let _ok = server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(image_response())
        .create_async()
        .await;

    let summary = runner.run(&items, None, &mut ()).await;
    assert_eq!((summary.processed, summary.failed), (1, 0));
    assert!(output_dir.path().join("cake_test_processed.png").exists());
}
