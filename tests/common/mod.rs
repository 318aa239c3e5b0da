#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use recap::llm::{
    InferenceRequest, InferenceService, ModelCatalog, TranslationRequest, TranslationService,
};
use recap::storage::MemoryObjectStore;
use recap::summary::{Chunk, ModelSelector, Retriever, Summarizer, SummaryService, SummaryStore};

pub const PREFERRED_MODEL: &str = "model-large";
pub const FALLBACK_MODEL: &str = "model-small";

pub fn run_recap(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
        }
    }

    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_recap"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env_remove("RECAP_GEMINI_API_KEY")
            .env_remove("RECAP_TRANSLATE_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("failed to execute recap binary")
    }

    /// Run with a placeholder API key so clients can be constructed.
    /// Nothing reaches the network unless a command gets past validation.
    pub fn run_with_key(&self, args: &[&str]) -> Output {
        self.command(args)
            .env("RECAP_GEMINI_API_KEY", "test-key")
            .output()
            .expect("failed to execute recap binary")
    }

    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }
}

/// Inference double: answers `summary #N`, records every request.
pub struct FakeModel {
    fail: bool,
    delay: Duration,
    counter: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<RecordedInference>>,
}

#[derive(Debug, Clone)]
pub struct RecordedInference {
    pub model: String,
    pub prompt: String,
    pub max_output_tokens: u32,
}

impl FakeModel {
    pub fn new() -> Arc<Self> {
        Self::build(false, Duration::ZERO)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true, Duration::ZERO)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::build(false, delay)
    }

    fn build(fail: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fail,
            delay,
            counter: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedInference> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceService for FakeModel {
    async fn invoke(&self, request: InferenceRequest<'_>) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(RecordedInference {
            model: request.model.to_string(),
            prompt: request.prompt.to_string(),
            max_output_tokens: request.max_output_tokens,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            anyhow::bail!("model invocation failed");
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("summary #{n}"))
    }
}

pub struct FakeCatalog {
    models: Vec<String>,
}

impl FakeCatalog {
    pub fn with(models: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            models: models.iter().map(|m| m.to_string()).collect(),
        })
    }
}

#[async_trait]
impl ModelCatalog for FakeCatalog {
    async fn list_models(&self) -> anyhow::Result<HashSet<String>> {
        Ok(self.models.iter().cloned().collect())
    }
}

/// Translation double: prefixes the text with the target language.
#[derive(Default)]
pub struct FakeTranslator {
    pub fail: bool,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationService for FakeTranslator {
    async fn translate(&self, request: TranslationRequest<'_>) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push((
            request.text.to_string(),
            request.source_language.to_string(),
            request.target_language.to_string(),
        ));
        if self.fail {
            anyhow::bail!("translation backend unavailable");
        }
        Ok(format!("({}) {}", request.target_language, request.text))
    }
}

/// A service wired to doubles, with handles to inspect them.
pub struct Harness {
    pub objects: Arc<MemoryObjectStore>,
    pub model: Arc<FakeModel>,
    pub translator: Arc<FakeTranslator>,
    pub service: SummaryService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeModel::new(), FakeTranslator::new(), true)
    }

    pub fn with(model: Arc<FakeModel>, translator: Arc<FakeTranslator>, serialize: bool) -> Self {
        let objects = Arc::new(MemoryObjectStore::new());
        let store = SummaryStore::new(objects.clone());

        let summarizer = Summarizer::new(
            store.clone(),
            model.clone(),
            FakeCatalog::with(&[PREFERRED_MODEL, FALLBACK_MODEL]),
            ModelSelector::new(PREFERRED_MODEL, FALLBACK_MODEL),
        )
        .with_serialization(serialize);
        let retriever = Retriever::new(store, translator.clone());

        Self {
            objects,
            model,
            translator,
            service: SummaryService {
                summarizer,
                retriever,
            },
        }
    }
}

pub fn chunk(original_language: &str, translation_language: &str, text: &str) -> Chunk {
    Chunk {
        original_language: original_language.to_string(),
        translation_language: translation_language.to_string(),
        original_text: format!("[original] {text}"),
        translated_text: format!("[translated] {text}"),
    }
}

/// Local HTTP upstream that answers every request with `400 Bad Request`.
///
/// Returns the base URL and the raw text of every request it received.
pub async fn rejecting_upstream() -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local upstream");
    let addr = listener.local_addr().expect("local upstream address");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let request = read_request(&mut socket).await;
            log.lock().unwrap().push(request);
            let _ = socket
                .write_all(
                    b"HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/v1beta"), seen)
}

/// Read one request: headers plus a `content-length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
