#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};

use slipocr::config::OcrConfig;
use slipocr::error::{Result, SlipError};
use slipocr::jobs::JobOrchestrator;
use slipocr::models::TextSpan;
use slipocr::ocr::{RecognitionBackend, Recognizer, SlipImage, SlipPreprocessor};
use slipocr::store::{JobStore, MemoryJobStore};

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("slipocr=debug")
            .with_test_writer()
            .try_init();
    });
}

pub const KBANK_SLIP: &str = "ธนาคารกสิกรไทย\n\
โอนเงินสำเร็จ\n\
15 ม.ค. 2567 14:30:45\n\
จำนวนเงิน: 1,500.00 บาท\n\
เลขที่อ้างอิง: KB2024ABCD5678\n\
จาก เลขที่บัญชี: 1234567890\n\
ไปยัง เลขที่บัญชี: 0987654321";

/// Recognition backend returning a fixed result, or failing.
pub struct ScriptedBackend {
    name: &'static str,
    spans: Option<Vec<TextSpan>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn ok(name: &'static str, text: &str, confidence: f64) -> Arc<Self> {
        Arc::new(Self {
            name,
            spans: Some(vec![TextSpan::new(text, confidence)]),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            spans: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecognitionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        self.name
    }

    async fn recognize(&self, _image: &SlipImage) -> Result<Vec<TextSpan>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.spans {
            Some(spans) => Ok(spans.clone()),
            None => Err(SlipError::Ocr(format!("{} crashed", self.name))),
        }
    }
}

/// Job store whose every operation fails, as if the server were down.
pub struct UnreachableStore;

#[async_trait]
impl JobStore for UnreachableStore {
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(SlipError::JobStore("connection refused".to_string()))
    }
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(SlipError::JobStore("connection refused".to_string()))
    }
    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(SlipError::JobStore("connection refused".to_string()))
    }
    async fn ping(&self) -> Result<()> {
        Err(SlipError::JobStore("connection refused".to_string()))
    }
    async fn purge_expired(&self) -> Result<u64> {
        Err(SlipError::JobStore("connection refused".to_string()))
    }
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(width, height);
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .expect("encode test png");
    output
}

pub fn orchestrator_with(
    store: Arc<dyn JobStore>,
    backends: Vec<Arc<dyn RecognitionBackend>>,
    ttl: Duration,
) -> JobOrchestrator {
    JobOrchestrator::new(
        store,
        Recognizer::new(backends),
        Arc::new(SlipPreprocessor::new(&OcrConfig::default())),
        ttl,
    )
}

pub fn memory_store() -> Arc<dyn JobStore> {
    Arc::new(MemoryJobStore::new(100))
}
