//! Recognition adapter.
//!
//! Turns slip images into text through one or more OCR engines:
//! - `RecognitionBackend` is the seam every engine implements
//! - `TesseractBackend` runs Tesseract locally through leptess
//! - `RemoteOcrBackend` calls an OCR server over HTTP
//! - `Recognizer` owns the ordered engine list and the fallback policy
//!
//! Image clean-up happens before recognition through a `Preprocessor`.
//!
//! # Configuration
//!
//! Engines are listed in `OCR_ENGINES` (see `config.rs`), in priority order:
//! `tesseract` for the local engine, `name=url` for remote ones.

mod backend;
mod preprocessing;
mod recognizer;
mod remote;
mod tesseract;

pub use backend::{RecognitionBackend, SlipImage};
pub use preprocessing::{decode_image, Preprocessor, SlipPreprocessor};
pub use recognizer::Recognizer;
pub use remote::RemoteOcrBackend;
pub use tesseract::{TesseractBackend, TESSERACT_ENGINE};
