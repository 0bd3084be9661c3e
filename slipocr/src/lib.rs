//! OCR and structured-field extraction for Thai bank transfer slips.
//!
//! An uploaded slip image runs through preprocessing, one of the configured
//! OCR engines and the pattern extractor; the resulting job snapshot is kept
//! in the job store until its TTL runs out.

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod jobs;
pub mod models;
pub mod ocr;
pub mod store;
