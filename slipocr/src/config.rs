use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) if val.trim().is_empty() => None,
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Parse `OCR_ENGINES`.
/// Format: comma-separated entries, each either `name` or `name=url`,
/// e.g. `tesseract,paddle=http://localhost:8866/ocr`. Order is priority.
fn parse_engine_specs(raw: &str) -> Vec<OcrEngineSpec> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (name, url) = match entry.split_once('=') {
                Some((name, url)) => (name.trim(), Some(url.trim().to_string())),
                None => (entry, None),
            };
            if name.is_empty() {
                tracing::warn!("Invalid engine entry '{}' in OCR_ENGINES, skipping", entry);
                return None;
            }
            Some(OcrEngineSpec {
                name: name.to_lowercase(),
                url: url.filter(|u| !u.is_empty()),
            })
        })
        .collect()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub ocr: OcrConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `memory` for the in-process LRU store, otherwise a libSQL URL
    /// (`file:jobs.db`, `:memory:`, `libsql://...`).
    pub url: String,
    pub auth_token: Option<String>,
    pub ttl_secs: u64,
    pub capacity: usize,
    pub purge_interval_secs: u64,
}

impl StoreConfig {
    pub fn is_in_process(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

/// One configured recognition engine. Remote engines carry the URL of
/// their HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OcrEngineSpec {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub engines: Vec<OcrEngineSpec>,
    pub languages: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub max_image_dimension: u32,
    pub min_image_dimension: u32,
    pub confidence_threshold: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engines: vec![OcrEngineSpec {
                name: "tesseract".to_string(),
                url: None,
            }],
            languages: "tha+eng".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            max_image_dimension: 4096,
            min_image_dimension: 50,
            confidence_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    pub max_image_size: usize,
    pub allowed_extensions: Vec<String>,
    pub preprocess_by_default: bool,
    pub batch_size: usize,
    pub persist_processing_status: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_image_size: 10 * 1024 * 1024,
            allowed_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            preprocess_by_default: true,
            batch_size: 10,
            persist_processing_status: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ocr_defaults = OcrConfig::default();
        let processing_defaults = ProcessingConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 8000),
                api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/ocr".to_string()),
                api_key: parse_env_opt("API_KEY"),
            },
            store: StoreConfig {
                url: env::var("JOB_STORE_URL").unwrap_or_else(|_| "memory".to_string()),
                auth_token: parse_env_opt("JOB_STORE_AUTH_TOKEN"),
                ttl_secs: parse_env_or("JOB_CACHE_TTL", 3600),
                capacity: parse_env_or("JOB_CACHE_CAPACITY", 10_000),
                purge_interval_secs: parse_env_or("JOB_CACHE_PURGE_INTERVAL", 300),
            },
            ocr: OcrConfig {
                engines: match env::var("OCR_ENGINES") {
                    Ok(raw) if !raw.trim().is_empty() => parse_engine_specs(&raw),
                    _ => ocr_defaults.engines,
                },
                languages: env::var("OCR_LANGUAGES").unwrap_or(ocr_defaults.languages),
                timeout_secs: parse_env_or("OCR_TIMEOUT", ocr_defaults.timeout_secs),
                max_retries: parse_env_or("OCR_MAX_RETRIES", ocr_defaults.max_retries),
                max_image_dimension: parse_env_or(
                    "OCR_MAX_DIMENSION",
                    ocr_defaults.max_image_dimension,
                ),
                min_image_dimension: parse_env_or(
                    "OCR_MIN_DIMENSION",
                    ocr_defaults.min_image_dimension,
                ),
                confidence_threshold: parse_env_or(
                    "OCR_CONFIDENCE_THRESHOLD",
                    ocr_defaults.confidence_threshold,
                ),
            },
            processing: ProcessingConfig {
                max_image_size: parse_env_or("MAX_IMAGE_SIZE", processing_defaults.max_image_size),
                allowed_extensions: match env::var("ALLOWED_EXTENSIONS") {
                    Ok(raw) if !raw.trim().is_empty() => parse_list(&raw),
                    _ => processing_defaults.allowed_extensions,
                },
                preprocess_by_default: parse_env_or(
                    "IMAGE_PREPROCESSING",
                    processing_defaults.preprocess_by_default,
                ),
                batch_size: parse_env_or("BATCH_SIZE", processing_defaults.batch_size),
                persist_processing_status: parse_env_or(
                    "PERSIST_PROCESSING_STATUS",
                    processing_defaults.persist_processing_status,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
