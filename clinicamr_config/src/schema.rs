use std::path::{Path, PathBuf};

use clinicamr_core::CuiFormat;
use clinicamr_core::annotate::DEFAULT_ID_PREFIX;
use clinicamr_core::mimic::DEFAULT_SECTION_HEADERS;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
    #[serde(default)]
    pub sections: SectionsConfig,
    #[serde(default)]
    pub admission: AdmissionConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

/// The MIMIC-III note events database.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "CorpusConfig::default_database")]
    pub database: PathBuf,
    /// CSV of `hadm_id,row_id` pairs of notes chosen for annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_notes: Option<PathBuf>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            database: Self::default_database(),
            annotated_notes: None,
        }
    }
}

impl CorpusConfig {
    fn default_database() -> PathBuf {
        Config::data_dir().join("mimic3.sqlite3")
    }
}

/// The SPRING AMR parse service.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ParserConfig {
    #[serde(default = "ParserConfig::default_url")]
    pub url: String,
    #[serde(default = "ParserConfig::default_model")]
    pub model: String,
    #[serde(default = "ParserConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delays in milliseconds between the first retries of a failed request.
    #[serde(default = "ParserConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,
    /// Further retries at the last delay once `retry_delays_ms` runs out.
    #[serde(default = "ParserConfig::default_final_retries")]
    pub final_retries: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            model: Self::default_model(),
            timeout_secs: Self::default_timeout_secs(),
            retry_delays_ms: Self::default_retry_delays_ms(),
            final_retries: Self::default_final_retries(),
        }
    }
}

impl ParserConfig {
    fn default_url() -> String {
        "http://localhost:8080".to_string()
    }

    fn default_model() -> String {
        "spring".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        300
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![1000, 2000, 4000]
    }

    const fn default_final_retries() -> usize {
        2
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnnotationConfig {
    #[serde(default = "AnnotationConfig::default_token_index_role")]
    pub token_index_role: String,
    #[serde(default = "AnnotationConfig::default_cui_role")]
    pub cui_role: String,
    #[serde(default)]
    pub cui_format: CuiFormat,
    #[serde(default = "AnnotationConfig::default_add_id")]
    pub add_id: bool,
    #[serde(default = "AnnotationConfig::default_id_prefix")]
    pub id_prefix: String,
    /// Maximum paragraphs annotated per section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_limit: Option<usize>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            token_index_role: Self::default_token_index_role(),
            cui_role: Self::default_cui_role(),
            cui_format: CuiFormat::default(),
            add_id: Self::default_add_id(),
            id_prefix: Self::default_id_prefix(),
            paragraph_limit: None,
        }
    }
}

impl AnnotationConfig {
    fn default_token_index_role() -> String {
        "toki".to_string()
    }

    fn default_cui_role() -> String {
        "cui".to_string()
    }

    const fn default_add_id() -> bool {
        true
    }

    fn default_id_prefix() -> String {
        DEFAULT_ID_PREFIX.to_string()
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Database,
    Directory,
}

/// Where annotated paragraphs are kept between runs.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "CacheConfig::default_url")]
    pub url: String,
    #[serde(default = "CacheConfig::default_directory")]
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            url: Self::default_url(),
            directory: Self::default_directory(),
        }
    }
}

impl CacheConfig {
    fn default_url() -> String {
        format!(
            "sqlite://{}?mode=rwc",
            Config::data_dir().join("paragraphs.db").display()
        )
    }

    fn default_directory() -> PathBuf {
        Config::data_dir().join("paragraphs")
    }
}

/// CSV lexicon (`term,cui,pref_name,ent`) used to link concepts.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct LexiconConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SectionsConfig {
    #[serde(default = "SectionsConfig::default_headers")]
    pub headers: Vec<String>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            headers: Self::default_headers(),
        }
    }
}

impl SectionsConfig {
    fn default_headers() -> Vec<String> {
        DEFAULT_SECTION_HEADERS.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdmissionConfig {
    /// Discharge summary sections kept in admission documents; empty keeps
    /// every section.
    #[serde(default = "AdmissionConfig::default_summary_sections")]
    pub summary_sections: Vec<String>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            summary_sections: Self::default_summary_sections(),
        }
    }
}

impl AdmissionConfig {
    fn default_summary_sections() -> Vec<String> {
        [
            "chief-complaint",
            "history-of-present-illness",
            "past-medical-history",
            "brief-hospital-course",
            "discharge-diagnosis",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlotConfig {
    #[serde(default = "PlotConfig::default_path")]
    pub path: PathBuf,
    /// Models whose plots are proofed next to the parser's.
    #[serde(default = "PlotConfig::default_comparison_models")]
    pub comparison_models: Vec<String>,
    /// Base URL that proofing spreadsheet links point to.
    #[serde(default = "PlotConfig::default_proofing_url")]
    pub proofing_url: String,
    #[serde(default)]
    pub annotators: Vec<String>,
    /// Command that renders a DOT file to PDF, such as `dot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_command: Option<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            comparison_models: Self::default_comparison_models(),
            proofing_url: Self::default_proofing_url(),
            annotators: Vec::new(),
            render_command: None,
        }
    }
}

impl PlotConfig {
    fn default_path() -> PathBuf {
        Config::data_dir().join("plot")
    }

    fn default_comparison_models() -> Vec<String> {
        vec!["t5".to_string(), "gsii".to_string()]
    }

    fn default_proofing_url() -> String {
        "http://localhost:8000/proof".to_string()
    }
}

impl Config {
    /// Directory holding the config file and default data paths.
    #[must_use]
    pub fn data_dir() -> PathBuf {
        dirs::home_dir().map_or_else(|| PathBuf::from("clinicamr"), |home| home.join("clinicamr"))
    }

    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'clinicamr init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_json::from_str(&content)?;
        debug!("loaded config from {}", config_path.display());

        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::data_dir();
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        Self::ensure_config_dir()?;
        let config_path = Self::default_path();
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Point corpus.database at the MIMIC-III SQLite database");
        println!("   2. Start the SPRING parse service at parser.url");
        println!("   3. Run 'clinicamr parse' to check the parser");
        println!();
        Ok(())
    }

    /// Write the default configuration to `config_path`, which must not exist.
    pub fn write_template(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }
        std::fs::write(config_path, serde_json::to_string_pretty(&Self::default())?)?;
        Ok(())
    }

    /// Configured summary sections, or `None` to keep every section.
    #[must_use]
    pub fn summary_sections(&self) -> Option<std::collections::HashSet<String>> {
        if self.admission.summary_sections.is_empty() {
            None
        } else {
            Some(self.admission.summary_sections.iter().cloned().collect())
        }
    }
}
