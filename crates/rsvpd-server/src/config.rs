use rsvpd_core::{Cohort, EventOccurrence, Publication};
use rsvpd_relay::{ImageHostConfig, RelayEndpoint};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Admin surface configuration (shared password)
    #[serde(default)]
    pub admin: AdminConfig,
    /// Submission validation limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Event occurrences
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Publication roster for cohort classification
    #[serde(default = "default_publications")]
    pub publications: Vec<PublicationConfig>,
    /// Outbound mirror configuration
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Default for AppConfig {
    // Mirror the serde field defaults so `AppConfig::default()` matches a
    // deserialized empty document.
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            admin: AdminConfig::default(),
            limits: LimitsConfig::default(),
            catalog: CatalogConfig::default(),
            publications: default_publications(),
            relay: RelayConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Admin validation
        if self.admin.password.is_empty() {
            return Err("admin.password must not be empty".into());
        }
        // Limits validation
        if self.limits.bio_word_limit == 0 {
            return Err("limits.bio_word_limit must be > 0".into());
        }
        // Catalog validation (shares the core rules)
        self.event_catalog()
            .map_err(|e| format!("catalog config error: {e}"))?;
        // Publications validation
        if self.publications.is_empty() {
            return Err("publications must not be empty".into());
        }
        for publication in &self.publications {
            Cohort::from_str(&publication.lean)
                .map_err(|e| format!("publications config error: {e}"))?;
        }
        // Relay validation
        for endpoint in &self.relay.endpoints {
            if endpoint.url.is_empty() {
                return Err("relay.endpoints entries must have a url".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Build the immutable event catalog from configuration.
    pub fn event_catalog(&self) -> rsvpd_core::Result<rsvpd_core::EventCatalog> {
        rsvpd_core::EventCatalog::new(
            self.catalog
                .occurrences
                .iter()
                .map(|o| {
                    EventOccurrence::new(o.id.clone(), o.label.clone(), o.location.clone())
                        .with_capacity(o.capacity)
                })
                .collect(),
        )
    }

    /// Build the publication roster from configuration.
    pub fn publication_roster(&self) -> rsvpd_core::Result<Vec<Publication>> {
        self.publications
            .iter()
            .map(|p| Ok(Publication::new(p.name.clone(), Cohort::from_str(&p.lean)?)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL for the server, used in links and responses.
    /// If not set, defaults to http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    // Submissions carry inline photos; allow a generous body.
    16 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Local durable store configuration. Without a path the store is
/// memory-only and state is lost on restart.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

/// Admin surface configuration.
///
/// The single shared password is compared verbatim on every admin request.
/// This matches the source system and is explicitly not hardened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_password() -> String {
    "change-me".into()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: default_admin_password(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_bio_word_limit")]
    pub bio_word_limit: usize,
    #[serde(default = "default_photo_max_bytes")]
    pub photo_max_bytes: usize,
}

fn default_bio_word_limit() -> usize {
    250
}
fn default_photo_max_bytes() -> usize {
    10_000_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            bio_word_limit: default_bio_word_limit(),
            photo_max_bytes: default_photo_max_bytes(),
        }
    }
}

impl From<LimitsConfig> for rsvpd_store::SubmissionLimits {
    fn from(cfg: LimitsConfig) -> Self {
        Self {
            bio_word_limit: cfg.bio_word_limit,
            photo_max_bytes: cfg.photo_max_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_occurrences")]
    pub occurrences: Vec<OccurrenceConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            occurrences: default_occurrences(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceConfig {
    pub id: String,
    pub label: String,
    pub location: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    14
}

fn default_occurrences() -> Vec<OccurrenceConfig> {
    [
        ("date1", "March 19, 2026", "New York"),
        ("date2", "May 22, 2026", "New York"),
        ("date3", "August 19, 2026", "Orange County"),
        ("date4", "October 23, 2026", "New York"),
        ("date5", "December 8, 2026", "New York"),
    ]
    .into_iter()
    .map(|(id, label, location)| OccurrenceConfig {
        id: id.into(),
        label: label.into(),
        location: location.into(),
        capacity: default_capacity(),
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationConfig {
    pub name: String,
    /// Cohort lean: "cohort-a" | "cohort-b" | "cohort-c"
    pub lean: String,
}

fn default_publications() -> Vec<PublicationConfig> {
    [
        ("The Meridian Review", "cohort-a"),
        ("Harbor Quarterly", "cohort-a"),
        ("The Commons Ledger", "cohort-a"),
        ("The Plumb Line", "cohort-b"),
        ("Summit Dispatch", "cohort-c"),
        ("The Standard Bearer", "cohort-c"),
        ("Heritage Journal", "cohort-c"),
        ("First Principles", "cohort-c"),
        ("The Signal Fire", "cohort-c"),
    ]
    .into_iter()
    .map(|(name, lean)| PublicationConfig {
        name: name.into(),
        lean: lean.into(),
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelayConfig {
    #[serde(default)]
    pub endpoints: Vec<RelayEndpoint>,
    #[serde(default)]
    pub image_host: Option<ImageHostConfig>,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("rsvpd.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., RSVPD__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("RSVPD")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
