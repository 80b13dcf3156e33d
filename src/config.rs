use crate::api::BackendClient;
use crate::auth::supabase::SupabaseAuth;
use crate::booking::PricingTable;
use crate::catalog::CategoryKey;
use crate::geo::fence::{HYDERABAD, HYDERABAD_CENTER};
use crate::geo::{
    Coordinate, GeoFence, GeolocationResolver, IpLocator, Locator, NominatimGeocoder,
    PositionOptions,
};
use crate::keymap::Keymap;
use crate::styles::ThemeType;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const BACKEND_URL_ENV: &str = "SERVICEBAY_BACKEND_URL";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const GEOCODING_API_KEY_ENV: &str = "SERVICEBAY_GEOCODING_API_KEY";

/// Only debug builds fall back to a local backend.
#[cfg(debug_assertions)]
const DEV_BACKEND_URL: Option<&str> = Some("http://localhost:8085");
#[cfg(not(debug_assertions))]
const DEV_BACKEND_URL: Option<&str> = None;

/// The geolocation resolver as assembled from configuration.
pub type Resolver = GeolocationResolver<Locator, NominatimGeocoder>;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub keymap: Keymap,
    #[serde(default)]
    pub theme: ThemeType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the booking/task REST service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Supabase project URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Public anon key sent as the `apikey` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Nominatim's usage policy asks for an identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            api_key: None,
            language: default_language(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProviderKind {
    /// No position source
    None,
    /// A fixed coordinate from `location.fixed`
    Fixed,
    /// Coarse IP lookup
    #[default]
    Ip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub provider: LocationProviderKind,
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Coordinate>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
    #[serde(default)]
    pub maximum_age_ms: u64,
    /// Service area; fixes outside it are replaced by `fallback`
    #[serde(default = "default_fence")]
    pub fence: GeoFence,
    #[serde(default = "default_fallback")]
    pub fallback: Coordinate,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: LocationProviderKind::default(),
            ip_lookup_url: default_ip_lookup_url(),
            fixed: None,
            timeout_ms: default_timeout_ms(),
            high_accuracy: default_high_accuracy(),
            maximum_age_ms: 0,
            fence: default_fence(),
            fallback: default_fallback(),
        }
    }
}

impl LocationConfig {
    pub fn options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Premium multiplier per category. Entries in the file are layered over
    /// the built-in ones; a category without one has no premium tier.
    #[serde(default = "PricingTable::default_premium", deserialize_with = "merge_premium")]
    pub premium: BTreeMap<CategoryKey, f64>,
    /// Categories whose premium tier is switched off, built-in or not.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_premium: Vec<CategoryKey>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            premium: PricingTable::default_premium(),
            no_premium: Vec::new(),
        }
    }
}

fn merge_premium<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<CategoryKey, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut premium = PricingTable::default_premium();
    premium.extend(BTreeMap::<CategoryKey, f64>::deserialize(deserializer)?);
    Ok(premium)
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_user_agent() -> String {
    format!("servicebay/{}", env!("CARGO_PKG_VERSION"))
}

fn default_ip_lookup_url() -> String {
    "https://ipapi.co/json/".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_high_accuracy() -> bool {
    true
}

fn default_fence() -> GeoFence {
    HYDERABAD
}

fn default_fallback() -> Coordinate {
    HYDERABAD_CENTER
}

impl Config {
    /// Load configuration from file or create default
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?
        } else {
            info!("No config at {:?}, writing defaults", config_path);
            let config = Self::default();
            config.save(config_path)?;
            config
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the file, then apply environment overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config = Self::load_or_create(config_path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay values from `lookup` (the process environment in production).
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(BACKEND_URL_ENV) {
            debug!("{} overrides backend.base_url", BACKEND_URL_ENV);
            self.backend.base_url = Some(url);
        }
        if let Some(url) = get(SUPABASE_URL_ENV) {
            self.auth.url = Some(url);
        }
        if let Some(key) = get(SUPABASE_ANON_KEY_ENV) {
            self.auth.anon_key = Some(key);
        }
        if let Some(key) = get(GEOCODING_API_KEY_ENV) {
            self.geocoding.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let location = &self.location;
        if !location.fence.is_valid() {
            bail!(
                "Invalid location.fence: expected west <= east and south <= north, got {:?}",
                location.fence
            );
        }
        if !location.fence.contains(location.fallback) {
            bail!(
                "location.fallback ({}) must lie inside location.fence",
                location.fallback
            );
        }
        if location.timeout_ms == 0 {
            bail!("location.timeout_ms must be greater than zero");
        }
        if location.provider == LocationProviderKind::Fixed && location.fixed.is_none() {
            bail!("location.provider = \"fixed\" requires location.fixed {{ latitude, longitude }}");
        }
        for (category, multiplier) in &self.pricing.premium {
            if !multiplier.is_finite() || *multiplier <= 0.0 {
                bail!(
                    "pricing.premium.{} must be a positive number, got {}",
                    category,
                    multiplier
                );
            }
        }
        Ok(())
    }

    /// Save configuration to file with secure permissions
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        // Set secure permissions (600: owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(config_path)
                .with_context(|| format!("Failed to get file metadata: {:?}", config_path))?
                .permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(config_path, perms)
                .with_context(|| format!("Failed to set file permissions: {:?}", config_path))?;
        }

        Ok(())
    }

    /// The configured backend URL, or the local development default.
    pub fn backend_url(&self) -> Result<String> {
        self.backend
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or(DEV_BACKEND_URL)
            .map(str::to_string)
            .with_context(|| {
                format!(
                    "No backend URL configured. Set {} or [backend] base_url",
                    BACKEND_URL_ENV
                )
            })
    }

    pub fn pricing_table(&self) -> PricingTable {
        let mut premium = self.pricing.premium.clone();
        for category in &self.pricing.no_premium {
            premium.remove(category);
        }
        PricingTable::new(premium)
    }

    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .user_agent(self.geocoding.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")
    }

    pub fn backend_client(&self, http_client: Client) -> Result<BackendClient> {
        BackendClient::new(http_client, &self.backend_url()?)
    }

    pub fn identity_provider(&self, http_client: Client, session_path: Option<PathBuf>) -> Result<SupabaseAuth> {
        SupabaseAuth::new(
            http_client,
            self.auth.url.as_deref(),
            self.auth.anon_key.as_deref(),
            session_path,
        )
    }

    pub fn locator(&self, http_client: Client) -> Result<Locator> {
        let location = &self.location;
        Ok(match location.provider {
            LocationProviderKind::None => Locator::Unavailable,
            LocationProviderKind::Fixed => Locator::Fixed(
                location
                    .fixed
                    .context("location.provider = \"fixed\" requires location.fixed")?,
            ),
            LocationProviderKind::Ip => {
                Locator::Ip(IpLocator::new(http_client, location.ip_lookup_url.clone()))
            }
        })
    }

    pub fn geocoder(&self, http_client: Client) -> NominatimGeocoder {
        NominatimGeocoder::new(
            http_client,
            self.geocoding.base_url.clone(),
            self.geocoding.language.clone(),
        )
        .with_api_key(self.geocoding.api_key.clone())
    }

    pub fn resolver(&self, http_client: Client) -> Result<Resolver> {
        let locator = self.locator(http_client.clone())?;
        Ok(GeolocationResolver::new(
            locator,
            self.geocoder(http_client),
            self.location.fence,
            self.location.fallback,
        )
        .with_options(self.location.options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.backend.base_url = Some("http://api.example.test".to_string());
        config.save(&config_path).unwrap();

        let loaded = Config::load_or_create(&config_path).unwrap();
        assert_eq!(loaded.backend.base_url.as_deref(), Some("http://api.example.test"));
        assert_eq!(loaded.pricing.premium, PricingTable::default_premium());
        assert_eq!(loaded.location.fence, HYDERABAD);
    }

    #[test]
    fn test_missing_file_is_created_with_secure_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        Config::load_or_create(&config_path).unwrap();
        assert!(config_path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&config_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let config: Config = toml::from_str(
            r#"
            theme = "light"

            [location]
            provider = "fixed"
            fixed = { latitude = 17.44, longitude = 78.38 }
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.theme, ThemeType::Light);
        assert_eq!(config.location.timeout_ms, 10_000);
        assert_eq!(config.geocoding.language, "en");
        assert!(matches!(config.locator(Client::new()).unwrap(), Locator::Fixed(_)));
    }

    #[test]
    fn test_inverted_fence_is_rejected() {
        let mut config = Config::default();
        config.location.fence = GeoFence::new(78.62, 17.55, 78.30, 17.25);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("west <= east"));
    }

    #[test]
    fn test_fallback_outside_fence_is_rejected() {
        let mut config = Config::default();
        config.location.fallback = Coordinate::new(12.97, 77.59);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_multiplier_is_rejected() {
        let mut config = Config::default();
        config.pricing.premium.insert(CategoryKey::BatteryCheck, 0.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pricing.premium.battery-check"));
    }

    #[test]
    fn test_premium_entries_extend_the_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pricing]
            no_premium = ["balancing"]

            [pricing.premium]
            battery-check = 1.1
            oil-change = 1.3
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        let table = config.pricing_table();
        assert_eq!(table.premium_multiplier(CategoryKey::TyreChange), Some(1.25));
        assert_eq!(table.premium_multiplier(CategoryKey::WheelAlignment), Some(1.2));
        assert_eq!(table.premium_multiplier(CategoryKey::OilChange), Some(1.3));
        assert_eq!(table.premium_multiplier(CategoryKey::BatteryCheck), Some(1.1));
        assert_eq!(table.premium_multiplier(CategoryKey::Balancing), None);
    }

    #[test]
    fn test_fixed_provider_needs_a_coordinate() {
        let mut config = Config::default();
        config.location.provider = LocationProviderKind::Fixed;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = Config::default();
        config.auth.url = Some("https://file.supabase.co".to_string());
        config.apply_overrides(|name| match name {
            SUPABASE_URL_ENV => Some("https://env.supabase.co".to_string()),
            BACKEND_URL_ENV => Some("  ".to_string()),
            GEOCODING_API_KEY_ENV => Some("k-123".to_string()),
            _ => None,
        });
        assert_eq!(config.auth.url.as_deref(), Some("https://env.supabase.co"));
        assert_eq!(config.backend.base_url, None);
        assert_eq!(config.geocoding.api_key.as_deref(), Some("k-123"));
    }

    #[test]
    fn test_configured_backend_url_wins() {
        let mut config = Config::default();
        config.backend.base_url = Some(" http://bookings.internal:9000 ".to_string());
        assert_eq!(config.backend_url().unwrap(), "http://bookings.internal:9000");
    }

    #[test]
    fn test_position_options_from_config() {
        let mut config = Config::default();
        config.location.maximum_age_ms = 30_000;
        let options = config.location.options();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(30));
        assert!(options.high_accuracy);
    }
}
