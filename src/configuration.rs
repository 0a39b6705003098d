use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub scraper: ScraperSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct ScraperSettings {
    /// Listing page the `pg` query parameter gets appended to.
    pub base_url: String,
    /// Identity pool rotated across requests.
    pub user_agents: Vec<String>,
    pub accept_language: String,
    /// Backoff window (seconds) for 429 responses.
    pub backoff_min_secs: u64,
    pub backoff_max_secs: u64,
    /// Pacing window (seconds) between page fetches.
    pub page_delay_min_secs: u64,
    pub page_delay_max_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub default_pages: u32,
    pub data_file: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
