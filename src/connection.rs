pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

fn base_url_default() -> String {
    crate::openai::DEFAULT_BASE_URL.to_string()
}

const fn request_timeout_secs_default() -> u64 {
    30
}

#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    #[serde(default = "base_url_default")]
    pub base_url: String,
    #[serde(default = "request_timeout_secs_default")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: base_url_default(),
            request_timeout_secs: request_timeout_secs_default(),
        }
    }
}

impl Config {
    pub fn load(path: &std::path::Path) -> Result<Self, anyhow::Error> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Ok(toml::from_str::<Config>(std::str::from_utf8(&std::fs::read(path)?)?)?)
    }
}

fn resolve_api_key(config: &Config, env: Option<String>) -> Result<String, anyhow::Error> {
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or(env.filter(|k| !k.is_empty()))
        .ok_or_else(|| anyhow::format_err!("api_key must be configured, or set {}", API_KEY_ENV))
}

pub fn connect(config: &Config) -> Result<crate::openai::Client, anyhow::Error> {
    let api_key = match resolve_api_key(config, std::env::var(API_KEY_ENV).ok()) {
        Ok(api_key) => api_key,
        Err(e) => {
            log::error!("connection error: {}", e);
            return Err(e);
        }
    };
    Ok(crate::openai::Client::new(
        api_key,
        config.base_url.clone(),
        std::time::Duration::from_secs(config.request_timeout_secs),
    )?)
}
