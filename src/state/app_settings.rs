use log::LevelFilter;

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Service base URL; `PMTUI_API_URL` overrides the client default.
    pub api_url: Option<String>,
    /// Device token pushed after login when set (`PMTUI_NOTIFY_TOKEN`).
    pub notify_token: Option<String>,
}

impl AppSettings {
    pub fn load() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: non_empty_env("PMTUI_API_URL"),
            notify_token: non_empty_env("PMTUI_NOTIFY_TOKEN"),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
