//! The one piece of client-side persistence: the authenticated user,
//! stored as a single JSON record in the config directory.

use pickup_api::User;
use std::path::PathBuf;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open() -> Self {
        Self { path: session_path() }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Option<User> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self, user: &User) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let payload = serde_json::to_string_pretty(user)
            .map_err(|e| format!("serialize session failed: {e}"))?;
        std::fs::write(&self.path, payload).map_err(|e| format!("write session failed: {e}"))?;
        Ok(())
    }

    pub fn clear(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn session_path() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("pmtui").join("session.json");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home)
            .join(".config")
            .join("pmtui")
            .join("session.json");
    }
    PathBuf::from("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir()
            .join(format!("pmtui-session-test-{name}-{}", std::process::id()))
            .join("session.json");
        let _ = std::fs::remove_file(&path);
        SessionStore::at(path)
    }

    #[test]
    fn round_trips_the_user_record() {
        let store = temp_store("roundtrip");
        assert!(store.load().is_none());

        let user = User {
            id: "u1".into(),
            username: "ana".into(),
            email: "ana@test.com".into(),
            ..User::default()
        };
        store.save(&user).unwrap();
        assert_eq!(store.load(), Some(user));

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_reads_as_no_session() {
        let store = temp_store("corrupt");
        if let Some(parent) = store.path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&store.path, "{not json").unwrap();
        assert!(store.load().is_none());
        store.clear();
    }
}
