use std::path::PathBuf;

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// Files served under `/static`.
    pub assets_dir: PathBuf,
    /// Built frontend bundle.
    pub dist_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            db_path: PathBuf::from("data/ruuturetki.redb"),
            assets_dir: PathBuf::from("assets"),
            dist_dir: PathBuf::from("dist"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or unparsable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Config {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            db_path: lookup("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            assets_dir: lookup("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            dist_dir: lookup("DIST_DIR").map(PathBuf::from).unwrap_or(defaults.dist_dir),
        }
    }

    pub fn index_html(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }
}
