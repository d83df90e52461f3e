use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:kanban.db".into()),
            max_connections: parse_var("KANBAN_MAX_CONNECTIONS")?.unwrap_or(5),
            page_size: parse_var("KANBAN_PAGE_SIZE")?.unwrap_or(10),
        })
    }
}

fn parse_var(name: &str) -> Result<Option<u32>, anyhow::Error> {
    match std::env::var(name) {
        Ok(raw) => {
            let value: u32 = raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("{} must be a positive integer: {}", name, e))?;
            anyhow::ensure!(value > 0, "{} must be a positive integer", name);
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:kanban.db".into(),
            max_connections: 5,
            page_size: 10,
        }
    }
}
