use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::scrapers::{SourceConfig, SourceKind};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/news_bot.db";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub channel_id: String,
    pub database_url: String,
    pub http_port: u16,
    pub debug: bool,
    pub check_interval: Duration,
    pub request_timeout: Duration,
    pub send_delay: Duration,
    pub max_text_length: usize,
    pub max_posts_per_check: Option<usize>,
    pub user_agent: String,
    pub sources: Vec<SourceConfig>,
    pub html_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let debug = parse_bool("DEBUG")?;

        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;
        // Tokens pasted from docs sometimes carry a trailing `# comment`.
        let token = token.split('#').next().unwrap_or_default().trim().to_string();
        if token.is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let channel_var = if debug { "TEST_CHANNEL_ID" } else { "TELEGRAM_CHANNEL_ID" };
        let channel_id = env::var(channel_var)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if channel_id.is_empty() {
            return Err(anyhow!("{} must be set", channel_var));
        }

        let database_url = Self::database_url_from_env(debug);

        let http_port = parse_number("HTTP_PORT", 3000u16)?;
        let check_interval = parse_number("CHECK_INTERVAL", 300u64)?;
        if check_interval == 0 {
            return Err(anyhow!("Invalid CHECK_INTERVAL: must be greater than zero"));
        }
        let request_timeout = parse_number("REQUEST_TIMEOUT", 30u64)?;
        if request_timeout == 0 {
            return Err(anyhow!("Invalid REQUEST_TIMEOUT: must be greater than zero"));
        }
        let send_delay = parse_number("SEND_DELAY", 5u64)?;
        let max_text_length = parse_number("MAX_TEXT_LENGTH", 4000usize)?;
        let max_posts_per_check = match parse_number("MAX_POSTS_PER_CHECK", 0usize)? {
            0 => None,
            n => Some(n),
        };

        let user_agent = env::var("USER_AGENT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let sources = match env::var("SOURCES") {
            Ok(raw) if !raw.trim().is_empty() => parse_sources(&raw)?,
            _ => SourceConfig::defaults(),
        };

        let html_dir = if parse_bool("SAVE_HTML")? {
            let dir = env::var("HTML_DIR").unwrap_or_else(|_| "html_articles".to_string());
            Some(PathBuf::from(dir.trim()))
        } else {
            None
        };

        Ok(Config {
            telegram_bot_token: token,
            channel_id,
            database_url,
            http_port,
            debug,
            check_interval: Duration::from_secs(check_interval),
            request_timeout: Duration::from_secs(request_timeout),
            send_delay: Duration::from_secs(send_delay),
            max_text_length,
            max_posts_per_check,
            user_agent,
            sources,
            html_dir,
        })
    }

    /// Database location only, for tools that never talk to Telegram.
    pub fn database_url_from_env(debug: bool) -> String {
        let var = if debug { "TEST_DATABASE_URL" } else { "DATABASE_URL" };
        match env::var(var) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Parses `SOURCES`, a comma separated list of `kind` or `kind=url`.
pub fn parse_sources(raw: &str) -> Result<Vec<SourceConfig>> {
    let mut sources = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, url) = match entry.split_once('=') {
            Some((name, url)) => (name.trim(), Some(url.trim())),
            None => (entry, None),
        };
        let kind: SourceKind = name
            .parse()
            .map_err(|_| anyhow!("Invalid SOURCES entry `{}`: unknown source", entry))?;
        let url = match url {
            Some(u) if !u.is_empty() => {
                url::Url::parse(u)
                    .map_err(|e| anyhow!("Invalid SOURCES entry `{}`: {}", entry, e))?;
                u.to_string()
            }
            _ => kind.default_url().to_string(),
        };
        sources.push(SourceConfig { kind, url });
    }
    if sources.is_empty() {
        return Err(anyhow!("Invalid SOURCES: no sources configured"));
    }
    Ok(sources)
}

fn parse_bool(var: &str) -> Result<bool> {
    match env::var(var) {
        Ok(v) => match v.trim().to_lowercase().as_str() {
            "" | "false" | "0" | "no" => Ok(false),
            "true" | "1" | "yes" => Ok(true),
            _ => Err(anyhow!("Invalid {}", var)),
        },
        Err(_) => Ok(false),
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {}", var)),
        _ => Ok(default),
    }
}
