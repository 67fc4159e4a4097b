use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Site {
    pub title: String,
    pub author: String,
    pub summary: Option<String>,
    /// File name inside `public_dir`. The avatar is skipped when missing.
    pub avatar: Option<String>,
    pub site_url: Option<String>,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub posts_dir: PathBuf,
}

#[derive(Deserialize, Copy, Clone, PartialEq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum TabGrouping {
    #[default]
    Series,
    Tags,
}

#[derive(Deserialize)]
pub struct Defaults {
    pub index_base_name: Option<String>,
    pub page_size: u32,
    pub excerpt_length: Option<usize>,
    pub toc_depth: Option<u32>,
    #[serde(default)]
    pub tab_grouping: TabGrouping,
    pub date_format: Option<String>,
    pub rendering_cache_enabled: bool,
}

impl Defaults {
    pub fn index_base_name(&self) -> &str {
        self.index_base_name.as_deref().unwrap_or("index")
    }

    pub fn excerpt_length(&self) -> usize {
        self.excerpt_length.unwrap_or(160)
    }

    pub fn toc_depth(&self) -> u32 {
        self.toc_depth.unwrap_or(3)
    }

    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or("%Y.%m.%d")
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Utterances comment widget
#[derive(Deserialize)]
pub struct Comments {
    pub repo: String,
    pub light_theme: Option<String>,
    pub dark_theme: Option<String>,
}

#[derive(Deserialize)]
pub struct Sponsor {
    pub href: String,
    pub text: String,
}

#[derive(Deserialize)]
pub struct RssFeed {
    pub title: String,
    /// Falls back to `site.site_url`
    pub site_url: Option<String>,
    pub description: String,
    pub page_size: u32,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub defaults: Defaults,
    pub server: Server,
    pub log: Option<Log>,
    pub comments: Option<Comments>,
    pub sponsor: Option<Sponsor>,
    pub rss_feed: Option<RssFeed>,
}

impl Config {
    /// Base url of the links in the feed.
    pub fn feed_site_url(&self) -> &str {
        self.rss_feed.as_ref()
            .and_then(|feed| feed.site_url.as_deref())
            .or(self.site.site_url.as_deref())
            .unwrap_or("")
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
    let str_path = path.to_string_lossy();
    Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if cfg.defaults.page_size == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "defaults.page_size has to be greater than 0"));
    }

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
        posts_dir: parse_path(cfg.paths.posts_dir)?,
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
