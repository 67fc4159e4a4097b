use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use blogtab::config::{read_config, Config};

use crate::CFG_FILE_NAME;

const CONFIG_SAMPLE: &str = r#"# For the file locations, if you want it to be relative to the executable directory
# use ${exe_dir}/location
[site]
title = "dev log"
author = "Your Name"
summary = "Notes about what I am learning"
# File inside public_dir, or a full url
avatar = "avatar.svg"
site_url = "https://blog.example.com"

[paths]
template_dir = "res/template"
public_dir = "res/public"
posts_dir = "res/posts"

[defaults]
# Base name of the post file when a post is a directory
index_base_name = "index"
# Posts revealed at once on the list
page_size = 10
excerpt_length = 160
toc_depth = 3
# series or tags
tab_grouping = "series"
date_format = "%Y.%m.%d"
rendering_cache_enabled = true

[server]
address = "0.0.0.0"
port = 8001

[log]
level = "Info"
log_to_console = true

# [comments]
# repo = "user/repository"

# [sponsor]
# href = "https://www.buymeacoffee.com/user"
# text = "Buy me a coffee"

[rss_feed]
title = "dev log"
site_url = "https://blog.example.com"
description = "Notes about what I am learning"
page_size = 20
"#;

fn get_config_path() -> Result<Option<PathBuf>> {
    let exe_path = env::current_exe()?;
    let exe_dir = exe_path.parent().ok_or_else(|| anyhow!("Executable has no parent directory"))?;
    let cur_dir = env::current_dir()?;

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Ok(Some(exe_dir.join(CFG_FILE_NAME)));
    }

    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Ok(Some(cur_dir.join(CFG_FILE_NAME)));
    }

    if let Some(cfg_dir) = dirs::config_dir() {
        if cfg_dir.join(CFG_FILE_NAME).exists() {
            return Ok(Some(cfg_dir.join(CFG_FILE_NAME)));
        }
    }

    Ok(None)
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path {
        Some(path) => path,
        None => get_config_path()?.ok_or_else(|| anyhow!("Could not find {} configuration", CFG_FILE_NAME))?,
    };

    println!("Current dir: {}", env::current_dir()?.display());
    println!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path)?;

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            let cache_dir = dirs::cache_dir().context("Could not find user cache dir for the log")?;
            log.location = Some(cache_dir.join("blogtab").join("log").join("server.log"));
        }
        if let Some(ref location) = log.location {
            println!("Log enabled. Files will be written in {}", location.display());
        }
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

pub(crate) fn write_sample_config(cfg_path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match cfg_path {
        Some(path) => path,
        None => dirs::config_dir()
            .context("Could not find user config dir")?
            .join(CFG_FILE_NAME),
    };

    if path.exists() {
        return Err(anyhow!("{} already exists", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, CONFIG_SAMPLE)
        .with_context(|| format!("Error writing {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use blogtab::config::parse_config;
    use blogtab::config::TabGrouping;

    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config = parse_config(CONFIG_SAMPLE).unwrap();
        assert_eq!(config.site.avatar.as_deref(), Some("avatar.svg"));
        assert_eq!(config.defaults.page_size, 10);
        assert_eq!(config.defaults.tab_grouping, TabGrouping::Series);
        assert!(config.comments.is_none());
        assert_eq!(config.rss_feed.unwrap().page_size, 20);
    }
}
