use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::content::toc::TableOfContents;

pub mod content_file;
pub mod content_renderer;
pub mod markdown_renderer;
pub mod parsing_utils;
pub mod toc;

/// A post as read from disk and rendered. Immutable once loaded.
pub struct Post {
    pub header: PostHeader,
    pub slug: String,
    pub title: String,
    pub rendered: String,
    pub excerpt: String,
    pub toc: TableOfContents,
    pub time_to_read: u32,
}

impl Post {
    /// Description from the header, or the generated excerpt
    pub fn summary(&self) -> &str {
        match self.header.description {
            Some(ref description) if !description.is_empty() => description.as_str(),
            _ => self.excerpt.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostHeader {
    pub file_name: PathBuf,
    pub id: PostId,
    pub date: NaiveDateTime,
    pub author: String,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);
