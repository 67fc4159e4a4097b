use std::sync::Arc;

use crate::catalog::TabGroup;
use crate::content::Post;

pub const ALL_TAB: &str = "all";

/// Tab selected on the post list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PostTab {
    #[default]
    All,
    Named(String),
}

impl PostTab {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(ALL_TAB) => PostTab::All,
            Some(name) => PostTab::Named(name.to_string()),
        }
    }

    /// Unknown tab names fall back to `All`.
    pub fn normalize(self, groups: &[TabGroup]) -> Self {
        match self {
            PostTab::Named(ref name) if groups.iter().any(|g| &g.name == name) => self,
            _ => PostTab::All,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PostTab::All => ALL_TAB,
            PostTab::Named(name) => name.as_str(),
        }
    }
}

pub struct TabFilter;

impl TabFilter {
    /// `All` is the full list, a named tab is its group. A name without a group shows nothing.
    pub fn apply<'a>(tab: &PostTab, default_posts: &'a [Arc<Post>], groups: &'a [TabGroup]) -> &'a [Arc<Post>] {
        match tab {
            PostTab::All => default_posts,
            PostTab::Named(name) => groups.iter()
                .find(|g| &g.name == name)
                .map(|g| g.posts.as_slice())
                .unwrap_or(&[]),
        }
    }
}
