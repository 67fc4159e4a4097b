use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use spdlog::{debug, warn};

use crate::config::TabGrouping;
use crate::content::Post;
use crate::content::content_file::ContentFile;
use crate::content::content_renderer::{ContentRenderer, RenderOptions};
use crate::content::markdown_renderer::MarkdownRenderer;
use crate::post_list::PostList;

pub struct CatalogOptions<'a> {
    pub index_base_name: &'a str,
    pub excerpt_length: usize,
    pub grouping: TabGrouping,
}

/// Posts sharing one tab value, newest first.
pub struct TabGroup {
    pub name: String,
    pub posts: Vec<Arc<Post>>,
}

pub struct Neighbours {
    /// The next older post
    pub previous: Option<Arc<Post>>,
    /// The next newer post
    pub next: Option<Arc<Post>>,
}

/// Every post of the blog, rendered once when the server starts.
pub struct PostCatalog {
    posts: Vec<Arc<Post>>,
    by_slug: HashMap<String, usize>,
    tab_groups: Vec<TabGroup>,
}

impl PostCatalog {
    pub fn load(posts_dir: &PathBuf, options: &CatalogOptions) -> io::Result<Self> {
        let post_list = PostList {
            root_dir: posts_dir.clone(),
            post_file: options.index_base_name.to_string(),
        };

        let mut posts = vec![];
        for link in post_list.list_post_files()? {
            let render_options = RenderOptions::for_slug(&link.slug, options.excerpt_length);
            let post = ContentFile::from_file(link.slug.clone(), link.post_path.clone())
                .and_then(|file| MarkdownRenderer::render(&file, &render_options));

            match post {
                Ok(post) => {
                    debug!("Loaded post {} from {}", post.slug, link.post_path.display());
                    posts.push(post);
                }
                Err(e) => warn!("Skipping post {}: {}", link.post_path.display(), e),
            }
        }

        Ok(Self::from_posts(posts, options.grouping))
    }

    /// A slug seen twice keeps the first post, the others are skipped.
    pub fn from_posts(posts: Vec<Post>, grouping: TabGrouping) -> Self {
        let mut seen = HashSet::new();
        let mut posts: Vec<Arc<Post>> = posts.into_iter()
            .filter(|post| {
                if seen.insert(post.slug.clone()) {
                    return true;
                }
                warn!("Skipping post {}: slug {} is already used", post.header.file_name.display(), post.slug);
                false
            })
            .map(Arc::new)
            .collect();
        posts.sort_by(|a, b| {
            b.header.date.cmp(&a.header.date).then_with(|| a.slug.cmp(&b.slug))
        });

        let by_slug = posts.iter()
            .enumerate()
            .map(|(i, post)| (post.slug.clone(), i))
            .collect();

        let tab_groups = Self::group_posts(&posts, grouping);

        PostCatalog {
            posts,
            by_slug,
            tab_groups,
        }
    }

    fn group_posts(posts: &[Arc<Post>], grouping: TabGrouping) -> Vec<TabGroup> {
        let mut groups: HashMap<&str, Vec<Arc<Post>>> = HashMap::new();
        for post in posts {
            match grouping {
                TabGrouping::Series => {
                    if let Some(ref series) = post.header.series {
                        groups.entry(series.as_str()).or_default().push(post.clone());
                    }
                }
                TabGrouping::Tags => {
                    for tag in post.header.tags.iter() {
                        groups.entry(tag.as_str()).or_default().push(post.clone());
                    }
                }
            }
        }

        let mut tab_groups: Vec<TabGroup> = groups.into_iter()
            .map(|(name, posts)| TabGroup { name: name.to_string(), posts })
            .collect();

        // Bigger groups first
        tab_groups.sort_by(|a, b| {
            b.posts.len().cmp(&a.posts.len()).then_with(|| a.name.cmp(&b.name))
        });
        tab_groups
    }

    /// Newest first
    pub fn posts(&self) -> &[Arc<Post>] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, slug: &str) -> Option<&Arc<Post>> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    pub fn tab_groups(&self) -> &[TabGroup] {
        &self.tab_groups
    }

    /// Posts of a series, oldest first
    pub fn series(&self, name: &str) -> Vec<Arc<Post>> {
        self.posts.iter()
            .rev()
            .filter(|post| post.header.series.as_deref() == Some(name))
            .cloned()
            .collect()
    }

    pub fn neighbours(&self, slug: &str) -> Neighbours {
        let Some(&index) = self.by_slug.get(slug) else {
            return Neighbours { previous: None, next: None };
        };

        Neighbours {
            previous: self.posts.get(index + 1).cloned(),
            next: index.checked_sub(1).and_then(|i| self.posts.get(i)).cloned(),
        }
    }
}
