use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use ramhorns::Template;
use serde::Serialize;

use crate::catalog::TabGroup;
use crate::config::Site;
use crate::content::Post;
use crate::list_state::ListState;
use crate::post_tab::PostTab;
use crate::text_utils::format_date;
use crate::view::{ViewAvatar, ViewTag};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    page_title: &'a str,
    site_title: &'a str,
    author: &'a str,
    summary: &'a str,
    has_summary: bool,
    avatar: Option<ViewAvatar<'a>>,
    tabs: Vec<ViewTab>,
    post_list: Vec<ListItem<'a>>,
    has_posts: bool,
    more: Option<ViewMore>,
}

#[derive(ramhorns::Content)]
struct ViewTab {
    label: String,
    link: String,
    selected: bool,
    count: usize,
}

#[derive(ramhorns::Content)]
struct ListItem<'a> {
    link: String,
    title: &'a str,
    date: String,
    summary: &'a str,
    time_to_read: u32,
    tags: Vec<ViewTag<'a>>,
    series: Option<ViewSeries<'a>>,
}

#[derive(ramhorns::Content)]
struct ViewSeries<'a> {
    name: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewMore {
    link: String,
    api_link: String,
    visible: usize,
}

/// What the post list page shows for one request.
pub struct ListView<'a> {
    pub site: &'a Site,
    pub avatar_url: Option<&'a str>,
    pub tab: &'a PostTab,
    pub groups: &'a [TabGroup],
    pub all_count: usize,
    pub posts: &'a [Arc<Post>],
    pub state: ListState,
    pub date_format: &'a str,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
        })
    }

    pub fn render(&self, view: &ListView) -> String {
        let visible = &view.posts[..view.state.visible().min(view.posts.len())];
        let post_list = visible.iter()
            .map(|post| list_item(post, view.date_format))
            .collect();

        let mut tabs = vec![ViewTab {
            label: "All".to_string(),
            link: "/".to_string(),
            selected: *view.tab == PostTab::All,
            count: view.all_count,
        }];
        tabs.extend(view.groups.iter().map(|group| ViewTab {
            label: group.name.clone(),
            link: format!("/?{}", encode_pairs(&[("tab", group.name.as_str())])),
            selected: view.tab.name() == group.name,
            count: group.posts.len(),
        }));

        let more = if view.state.has_more() {
            let tab = view.tab.name();
            let next_visible = view.state.next_visible().to_string();
            let visible = view.state.visible().to_string();
            let page_size = view.state.page_size().to_string();
            Some(ViewMore {
                link: format!("/?{}", encode_pairs(&[("tab", tab), ("visible", &next_visible)])),
                api_link: format!("/api/posts?{}", encode_pairs(&[("tab", tab), ("offset", &visible), ("limit", &page_size)])),
                visible: view.state.visible(),
            })
        } else {
            None
        };

        let summary = view.site.summary.as_deref().unwrap_or("");
        self.template.render(&ListPage {
            page_title: "All posts",
            site_title: view.site.title.as_str(),
            author: view.site.author.as_str(),
            summary,
            has_summary: !summary.is_empty(),
            avatar: view.avatar_url.map(|url| ViewAvatar { url, alt: view.site.author.as_str() }),
            tabs,
            post_list,
            has_posts: !view.posts.is_empty(),
            more,
        })
    }
}

fn list_item<'a>(post: &'a Post, date_format: &str) -> ListItem<'a> {
    ListItem {
        link: format!("/view/{}/", post.slug),
        title: post.title.as_str(),
        date: format_date(&post.header.date, date_format),
        summary: post.summary(),
        time_to_read: post.time_to_read,
        tags: post.header.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect(),
        series: post.header.series.as_deref().map(|name| ViewSeries { name }),
    }
}

fn encode_pairs(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

/// A slice of the selected list, served to the lazy loader.
#[derive(Serialize, Debug)]
pub struct PostChunk {
    pub tab: String,
    pub offset: usize,
    pub next_offset: usize,
    pub total: usize,
    pub has_more: bool,
    pub items: Vec<ChunkItem>,
}

#[derive(Serialize, Debug)]
pub struct ChunkItem {
    pub slug: String,
    pub link: String,
    pub title: String,
    pub date: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub time_to_read: u32,
}

impl PostChunk {
    pub fn new(tab: &PostTab, posts: &[Arc<Post>], offset: usize, limit: usize, date_format: &str) -> Self {
        let total = posts.len();
        let start = offset.min(total);
        let end = offset.saturating_add(limit).min(total);

        let items = posts[start..end].iter()
            .map(|post| ChunkItem {
                slug: post.slug.clone(),
                link: format!("/view/{}/", post.slug),
                title: post.title.clone(),
                date: format_date(&post.header.date, date_format),
                summary: post.summary().to_string(),
                tags: post.header.tags.clone(),
                series: post.header.series.clone(),
                time_to_read: post.time_to_read,
            })
            .collect();

        PostChunk {
            tab: tab.name().to_string(),
            offset: start,
            next_offset: end,
            total,
            has_more: end < total,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::catalog::{CatalogOptions, PostCatalog};
    use crate::config::TabGrouping;
    use crate::post_tab::TabFilter;

    use super::*;

    const TEMPLATE: &str = "{{#avatar}}<img src=\"{{url}}\" alt=\"{{alt}}\">{{/avatar}}\
TABS={{#tabs}}[{{label}}{{#selected}}*{{/selected}}:{{count}}]{{/tabs}}\n\
{{#post_list}}<li>{{title}}|{{date}}|{{#series}}{{name}}{{/series}}</li>{{/post_list}}\
{{^has_posts}}No blog posts found.{{/has_posts}}\n\
{{#more}}MORE={{{link}}}{{/more}}";

    fn site(avatar: Option<&str>) -> Site {
        Site {
            title: "dev log".to_string(),
            author: "dayong".to_string(),
            summary: None,
            avatar: avatar.map(str::to_string),
            site_url: None,
        }
    }

    fn sample_catalog() -> PostCatalog {
        let options = CatalogOptions {
            index_base_name: "index",
            excerpt_length: 160,
            grouping: TabGrouping::Series,
        };
        PostCatalog::load(&PathBuf::from("res/posts"), &options).unwrap()
    }

    #[test]
    fn test_render_first_page() {
        let catalog = sample_catalog();
        let site = site(None);
        let tab = PostTab::All;
        let posts = TabFilter::apply(&tab, catalog.posts(), catalog.tab_groups());
        let renderer = ListRenderer::new(TEMPLATE).unwrap();
        let res = renderer.render(&ListView {
            site: &site,
            avatar_url: None,
            tab: &tab,
            groups: catalog.tab_groups(),
            all_count: catalog.len(),
            posts,
            state: ListState::new(posts.len(), 2),
            date_format: "%Y.%m.%d",
        });

        assert_eq!(res, "TABS=[All*:4][Rust basics:3]\n\
<li>Building a blog with ntex|2023.06.20|</li><li>Borrowing|2023.04.15|Rust basics</li>\n\
MORE=/?tab=all&visible=4");
    }

    #[test]
    fn test_render_selected_tab_without_more() {
        let catalog = sample_catalog();
        let site = site(Some("profile-pic.png"));
        let tab = PostTab::Named("Rust basics".to_string());
        let posts = TabFilter::apply(&tab, catalog.posts(), catalog.tab_groups());
        let renderer = ListRenderer::new(TEMPLATE).unwrap();
        let res = renderer.render(&ListView {
            site: &site,
            avatar_url: Some("/public/profile-pic.png"),
            tab: &tab,
            groups: catalog.tab_groups(),
            all_count: catalog.len(),
            posts,
            state: ListState::new(posts.len(), 10),
            date_format: "%Y.%m.%d",
        });

        assert!(res.starts_with("<img src=\"/public/profile-pic.png\" alt=\"dayong\">TABS=[All:4][Rust basics*:3]"));
        assert!(res.contains("<li>Hello, Rust|2023.01.10|Rust basics</li>"));
        assert!(!res.contains("MORE="));
    }

    #[test]
    fn test_render_empty() {
        let site = site(None);
        let tab = PostTab::All;
        let renderer = ListRenderer::new(TEMPLATE).unwrap();
        let res = renderer.render(&ListView {
            site: &site,
            avatar_url: None,
            tab: &tab,
            groups: &[],
            all_count: 0,
            posts: &[],
            state: ListState::new(0, 10),
            date_format: "%Y.%m.%d",
        });
        assert_eq!(res, "TABS=[All*:0]\nNo blog posts found.\n");
    }

    #[test]
    fn test_chunk() {
        let catalog = sample_catalog();
        let chunk = PostChunk::new(&PostTab::All, catalog.posts(), 2, 10, "%Y.%m.%d");
        assert_eq!(chunk.offset, 2);
        assert_eq!(chunk.next_offset, 4);
        assert!(!chunk.has_more);
        assert_eq!(chunk.items.len(), 2);
        assert_eq!(chunk.items[0].slug, "20230301_ownership");

        let chunk = PostChunk::new(&PostTab::All, catalog.posts(), 0, 1, "%Y.%m.%d");
        assert!(chunk.has_more);
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["tab"], "all");
        assert_eq!(json["items"][0]["link"], "/view/20230620_blog_with_ntex/");

        let chunk = PostChunk::new(&PostTab::All, catalog.posts(), 99, 10, "%Y.%m.%d");
        assert!(chunk.items.is_empty());
        assert_eq!(chunk.offset, 4);
    }
}
