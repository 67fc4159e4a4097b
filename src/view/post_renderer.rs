use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use ramhorns::Template;

use crate::catalog::Neighbours;
use crate::config::{Site, Sponsor};
use crate::content::toc::SCROLL_OFFSET_PX;
use crate::content::Post;
use crate::text_utils::format_date;
use crate::view::comments::CommentWidget;
use crate::view::{ViewAvatar, ViewTag};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_title: &'a str,
    description: &'a str,
    id: &'a str,
    author: &'a str,
    date: String,
    time_to_read: u32,
    post_title: &'a str,
    post_content: &'a str,
    tags: Vec<ViewTag<'a>>,
    avatar: Option<ViewAvatar<'a>>,
    bookmark: Option<ViewBookmark<'a>>,
    toc: Option<ViewToc<'a>>,
    sponsor: Option<ViewSponsor<'a>>,
    comments: Option<ViewComments<'a>>,
    previous: Option<ViewNavLink<'a>>,
    next: Option<ViewNavLink<'a>>,
}

#[derive(ramhorns::Content)]
struct ViewBookmark<'a> {
    series_title: &'a str,
    count: usize,
    items: Vec<ViewBookmarkItem<'a>>,
}

#[derive(ramhorns::Content)]
struct ViewBookmarkItem<'a> {
    number: usize,
    title: &'a str,
    link: String,
    current: bool,
}

#[derive(ramhorns::Content)]
struct ViewToc<'a> {
    entries: Vec<ViewTocEntry<'a>>,
    offset: u32,
}

#[derive(ramhorns::Content)]
struct ViewTocEntry<'a> {
    anchor: &'a str,
    title: &'a str,
    level: u32,
}

#[derive(ramhorns::Content)]
struct ViewSponsor<'a> {
    href: &'a str,
    text: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewComments<'a> {
    repo: &'a str,
    theme: &'a str,
    light_theme: &'a str,
    dark_theme: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewNavLink<'a> {
    link: String,
    title: &'a str,
}

/// Everything the post page needs besides the template.
pub struct PostView<'a> {
    pub post: &'a Post,
    pub site: &'a Site,
    pub avatar_url: Option<&'a str>,
    /// Oldest first; empty when the post is not part of a series
    pub series: &'a [Arc<Post>],
    pub neighbours: &'a Neighbours,
    pub comments: Option<&'a CommentWidget>,
    pub sponsor: Option<&'a Sponsor>,
    pub toc_depth: u32,
    pub date_format: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, view: &PostView) -> String {
        let post = view.post;
        let author = if post.header.author.is_empty() {
            view.site.author.as_str()
        } else {
            post.header.author.as_str()
        };

        let toc_entries: Vec<ViewTocEntry> = post.toc.flatten(view.toc_depth).into_iter()
            .map(|entry| ViewTocEntry { anchor: entry.anchor, title: entry.title, level: entry.level })
            .collect();

        self.template.render(&ViewItem {
            site_title: view.site.title.as_str(),
            description: post.summary(),
            id: post.header.id.0.as_str(),
            author,
            date: format_date(&post.header.date, view.date_format),
            time_to_read: post.time_to_read,
            post_title: post.title.as_str(),
            post_content: post.rendered.as_str(),
            tags: post.header.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect(),
            avatar: view.avatar_url.map(|url| ViewAvatar { url, alt: author }),
            bookmark: Self::bookmark(post, view.series),
            toc: if toc_entries.is_empty() { None } else { Some(ViewToc { entries: toc_entries, offset: SCROLL_OFFSET_PX }) },
            sponsor: view.sponsor.map(|s| ViewSponsor { href: s.href.as_str(), text: s.text.as_str() }),
            comments: view.comments.map(|c| ViewComments {
                repo: c.repo.as_str(),
                theme: c.theme.as_str(),
                light_theme: c.light_theme.as_str(),
                dark_theme: c.dark_theme.as_str(),
            }),
            previous: view.neighbours.previous.as_deref().map(nav_link),
            next: view.neighbours.next.as_deref().map(nav_link),
        })
    }

    fn bookmark<'a>(post: &'a Post, series: &'a [Arc<Post>]) -> Option<ViewBookmark<'a>> {
        let series_title = post.header.series.as_deref()?;
        if series.is_empty() {
            return None;
        }

        let items = series.iter()
            .enumerate()
            .map(|(i, item)| ViewBookmarkItem {
                number: i + 1,
                title: item.title.as_str(),
                link: format!("/view/{}/", item.slug),
                current: item.slug == post.slug,
            })
            .collect();

        Some(ViewBookmark {
            series_title,
            count: series.len(),
            items,
        })
    }
}

fn nav_link(post: &Post) -> ViewNavLink<'_> {
    ViewNavLink {
        link: format!("/view/{}/", post.slug),
        title: post.title.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::catalog::{CatalogOptions, PostCatalog};
    use crate::config::TabGrouping;

    use super::*;

    const TEMPLATE: &str = r##"TITLE=[{{post_title}}]
AUTHOR=[{{author}}] DATE=[{{date}}]
{{#avatar}}AVATAR=[{{url}}]
{{/avatar}}{{#bookmark}}SERIES=[{{series_title}} {{count}}]{{#items}}({{number}}{{#current}}*{{/current}}){{/items}}
{{/bookmark}}{{#toc}}TOC@{{offset}}={{#entries}}[{{level}}#{{anchor}}]{{/entries}}
{{/toc}}{{#sponsor}}SPONSOR=[{{text}}]
{{/sponsor}}{{#comments}}COMMENTS=[{{repo}} {{theme}} {{light_theme}}/{{dark_theme}}]
{{/comments}}{{#previous}}PREV=[{{title}}]
{{/previous}}{{#next}}NEXT=[{{title}}]
{{/next}}"##;

    fn site() -> Site {
        Site {
            title: "dev log".to_string(),
            author: "dayong".to_string(),
            summary: None,
            avatar: None,
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

    fn render(catalog: &PostCatalog, slug: &str, avatar_url: Option<&str>, comments: Option<&CommentWidget>, sponsor: Option<&Sponsor>) -> String {
        let site = site();
        let post = catalog.find(slug).unwrap();
        let series = match post.header.series {
            Some(ref name) => catalog.series(name),
            None => vec![],
        };
        let neighbours = catalog.neighbours(slug);
        let renderer = PostRenderer::new(TEMPLATE).unwrap();
        renderer.render(&PostView {
            post,
            site: &site,
            avatar_url,
            series: &series,
            neighbours: &neighbours,
            comments,
            sponsor,
            toc_depth: 3,
            date_format: "%Y.%m.%d",
        })
    }

    #[test]
    fn test_series_post_with_everything() {
        let catalog = sample_catalog();
        let comments = CommentWidget {
            repo: "dayong/utterances_comment".to_string(),
            theme: "photon-dark".to_string(),
            light_theme: "github-light".to_string(),
            dark_theme: "photon-dark".to_string(),
        };
        let sponsor = Sponsor {
            href: "https://www.buymeacoffee.com/someone".to_string(),
            text: "Buy me a chicken".to_string(),
        };
        let res = render(&catalog, "20230301_ownership", Some("/public/profile-pic.png"), Some(&comments), Some(&sponsor));

        assert_eq!(res, r##"TITLE=[Ownership]
AUTHOR=[dayong] DATE=[2023.03.01]
AVATAR=[/public/profile-pic.png]
SERIES=[Rust basics 3](1)(2*)(3)
TOC@80=[1#the-rules][1#moves][2#copy-types]
SPONSOR=[Buy me a chicken]
COMMENTS=[dayong/utterances_comment photon-dark github-light/photon-dark]
PREV=[Hello, Rust]
NEXT=[Borrowing]
"##);
    }

    #[test]
    fn test_missing_optional_sections_are_skipped() {
        let catalog = sample_catalog();
        let res = render(&catalog, "20230620_blog_with_ntex", None, None, None);

        assert!(res.starts_with("TITLE=[Building a blog with ntex]\nAUTHOR=[dayong] DATE=[2023.06.20]\n"));
        assert!(!res.contains("AVATAR="));
        assert!(!res.contains("SERIES="));
        assert!(!res.contains("SPONSOR="));
        assert!(!res.contains("COMMENTS="));
        assert!(!res.contains("NEXT="));
        assert!(res.contains("PREV=[Borrowing]"));
    }

    #[test]
    fn test_oldest_post_has_no_previous() {
        let catalog = sample_catalog();
        let res = render(&catalog, "20230110_hello_rust", None, None, None);
        assert!(!res.contains("PREV="));
        assert!(res.contains("NEXT=[Ownership]"));
        assert!(res.contains("SERIES=[Rust basics 3](1*)(2)(3)"));
        assert!(!res.contains("TOC@"));
    }
}
