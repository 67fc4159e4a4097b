use std::collections::HashMap;

use serde::Serialize;

/// A heading found in the post body, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub depth: u8,
    pub title: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocItem {
    pub title: String,
    pub anchor: String,
    pub items: Vec<TocItem>,
}

/// Flat view of a table of contents, `level` starting at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry<'a> {
    pub title: &'a str,
    pub anchor: &'a str,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableOfContents {
    pub items: Vec<TocItem>,
}

impl TableOfContents {
    /// A heading becomes a child of the nearest preceding heading with a smaller depth.
    pub fn from_headings(headings: &[Heading]) -> Self {
        let mut pos = 0;
        TableOfContents {
            items: Self::collect_items(headings, &mut pos, 0),
        }
    }

    fn collect_items(headings: &[Heading], pos: &mut usize, parent_depth: u8) -> Vec<TocItem> {
        let mut items = vec![];
        while let Some(heading) = headings.get(*pos) {
            if heading.depth <= parent_depth {
                break;
            }
            *pos += 1;
            let children = Self::collect_items(headings, pos, heading.depth);
            items.push(TocItem {
                title: heading.title.clone(),
                anchor: heading.anchor.clone(),
                items: children,
            });
        }
        items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn flatten(&self, max_depth: u32) -> Vec<TocEntry<'_>> {
        let mut entries = vec![];
        Self::flatten_items(&self.items, 1, max_depth, &mut entries);
        entries
    }

    fn flatten_items<'a>(items: &'a [TocItem], level: u32, max_depth: u32, out: &mut Vec<TocEntry<'a>>) {
        if level > max_depth {
            return;
        }
        for item in items {
            out.push(TocEntry {
                title: item.title.as_str(),
                anchor: item.anchor.as_str(),
                level,
            });
            Self::flatten_items(&item.items, level + 1, max_depth, out);
        }
    }
}

/// Generates github style heading anchors, unique within one document.
#[derive(Default)]
pub struct HeadingSlugger {
    occurrences: HashMap<String, u32>,
}

impl HeadingSlugger {
    pub fn slug(&mut self, text: &str) -> String {
        let original: String = text.trim()
            .to_lowercase()
            .chars()
            .filter_map(|c| match c {
                ' ' => Some('-'),
                '-' | '_' => Some(c),
                c if c.is_alphanumeric() => Some(c),
                _ => None,
            })
            .collect();

        let mut slug = original.clone();
        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            slug = format!("{}-{}", original, count);
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    pub anchor: String,
    pub top: f64,
}

/// Pixels below the viewport top where a heading counts as reached.
/// Rendered as `data-offset` on the TOC, blog.js reads it from there.
pub const SCROLL_OFFSET_PX: u32 = 80;

/// Picks the heading to highlight in the table of contents while scrolling.
/// Mirrors the scroll handler in blog.js.
pub struct ScrollSpy {
    offset: f64,
}

impl ScrollSpy {
    pub fn new(offset: f64) -> Self {
        ScrollSpy { offset }
    }

    /// Last heading, in document order, whose top has been scrolled past.
    pub fn active<'a>(&self, positions: &'a [HeadingPosition], scroll_top: f64) -> Option<&'a str> {
        let mut current = None;
        for position in positions {
            if position.top <= scroll_top + self.offset {
                current = Some(position.anchor.as_str());
            }
        }
        current
    }
}

impl Default for ScrollSpy {
    fn default() -> Self {
        ScrollSpy::new(f64::from(SCROLL_OFFSET_PX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(depth: u8, title: &str) -> Heading {
        Heading {
            depth,
            title: title.to_string(),
            anchor: title.to_lowercase(),
        }
    }

    #[test]
    fn test_hierarchy() {
        let headings = vec![
            heading(2, "A"),
            heading(3, "A1"),
            heading(4, "A1x"),
            heading(3, "A2"),
            heading(2, "B"),
        ];
        let toc = TableOfContents::from_headings(&headings);
        assert_eq!(toc.items.len(), 2);
        assert_eq!(toc.items[0].title, "A");
        assert_eq!(toc.items[0].items.len(), 2);
        assert_eq!(toc.items[0].items[0].items[0].title, "A1x");
        assert!(toc.items[1].items.is_empty());
    }

    #[test]
    fn test_shallower_heading_after_deep_start() {
        let headings = vec![heading(3, "deep"), heading(2, "shallow")];
        let toc = TableOfContents::from_headings(&headings);
        let titles: Vec<_> = toc.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["deep", "shallow"]);
    }

    #[test]
    fn test_flatten_depth() {
        let headings = vec![
            heading(1, "one"),
            heading(2, "two"),
            heading(3, "three"),
            heading(4, "four"),
            heading(1, "uno"),
        ];
        let toc = TableOfContents::from_headings(&headings);

        let entries = toc.flatten(3);
        let levels: Vec<_> = entries.iter().map(|e| (e.title, e.level)).collect();
        assert_eq!(levels, [("one", 1), ("two", 2), ("three", 3), ("uno", 1)]);

        assert_eq!(toc.flatten(1).len(), 2);
    }

    #[test]
    fn test_empty() {
        let toc = TableOfContents::from_headings(&[]);
        assert!(toc.is_empty());
        assert!(toc.flatten(3).is_empty());
    }

    #[test]
    fn test_slugger() {
        let mut slugger = HeadingSlugger::default();
        assert_eq!(slugger.slug("Hello, World!"), "hello-world");
        assert_eq!(slugger.slug("Hello World"), "hello-world-1");
        assert_eq!(slugger.slug("Hello World"), "hello-world-2");
        assert_eq!(slugger.slug("러스트 시작하기"), "러스트-시작하기");
        assert_eq!(slugger.slug("snake_case & kebab-case"), "snake_case--kebab-case");
    }

    #[test]
    fn test_scroll_spy() {
        let positions = vec![
            HeadingPosition { anchor: "intro".to_string(), top: 100.0 },
            HeadingPosition { anchor: "setup".to_string(), top: 600.0 },
            HeadingPosition { anchor: "usage".to_string(), top: 1200.0 },
        ];
        let spy = ScrollSpy::new(0.0);
        assert_eq!(spy.active(&positions, 0.0), None);
        assert_eq!(spy.active(&positions, 100.0), Some("intro"));
        assert_eq!(spy.active(&positions, 700.0), Some("setup"));
        assert_eq!(spy.active(&positions, 5000.0), Some("usage"));

        let spy = ScrollSpy::new(50.0);
        assert_eq!(spy.active(&positions, 560.0), Some("setup"));
        assert_eq!(spy.active(&[], 560.0), None);
    }

    #[test]
    fn test_default_scroll_offset() {
        let positions = vec![
            HeadingPosition { anchor: "intro".to_string(), top: 0.0 },
            HeadingPosition { anchor: "setup".to_string(), top: 1080.0 },
        ];
        let spy = ScrollSpy::default();
        assert_eq!(spy.active(&positions, 999.0), Some("intro"));
        assert_eq!(spy.active(&positions, 1000.0), Some("setup"));
    }
}
