use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::Lines;

use lazy_static::lazy_static;
use markdown::mdast::Node;
use markdown::{Options, ParseOptions};
use regex::{Captures, Regex};

use crate::content::content_file::ContentFile;
use crate::content::content_renderer::{ContentRenderer, RenderOptions};
use crate::content::parsing_utils::{extract_body, generate_header_from_file, parse_post_header, parse_title_markdown, remove_comments};
use crate::content::toc::{Heading, HeadingSlugger, TableOfContents};
use crate::content::{Post, PostHeader};
use crate::text_utils::{prune_text, time_to_read};

pub struct MarkdownRenderer {}

impl ContentRenderer for MarkdownRenderer {
    fn render(content_file: &ContentFile, render_options: &RenderOptions) -> io::Result<Post> {
        let (header, lines, maybe_line) = Self::parse_markdown_header(content_file, content_file.raw_content.lines())?;
        let (title, lines) = parse_title_markdown(lines, maybe_line);

        let body = remove_comments(&extract_body(lines))?;
        let body = match render_options.image_prefix {
            Some(ref prefix) => Self::change_images(&prefix.0, &body),
            None => body,
        };

        let tree = markdown::to_mdast(&body, &ParseOptions::gfm())
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.reason))?;

        let mut headings = vec![];
        let mut slugger = HeadingSlugger::default();
        collect_headings(&tree, &mut slugger, &mut headings);

        let mut plain_text = String::new();
        collect_plain_text(&tree, &mut plain_text);
        let plain_text = plain_text.split_whitespace().collect::<Vec<_>>().join(" ");

        let html = markdown::to_html_with_options(&body, &Options::gfm())
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.reason))?;
        let rendered = Self::add_heading_anchors(&html, &headings);

        Ok(Post {
            header,
            slug: content_file.slug.clone(),
            title,
            rendered,
            excerpt: prune_text(&plain_text, render_options.excerpt_length),
            toc: TableOfContents::from_headings(&headings),
            time_to_read: time_to_read(&plain_text),
        })
    }
}

impl MarkdownRenderer {
    fn parse_markdown_header<'a>(content_file: &ContentFile, lines: Lines<'a>) -> io::Result<(PostHeader, Lines<'a>, Option<&'a str>)> {
        let file_name: &PathBuf = &content_file.file_path;
        let lines_clone = lines.clone();
        match parse_post_header(file_name, lines) {
            Ok(parsed) => Ok(parsed),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let header = generate_header_from_file(file_name, &content_file.slug)?;
                Ok((header, lines_clone, Some("")))
            }
            Err(e) => Err(e),
        }
    }

    /// Headings come out of the html renderer without attributes and in document order.
    fn add_heading_anchors(html: &str, headings: &[Heading]) -> String {
        lazy_static! {
            static ref HEADING_TAG_REGEX: Regex = Regex::new(r"<h([1-6])>").unwrap();
        }

        let mut anchors = headings.iter().map(|h| h.anchor.as_str());
        HEADING_TAG_REGEX.replace_all(html, |caps: &Captures| {
            match anchors.next() {
                Some(anchor) => format!(r#"<h{} id="{}">"#, &caps[1], anchor),
                None => caps[0].to_string(),
            }
        }).to_string()
    }

    fn change_images(post_url: &str, md_post: &str) -> String {
        let mut parsed_string = String::new();
        let mut remaining_input = md_post;

        while let Some(text_start) = remaining_input.find("![") {
            let text_end = text_start + 2;

            parsed_string.push_str(&remaining_input[0..text_end]);
            remaining_input = &remaining_input[text_end..];

            let Some(link_end) = remaining_input.find("](") else {
                continue;
            };

            let link_text = &remaining_input[..link_end];
            let url_start = link_end + 2;
            let url_start_slice = &remaining_input[url_start..];
            let Some(url_end) = url_start_slice.find(')') else {
                continue;
            };

            let url = &url_start_slice[..url_end];
            let prefixed_url = if url.contains("://") || url.starts_with('/') {
                url.to_string()
            } else if post_url.ends_with('/') {
                format!("{}{}", post_url, url)
            } else {
                format!("{}/{}", post_url, url)
            };

            parsed_string.push_str(link_text);
            parsed_string.push_str("](");
            parsed_string.push_str(&prefixed_url);
            parsed_string.push(')');

            remaining_input = &url_start_slice[url_end + 1..];
        }

        parsed_string.push_str(remaining_input);
        parsed_string
    }
}

fn node_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::InlineCode(code) => out.push_str(&code.value),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    node_text(child, out);
                }
            }
        }
    }
}

fn collect_headings(node: &Node, slugger: &mut HeadingSlugger, headings: &mut Vec<Heading>) {
    if let Node::Heading(heading) = node {
        let mut title = String::new();
        for child in heading.children.iter() {
            node_text(child, &mut title);
        }
        let anchor = slugger.slug(&title);
        headings.push(Heading {
            depth: heading.depth,
            title: title.trim().to_string(),
            anchor,
        });
        return;
    }

    if let Some(children) = node.children() {
        for child in children {
            collect_headings(child, slugger, headings);
        }
    }
}

fn collect_plain_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::InlineCode(code) => out.push_str(&code.value),
        Node::Code(_) | Node::Html(_) => {}
        Node::Break(_) => out.push(' '),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_plain_text(child, out);
                }
            }
            if matches!(node, Node::Paragraph(_) | Node::Heading(_) | Node::ListItem(_) | Node::TableCell(_)) {
                out.push(' ');
            }
        }
    }
}
