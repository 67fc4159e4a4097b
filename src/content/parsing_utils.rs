use std::{fs, io};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::Lines;

use chrono::{DateTime, Local, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::content::{PostHeader, PostId};
use crate::text_utils::parse_date_time;

/// Parses the `[KEY]: # (value)` block at the top of a post, optionally wrapped in `<!-- -->`.
/// Returns the header, the remaining lines and the first line after the header.
/// A file without any header field gives `ErrorKind::NotFound`.
pub fn parse_post_header<'a>(file_name: &PathBuf, lines: Lines<'a>) -> io::Result<(PostHeader, Lines<'a>, Option<&'a str>)> {
    let mut id = String::new();
    let mut date = String::new();
    let mut author = String::new();
    let mut tags = String::new();
    let mut series = String::new();
    let mut description = String::new();

    let mut lines = lines.clone();
    let mut maybe_line = lines.next();

    // Skip optional HTML comment in the beginning
    let mut start_with_comment = false;

    while let Some(line) = maybe_line {
        let line = line.trim();

        if line.is_empty() {
            maybe_line = lines.next();
            continue;
        }

        if line == "<!--" {
            maybe_line = lines.next();
            start_with_comment = true;
        }
        break;
    }

    while let Some(line) = maybe_line {
        if line.trim().is_empty() {
            maybe_line = lines.next();
            continue;
        }

        let Some((key, val)) = extract_header_key_val(line) else {
            break;
        };

        match key {
            "ID" => id = val.to_string(),
            "DATE" => date = val.to_string(),
            "AUTHOR" => author = val.to_string(),
            "TAGS" => tags = val.to_string(),
            "SERIES" => series = val.trim().to_string(),
            "DESCRIPTION" => description = val.trim().to_string(),
            _ => {}
        }
        maybe_line = lines.next();
    }

    if start_with_comment {
        loop {
            let Some(line) = maybe_line else {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("End of comment in the header is missing - file={}", file_name.display())),
                );
            };

            if line.trim() == "-->" {
                break;
            }
            maybe_line = lines.next();
        }
    }

    let fields = [&id, &date, &author, &tags, &series, &description];
    if fields.iter().all(|field| field.is_empty()) {
        return Err(io::Error::new(ErrorKind::NotFound, "Post header not found".to_string()));
    }

    // A header without DATE still counts, the date comes from the file
    let date = if date.is_empty() {
        file_date(file_name)?
    } else {
        parse_date_time(&date)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", e, file_name.display())))?
    };

    let header = PostHeader {
        file_name: file_name.clone(),
        id: PostId(id),
        date,
        author,
        tags: extract_tags(&tags),
        series: non_empty(series),
        description: non_empty(description),
    };

    Ok((header, lines, maybe_line))
}

/// Header for posts written without one: id from the slug, date from the file timestamp.
pub fn generate_header_from_file(file_name: &PathBuf, slug: &str) -> io::Result<PostHeader> {
    Ok(PostHeader {
        file_name: file_name.clone(),
        id: PostId(slug.to_string()),
        date: file_date(file_name)?,
        author: String::new(),
        tags: vec![],
        series: None,
        description: None,
    })
}

fn file_date(file_name: &PathBuf) -> io::Result<NaiveDateTime> {
    let modified = fs::metadata(file_name)?.modified()?;
    let date: DateTime<Local> = modified.into();
    Ok(date.naive_local())
}

pub fn parse_title_markdown<'a>(lines: Lines<'a>, mut maybe_line: Option<&'a str>) -> (String, Lines<'a>) {
    let mut lines = lines;
    let title = loop {
        match maybe_line {
            Some(line) if line.starts_with("# ") => break line[2..].trim().to_string(),
            Some(_) => maybe_line = lines.next(),
            None => break String::new(),
        }
    };
    (title, lines)
}

pub fn extract_body(lines: Lines) -> String {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Repeated tags are kept once, in first seen order.
fn extract_tags(tags_str: &str) -> Vec<String> {
    let mut tags: Vec<String> = vec![];
    for tag in tags_str.split(' ').filter(|x| !x.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn extract_header_key_val(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(r"\[(?P<key>\w+)\]: # \((?P<value>.*)\)").unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}

pub fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res = String::new();
    let mut block = md_post;

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(start) = block.find(start_comment) {
        res.push_str(&block[..start]);

        let next = &block[(start + start_comment.len())..];
        match next.find(end_comment) {
            Some(end) => block = &next[(end + end_comment.len())..],
            None => return Err(io::Error::new(ErrorKind::InvalidData, "Error finding end of comment")),
        }
    }
    res.push_str(block);

    Ok(res)
}
