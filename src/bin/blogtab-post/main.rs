use std::fmt::{Display, Formatter, Write};
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(version, about = "Creates a new blog post skeleton", long_about = None)]
struct Args {
    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long)]
    title: Option<String>,

    /// Series the post belongs to, shown as a tab and a bookmark box
    #[arg(short, long)]
    series: Option<String>,

    /// Space separated tags
    #[arg(long)]
    tags: Option<String>,

    #[arg(short, long, default_value_t = PostOutput::Stdout)]
    output: PostOutput,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum PostOutput {
    Stdout,
    File,
    Dir,
}

impl Display for PostOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PostOutput::Stdout => "stdout",
            PostOutput::File => "file",
            PostOutput::Dir => "dir",
        };
        write!(f, "{}", name)
    }
}

struct PostHeader<'a> {
    id: &'a str,
    date: &'a str,
    author: &'a str,
    tags: Option<&'a str>,
    series: Option<&'a str>,
}

fn get_author(args: &Args) -> String {
    if let Some(ref name) = args.name {
        return name.clone();
    }

    let name = whoami::realname();
    if name.is_empty() {
        return whoami::username();
    }
    name
}

fn render_header(header: &PostHeader, title: Option<&str>) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", header.id);
    let _ = writeln!(&mut buf, "[DATE]: # ({})", header.date);
    let _ = writeln!(&mut buf, "[AUTHOR]: # ({})", header.author);
    if let Some(tags) = header.tags {
        let _ = writeln!(&mut buf, "[TAGS]: # ({})", tags);
    }
    if let Some(series) = header.series {
        let _ = writeln!(&mut buf, "[SERIES]: # ({})", series);
    }
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# {}", title.unwrap_or("Replace with title"));
    buf
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## First section");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Second level headings show up in the table of contents");

    buf
}

fn post_url_from_title(title: &str, date: &NaiveDate) -> String {
    let alpha_chars: String = title.chars()
        .filter(|&c| c.is_alphanumeric() || c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .flat_map(|c| c.to_lowercase())
        .collect();

    let mut url = String::new();
    let mut prev_char = None;

    for c in alpha_chars.trim_matches('_').chars() {
        if c != '_' || prev_char != Some('_') {
            url.push(c);
        }
        prev_char = Some(c);
    }

    let url = unidecode::unidecode(&url);
    let date = date.format("%Y%m%d");

    format!("{}_{}", date, url)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let title = match (args.output, args.title.as_deref()) {
        (PostOutput::Stdout, title) => title,
        (_, Some(title)) => Some(title),
        (_, None) => bail!("For file and dir outputs, title is required"),
    };

    let id = Uuid::new_v4().to_string();
    let author = get_author(&args);
    let date = Utc::now();
    let date_str = date.format("%Y-%m-%d %H:%M:%S.000").to_string();

    let header = render_header(&PostHeader {
        id: &id,
        date: &date_str,
        author: &author,
        tags: args.tags.as_deref(),
        series: args.series.as_deref(),
    }, title);
    let body = render_body();
    let content = format!("{}\n{}", header, body);

    let slug = title.map(|title| post_url_from_title(title, &date.date_naive()));
    match (args.output, slug) {
        (PostOutput::File, Some(slug)) => {
            let file_name = PathBuf::from(format!("{}.md", slug));
            println!("Creating file {}", file_name.display());
            fs::write(&file_name, content)
                .with_context(|| format!("Error writing {}", file_name.display()))?;
        }
        (PostOutput::Dir, Some(slug)) => {
            let full_path = PathBuf::from(&slug).join("index.md");
            println!("Creating dir post {}", full_path.display());
            fs::create_dir(&slug).with_context(|| format!("Error creating directory {}", slug))?;
            fs::write(&full_path, content)
                .with_context(|| format!("Error writing {}", full_path.display()))?;
        }
        _ => println!("{}", content),
    }

    Ok(())
}
