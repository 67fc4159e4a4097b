use std::{fs, io};
use std::path::{Path, PathBuf};

use crate::content::content_file::ContentFile;

#[derive(Debug, Clone, PartialEq)]
pub struct PostLink {
    pub slug: String,
    pub post_path: PathBuf,
}

/// Finds posts under `root_dir`: `<slug>.md` files and `<slug>/<post_file>.md` directories.
pub struct PostList {
    pub root_dir: PathBuf,
    pub post_file: String,
}

impl PostList {
    pub fn list_post_files(&self) -> io::Result<Vec<PostLink>> {
        let mut posts = vec![];

        for (dir, file_name) in self.retrieve_dirs()? {
            let Some(slug) = file_name_str(&dir) else {
                continue;
            };
            posts.push(PostLink {
                slug,
                post_path: dir.join(file_name),
            });
        }

        for post_file in self.retrieve_files()? {
            let Some(slug) = post_file.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            posts.push(PostLink {
                slug,
                post_path: post_file,
            });
        }

        posts.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(posts)
    }

    fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        for entry in fs::read_dir(self.root_dir.as_path())?.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_file() && ContentFile::is_markdown(&entry.path()) {
                posts.push(entry.path());
            }
        }
        Ok(posts)
    }

    fn retrieve_dirs(&self) -> io::Result<Vec<(PathBuf, String)>> {
        let mut post_dirs = vec![];
        for dir in Self::list_dirs(self.root_dir.as_path())? {
            if let Some(file_name) = Self::contains_file(&dir, &self.post_file)? {
                post_dirs.push((dir, file_name));
            }
        }
        Ok(post_dirs)
    }

    fn list_dirs(posts_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = vec![];
        for entry in fs::read_dir(posts_dir)?.flatten() {
            if let Ok(file_type) = entry.file_type() {
                if file_type.is_dir() {
                    dirs.push(entry.path());
                }
            }
        }
        Ok(dirs)
    }

    fn contains_file(dir: &Path, base_name: &str) -> io::Result<Option<String>> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let is_post = path.file_stem().is_some_and(|stem| stem == base_name);
            if is_post && ContentFile::is_markdown(&path) {
                return Ok(file_name_str(&path));
            }
        }

        Ok(None)
    }
}

fn file_name_str(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}
