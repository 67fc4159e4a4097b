use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct ContentFile {
    pub slug: String,
    pub file_path: PathBuf,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(slug: String, file_path: PathBuf) -> io::Result<ContentFile> {
        if !Self::is_markdown(&file_path) {
            return Err(io::Error::new(ErrorKind::Unsupported, format!("Not a markdown post: {}", file_path.display())));
        }

        let raw_content = fs::read_to_string(&file_path)?;

        Ok(ContentFile {
            slug,
            file_path,
            raw_content,
        })
    }

    pub fn from_string(slug: &str, file_path: &str, raw_content: &str) -> ContentFile {
        ContentFile {
            slug: slug.to_string(),
            file_path: PathBuf::from(file_path),
            raw_content: raw_content.to_string(),
        }
    }

    pub fn is_markdown(file_name: &Path) -> bool {
        matches!(file_name.extension().and_then(|e| e.to_str()), Some("md") | Some("mdx"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_markdown() {
        assert!(ContentFile::is_markdown(Path::new("posts/hello/index.md")));
        assert!(ContentFile::is_markdown(Path::new("posts/hello.mdx")));
        assert!(!ContentFile::is_markdown(Path::new("posts/hello/cover.png")));
        assert!(!ContentFile::is_markdown(Path::new("posts/README")));
    }

    #[test]
    fn test_unsupported_file() {
        let err = ContentFile::from_file("cover".to_string(), PathBuf::from("res/posts/cover.png")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
