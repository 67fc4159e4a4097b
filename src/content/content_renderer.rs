use std::io;

use crate::content::Post;
use crate::content::content_file::ContentFile;

#[derive(Clone)]
pub struct ImagePrefix(pub String);

#[derive(Clone)]
pub struct RenderOptions {
    pub image_prefix: Option<ImagePrefix>,
    pub excerpt_length: usize,
}

impl RenderOptions {
    pub fn for_slug(slug: &str, excerpt_length: usize) -> Self {
        RenderOptions {
            image_prefix: Some(ImagePrefix(format!("/view/{}", slug))),
            excerpt_length,
        }
    }
}

pub trait ContentRenderer {
    fn render(content_file: &ContentFile, render_options: &RenderOptions) -> io::Result<Post>;
}
