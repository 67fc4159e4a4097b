pub mod comments;
pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;

#[derive(ramhorns::Content)]
pub(crate) struct ViewTag<'a> {
    pub tag: &'a str,
}

#[derive(ramhorns::Content)]
pub(crate) struct ViewAvatar<'a> {
    pub url: &'a str,
    pub alt: &'a str,
}
