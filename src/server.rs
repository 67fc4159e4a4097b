use std::{fs, io};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use ntex::http::header;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{debug, error, info};

use crate::catalog::{CatalogOptions, PostCatalog};
use crate::config::Config;
use crate::content_cache::ContentCache;
use crate::list_state::ListState;
use crate::post_tab::{PostTab, TabFilter};
use crate::query_string::QueryString;
use crate::view::comments::{CommentWidget, ThemeMode};
use crate::view::list_renderer::{ListRenderer, ListView, PostChunk};
use crate::view::post_renderer::{PostRenderer, PostView};
use crate::view::rss_renderer::FeedChannel;

pub struct AppState {
    pub catalog: PostCatalog,
    pub config: Config,
    pub avatar_url: Option<String>,
    pub cache: ContentCache<String>,
}

impl AppState {
    pub fn load(config: Config) -> io::Result<Self> {
        let options = CatalogOptions {
            index_base_name: config.defaults.index_base_name(),
            excerpt_length: config.defaults.excerpt_length(),
            grouping: config.defaults.tab_grouping,
        };
        let catalog = PostCatalog::load(&config.paths.posts_dir, &options)?;
        info!("Loaded {} posts from {}", catalog.len(), config.paths.posts_dir.display());

        let avatar_url = resolve_avatar(&config);
        let cache = if config.defaults.rendering_cache_enabled {
            ContentCache::new()
        } else {
            ContentCache::non_caching()
        };

        Ok(AppState {
            catalog,
            config,
            avatar_url,
            cache,
        })
    }

    fn page_size(&self) -> usize {
        self.config.defaults.page_size as usize
    }

    fn read_template(&self, name: &str) -> io::Result<String> {
        let template_path = self.config.paths.template_dir.join(name);
        fs::read_to_string(&template_path)
            .map_err(|e| io::Error::new(e.kind(), format!("Error reading template {}: {}", template_path.display(), e)))
    }

    pub fn render_index(&self, query: Option<&str>) -> io::Result<String> {
        let qs = QueryString::from(query.unwrap_or(""));
        let groups = self.catalog.tab_groups();
        let tab = PostTab::parse(qs.get_tab()).normalize(groups);
        let posts = TabFilter::apply(&tab, self.catalog.posts(), groups);
        let state = ListState::with_visible(posts.len(), self.page_size(), qs.get_count("visible"));

        let template_src = self.read_template("index.tpl")?;
        let renderer = ListRenderer::new(&template_src)?;
        Ok(renderer.render(&ListView {
            site: &self.config.site,
            avatar_url: self.avatar_url.as_deref(),
            tab: &tab,
            groups,
            all_count: self.catalog.len(),
            posts,
            state,
            date_format: self.config.defaults.date_format(),
        }))
    }

    pub fn posts_chunk(&self, query: Option<&str>) -> PostChunk {
        let qs = QueryString::from(query.unwrap_or(""));
        let groups = self.catalog.tab_groups();
        let tab = PostTab::parse(qs.get_tab()).normalize(groups);
        let posts = TabFilter::apply(&tab, self.catalog.posts(), groups);

        let offset = qs.get_count("offset").unwrap_or(0);
        let limit = match qs.get_count("limit") {
            Some(limit) if limit > 0 => limit.min(self.page_size()),
            _ => self.page_size(),
        };
        PostChunk::new(&tab, posts, offset, limit, self.config.defaults.date_format())
    }

    /// `Ok(None)` when no post has this slug.
    pub fn render_post(&self, slug: &str, theme: ThemeMode) -> io::Result<Option<Arc<String>>> {
        let Some(post) = self.catalog.find(slug) else {
            return Ok(None);
        };

        let key = ContentCache::<String>::post_key(slug, theme.as_str());
        let rendered = self.cache.get_or(&key, || {
            let series = match post.header.series {
                Some(ref name) => self.catalog.series(name),
                None => vec![],
            };
            let neighbours = self.catalog.neighbours(slug);
            let comments = self.config.comments.as_ref().map(|c| CommentWidget::new(c, theme));

            let template_src = self.read_template("view.tpl")?;
            let renderer = PostRenderer::new(&template_src)?;
            debug!("Rendering post {} with {} theme", slug, theme.as_str());
            Ok(renderer.render(&PostView {
                post,
                site: &self.config.site,
                avatar_url: self.avatar_url.as_deref(),
                series: &series,
                neighbours: &neighbours,
                comments: comments.as_ref(),
                sponsor: self.config.sponsor.as_ref(),
                toc_depth: self.config.defaults.toc_depth(),
                date_format: self.config.defaults.date_format(),
            }))
        })?;

        Ok(Some(rendered))
    }

    /// Files next to a post, only for posts living in their own directory.
    pub fn post_file_path(&self, slug: &str, file: &str) -> Option<PathBuf> {
        if is_unsafe_name(slug) || is_unsafe_name(file) {
            return None;
        }

        let post = self.catalog.find(slug)?;
        let post_path = post.header.file_name.as_path();
        let is_dir_post = post_path.file_stem()
            .is_some_and(|stem| stem == self.config.defaults.index_base_name());
        if !is_dir_post {
            return None;
        }

        post_path.parent().map(|dir| dir.join(file))
    }

    pub fn render_rss(&self) -> io::Result<Option<Vec<u8>>> {
        let Some(ref feed) = self.config.rss_feed else {
            return Ok(None);
        };

        let count = (feed.page_size as usize).min(self.catalog.len());
        let channel = FeedChannel {
            title: feed.title.as_str(),
            site_url: self.config.feed_site_url(),
            description: feed.description.as_str(),
        };
        let xml = channel.render(&self.catalog.posts()[..count])
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error writing rss feed: {}", e)))?;
        Ok(Some(xml))
    }
}

fn resolve_avatar(config: &Config) -> Option<String> {
    let avatar = config.site.avatar.as_deref()?;
    if avatar.contains("://") {
        return Some(avatar.to_string());
    }

    if config.paths.public_dir.join(avatar).is_file() {
        Some(format!("/public/{}", avatar))
    } else {
        info!("Avatar {} not found in {}, rendering without it", avatar, config.paths.public_dir.display());
        None
    }
}

fn is_unsafe_name(name: &str) -> bool {
    name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\')
}

fn theme_from_request(req: &HttpRequest) -> ThemeMode {
    let cookie = req.headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    ThemeMode::from_cookie_header(cookie)
}

fn html_response(body: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

#[web::get("/")]
async fn index(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match state.render_index(req.uri().query()) {
        Ok(rendered) => html_response(rendered),
        Err(e) => {
            error!("Error rendering post list: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error listing posts: {}", e))
        }
    }
}

#[web::get("/api/posts")]
async fn api_posts(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let chunk = state.posts_chunk(req.uri().query());
    match serde_json::to_string(&chunk) {
        Ok(json) => web::HttpResponse::Ok()
            .content_type("application/json")
            .body(json),
        Err(e) => {
            error!("Error serializing posts: {}", e);
            web::HttpResponse::InternalServerError().finish()
        }
    }
}

#[web::get("/view/{post}")]
async fn view_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", path.into_inner() + "/")
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/view/{post}/")]
async fn view(req: HttpRequest, path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let slug = path.into_inner();

    match state.render_post(&slug, theme_from_request(&req)) {
        Ok(Some(rendered)) => html_response((*rendered).clone()),
        Ok(None) => web::HttpResponse::NotFound()
            .body(format!("Post {} not found", slug)),
        Err(e) => {
            error!("Error rendering post {}: {}", slug, e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error loading post {}: {}", slug, e))
        }
    }
}

#[web::get("/view/{post}/{file}")]
async fn post_files(path: web::types::Path<(String, String)>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    let (slug, file) = path.into_inner();
    let Some(file_path) = state.post_file_path(&slug, &file) else {
        return Err(web::error::ErrorNotFound("File not found").into());
    };
    Ok(NamedFile::open(file_path)?)
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    let file_name = path.into_inner();
    if is_unsafe_name(&file_name) {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(file_name);
    Ok(NamedFile::open(file_path)?)
}

#[web::get("/rss")]
async fn rss(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match state.render_rss() {
        Ok(Some(xml)) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(xml),
        Ok(None) => web::HttpResponse::NotFound().finish(),
        Err(e) => {
            error!("{}", e);
            web::HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;

    let app_state = Arc::new(AppState::load(config)?);
    for post in app_state.catalog.posts() {
        debug!("Post: {}", post.slug);
    }

    info!("Listening on {}:{}", bind_addr, bind_port);
    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(api_posts)
            .service(public_files)
            .service(view)
            .service(view_wo_slash)
            .service(post_files)
            .service(rss)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
