pub mod config;
pub mod logger;
pub mod server;
pub mod catalog;
pub mod content;
pub mod content_cache;
pub mod list_state;
pub mod post_tab;
pub mod view;
mod post_list;
mod query_string;
mod text_utils;
mod test_data;
