use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};

/// Rendered pages by key. A non caching instance renders every time.
/// Entries live as long as the process, posts do not change after start.
pub struct ContentCache<T> {
    cache: Option<RwLock<HashMap<String, Arc<T>>>>,
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        ContentCache {
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    pub fn non_caching() -> Self {
        ContentCache {
            cache: None,
        }
    }

    pub fn post_key(slug: &str, variant: &str) -> String {
        format!("post-{}-{}", slug, variant)
    }

    pub fn add(&self, key: String, content: T) -> Arc<T> {
        let value = Arc::new(content);
        let Some(ref cache) = self.cache else {
            return value;
        };

        // A poisoned lock only means we stop caching
        if let Ok(mut cache) = cache.write() {
            cache.insert(key, value.clone());
        }
        value
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let cache = self.cache.as_ref()?.read().ok()?;
        cache.get(key).cloned()
    }

    pub fn get_or<F>(&self, key: &str, render: F) -> io::Result<Arc<T>>
        where F: FnOnce() -> io::Result<T>
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let content = render()?;
        Ok(self.add(key.to_string(), content))
    }
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
