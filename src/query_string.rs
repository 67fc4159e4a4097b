use std::collections::HashMap;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get_tab(&self) -> Option<&str> {
        self.items.get("tab").map(|s| s.as_str())
    }

    /// Non numeric values are ignored
    pub fn get_count(&self, key: &str) -> Option<usize> {
        self.items.get(key).and_then(|val| val.parse().ok())
    }
}
