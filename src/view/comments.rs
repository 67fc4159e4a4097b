use crate::config::Comments;

const DEFAULT_LIGHT_THEME: &str = "github-light";
const DEFAULT_DARK_THEME: &str = "github-dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    /// Reads the `theme` cookie set by the theme toggle. Anything but `dark` is light.
    pub fn from_cookie_header(cookie_header: Option<&str>) -> Self {
        let Some(cookie_header) = cookie_header else {
            return ThemeMode::Light;
        };

        let is_dark = cookie_header.split(';')
            .filter_map(|pair| pair.split_once('='))
            .any(|(name, value)| name.trim() == "theme" && value.trim() == "dark");

        if is_dark { ThemeMode::Dark } else { ThemeMode::Light }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Utterances widget, embedded by repository reference. Both themes are kept
/// so the page can switch without a reload.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentWidget {
    pub repo: String,
    pub theme: String,
    pub light_theme: String,
    pub dark_theme: String,
}

impl CommentWidget {
    pub fn new(comments: &Comments, mode: ThemeMode) -> Self {
        let light_theme = comments.light_theme.as_deref().unwrap_or(DEFAULT_LIGHT_THEME).to_string();
        let dark_theme = comments.dark_theme.as_deref().unwrap_or(DEFAULT_DARK_THEME).to_string();
        let theme = match mode {
            ThemeMode::Light => light_theme.clone(),
            ThemeMode::Dark => dark_theme.clone(),
        };

        CommentWidget {
            repo: comments.repo.clone(),
            theme,
            light_theme,
            dark_theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_cookie() {
        assert_eq!(ThemeMode::from_cookie_header(None), ThemeMode::Light);
        assert_eq!(ThemeMode::from_cookie_header(Some("theme=dark")), ThemeMode::Dark);
        assert_eq!(ThemeMode::from_cookie_header(Some("session=abc; theme=dark")), ThemeMode::Dark);
        assert_eq!(ThemeMode::from_cookie_header(Some("theme=light")), ThemeMode::Light);
        assert_eq!(ThemeMode::from_cookie_header(Some("darktheme=dark")), ThemeMode::Light);
        assert_eq!(ThemeMode::from_cookie_header(Some("garbage")), ThemeMode::Light);
    }

    #[test]
    fn test_widget_theme() {
        let comments = Comments {
            repo: "dayong/utterances_comment".to_string(),
            light_theme: None,
            dark_theme: Some("photon-dark".to_string()),
        };
        assert_eq!(CommentWidget::new(&comments, ThemeMode::Light).theme, "github-light");
        assert_eq!(CommentWidget::new(&comments, ThemeMode::Dark).theme, "photon-dark");
        let widget = CommentWidget::new(&comments, ThemeMode::Light);
        assert_eq!(widget.repo, "dayong/utterances_comment");
        assert_eq!(widget.light_theme, "github-light");
        assert_eq!(widget.dark_theme, "photon-dark");
    }
}
