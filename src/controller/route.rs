//! Admin URL route parsing.
//!
//! Every module settings page follows the same segment pattern under the
//! host's add-on settings root:
//!
//! ```text
//! addons/settings/ADDON/[controller]/[action]/[entityId]
//! ```

/// Root path the host serves add-on settings pages under.
pub const SETTINGS_ROOT: &str = "addons/settings";

/// Parsed admin-page route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub addon: Option<String>,
    pub controller: Option<String>,
    pub action: String,
    pub entity_id: Option<u64>,
}

impl Route {
    /// Parse a path relative to the settings root.
    ///
    /// Paths that do not contain the root parse to an empty route with the
    /// default `index` action.
    pub fn parse(path: &str) -> Self {
        let mut route = Route {
            action: "index".to_string(),
            ..Default::default()
        };

        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        // Locate the addons/settings prefix; segments follow it.
        let root = segments
            .windows(2)
            .position(|w| matches!(w, ["addons", "settings"]));

        let Some(root) = root else {
            return route;
        };

        let mut rest = segments[root + 2..].iter();

        route.addon = rest.next().map(|s| s.to_string());
        route.controller = rest.next().map(|s| s.to_string());
        if let Some(action) = rest.next() {
            route.action = action.to_string();
        }
        route.entity_id = rest.next().and_then(|s| s.parse().ok());

        route
    }

    /// Base URL for the routed add-on: `addons/settings/<addon>`.
    pub fn base_url(&self) -> String {
        match &self.addon {
            Some(addon) => format!("{}/{}", SETTINGS_ROOT, addon),
            None => SETTINGS_ROOT.to_string(),
        }
    }

    /// View file path for the routed controller/action.
    pub fn view_path(&self) -> String {
        let mut parts = Vec::new();
        if let Some(controller) = &self.controller {
            parts.push(controller.as_str());
        }
        parts.push(&self.action);
        parts.join("/")
    }
}
