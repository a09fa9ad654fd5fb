//! Admin settings page controller base.
//!
//! One request flows `parse route → authorize → dispatch action →
//! (render | handle submit) → (redirect | render)`. The controller owns the
//! routing, the dispatch table, sidebar generation, and submit handling;
//! the host renders whatever comes back.
//!
//! Actions live in an explicit dispatch table registered up front, so a
//! typo'd action name is visible at startup instead of failing somewhere
//! inside a reflective call.

pub mod form;
pub mod response;
pub mod route;
pub mod sidebar;

pub use form::{
    build_settings_fields, find_field_title, validate, FieldDefinition, FieldOptions,
    FieldSection, Rule, SettingField, ValidationError,
};
pub use response::SaveResponse;
pub use route::{Route, SETTINGS_ROOT};
pub use sidebar::{generate_sidebar, MenuChild, MenuSection, Sidebar};

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

/// Severity of an inline alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Issue,
}

/// Inline alert data the host renders above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub messages: Vec<String>,
}

impl Alert {
    pub fn success(title: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            title: title.into(),
            messages,
        }
    }

    pub fn issue(title: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            kind: AlertKind::Issue,
            title: title.into(),
            messages,
        }
    }
}

/// What the host should do after a form submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Send the browser to `url`, deferring `alert` to the next page.
    Redirect { url: String, alert: Option<Alert> },
    /// Re-render the form with an inline alert.
    Redisplay { alert: Alert },
}

type ActionHandler = Box<dyn Fn(&Route) -> HashMap<String, Value>>;
type SaveCallback = Box<dyn Fn(&HashMap<String, String>) -> Option<SaveResponse>>;

/// Base controller for one admin settings request.
pub struct Controller {
    route: Route,
    base_url: String,
    page: String,
    sections: Vec<FieldSection>,
    validation_rules: HashMap<String, Vec<Rule>>,
    bypass_validation: bool,
    sidebar_menu: Vec<MenuSection>,
    hidden_in_sidebar: Vec<String>,
    actions: HashMap<String, ActionHandler>,
    save_callback: Option<SaveCallback>,
}

impl Controller {
    /// Create a controller for a parsed route.
    pub fn new(route: Route) -> Self {
        let base_url = route.base_url();

        Self {
            route,
            base_url,
            page: String::new(),
            sections: Vec::new(),
            validation_rules: HashMap::new(),
            bypass_validation: false,
            sidebar_menu: Vec::new(),
            hidden_in_sidebar: Vec::new(),
            actions: HashMap::new(),
            save_callback: None,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The page path the current request renders, relative to the base URL.
    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn set_page(&mut self, page: impl Into<String>) {
        self.page = page.into();
    }

    /// Declare the form's field sections.
    pub fn set_sections(&mut self, sections: Vec<FieldSection>) {
        self.sections = sections;
    }

    pub fn sections(&self) -> &[FieldSection] {
        &self.sections
    }

    /// Declare validation rules checked before the save callback runs.
    pub fn set_validation_rules(&mut self, rules: HashMap<String, Vec<Rule>>) {
        self.validation_rules = rules;
    }

    /// Skip validation for submits that carry any data at all.
    pub fn set_bypass_validation(&mut self, bypass: bool) {
        self.bypass_validation = bypass;
    }

    pub fn set_sidebar_menu(&mut self, menu: Vec<MenuSection>) {
        self.sidebar_menu = menu;
    }

    pub fn set_hidden_in_sidebar(&mut self, hidden: Vec<String>) {
        self.hidden_in_sidebar = hidden;
    }

    /// Install the callback that persists a validated submission.
    pub fn set_save_callback(&mut self, callback: SaveCallback) {
        self.save_callback = Some(callback);
    }

    /// Register an action handler in the dispatch table.
    pub fn register_action(&mut self, name: impl Into<String>, handler: ActionHandler) {
        self.actions.insert(name.into(), handler);
    }

    /// Whether an action is registered; lets callers verify the table at
    /// startup.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Dispatch the routed action. Unknown actions yield an empty result.
    pub fn call_controller_action(&self) -> HashMap<String, Value> {
        match self.actions.get(&self.route.action) {
            Some(handler) => handler(&self.route),
            None => HashMap::new(),
        }
    }

    /// Resolve a page path into a full admin URL.
    ///
    /// Pages prefixed with `[ee]` link to native host pages instead of the
    /// add-on's.
    pub fn create_page_url(&self, page: &str) -> String {
        let (base, page) = match page.strip_prefix("[ee]") {
            Some(native) => ("", native),
            None => (self.base_url.as_str(), page),
        };

        reduce_double_slashes(&format!("{}/{}", base, page))
    }

    /// URL of the page currently being rendered.
    pub fn current_page_url(&self) -> String {
        self.create_page_url(&self.page)
    }

    /// URL of the add-on's landing page.
    pub fn module_home_url(&self) -> String {
        self.create_page_url("")
    }

    /// Append an entity id to a URL, keeping it inside the path when query
    /// parameters (the CP session id) follow.
    pub fn add_entity_to_url(&self, url: &str, entity_id: u64) -> String {
        match url.find('&') {
            Some(_) => url.replacen('&', &format!("/{}&", entity_id), 1),
            None => format!("{}/{}", url, entity_id),
        }
    }

    /// Generate the sidebar for the current request.
    pub fn generate_sidebar(&self, active_path: Option<&str>) -> Sidebar {
        let current_path = match (&self.route.controller, self.route.action.as_str()) {
            (Some(controller), "index") => controller.clone(),
            (Some(controller), action) => format!("{}/{}", controller, action),
            (None, _) => String::new(),
        };

        sidebar::generate_sidebar(
            &self.sidebar_menu,
            active_path,
            &current_path,
            &self.hidden_in_sidebar,
            |page| self.create_page_url(page),
        )
    }

    /// Validate and persist a form submission.
    ///
    /// On success the save callback runs and the redirect target resolves by
    /// priority: the response's redirect map keyed by the pressed submit
    /// button, then its explicit success URL, then the current page with the
    /// saved entity's id in the last segment, then the module home. On
    /// validation failure the form redisplays with one labeled error per
    /// failed field.
    pub fn handle_submit(
        &mut self,
        submitted: &HashMap<String, String>,
        submit_button: Option<&str>,
    ) -> SubmitOutcome {
        let errors = if self.bypass_validation && !submitted.is_empty() {
            Vec::new()
        } else {
            form::validate(&self.validation_rules, submitted)
        };

        if !errors.is_empty() {
            let messages = errors
                .iter()
                .map(|error| {
                    let label = find_field_title(&self.sections, &error.field)
                        .unwrap_or_else(|| error.field.clone());
                    format!("{}: {}", label, error.message)
                })
                .collect();

            return SubmitOutcome::Redisplay {
                alert: Alert::issue("Please correct the following errors.", messages),
            };
        }

        let Some(callback) = &self.save_callback else {
            return SubmitOutcome::Redirect {
                url: self.module_home_url(),
                alert: None,
            };
        };

        let Some(saved) = callback(submitted) else {
            return SubmitOutcome::Redirect {
                url: self.module_home_url(),
                alert: None,
            };
        };

        let alert = Alert::success(
            saved.success_title().to_string(),
            vec![saved.formatted_success_body()],
        );

        if let Some(url) = saved.success_url() {
            self.set_page(url.to_string());
        } else if let Some(entity_id) = saved.entity_id() {
            // A new entity saves with 0 in the last segment; swap in the
            // real id so the page reloads on the saved entity.
            let mut segments: Vec<&str> = self.page.split('/').collect();
            segments.pop();
            let page = format!("{}/{}", segments.join("/"), entity_id);
            self.route.entity_id = Some(entity_id);
            self.set_page(page.trim_start_matches('/').to_string());
        }

        if let Some(button) = submit_button {
            if let Some(url) = saved.redirect_options().get(button) {
                return SubmitOutcome::Redirect {
                    url: url.clone(),
                    alert: Some(alert),
                };
            }
        }

        SubmitOutcome::Redirect {
            url: self.current_page_url(),
            alert: Some(alert),
        }
    }
}

fn reduce_double_slashes(url: &str) -> String {
    let regex = Regex::new(r"([^:])//+").expect("valid regex");
    let collapsed = regex.replace_all(url, "$1/").into_owned();

    match collapsed.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => collapsed,
    }
}
