//! Save-outcome value object.
//!
//! A settings form's save callback describes what happened with a
//! [`SaveResponse`]; the controller turns it into an alert and a redirect.
//! The response only lives for the duration of one submit.

use std::collections::HashMap;

/// Outcome of a settings-form save callback.
#[derive(Debug, Clone, Default)]
pub struct SaveResponse {
    entity_id: Option<u64>,
    message_parameters: Vec<String>,
    save_redirect_options: HashMap<String, String>,
    save_success_url: Option<String>,
    save_success_title: String,
    save_success_body: String,
    save_error_title: String,
    save_error_body: String,
}

impl SaveResponse {
    /// A response with the given success alert title and body.
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            save_success_title: title.into(),
            save_success_body: body.into(),
            ..Default::default()
        }
    }

    /// Id of the entity that was just saved.
    pub fn with_entity_id(mut self, entity_id: u64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// Values substituted for `%s` placeholders in the success body.
    pub fn with_message_parameters(mut self, parameters: Vec<String>) -> Self {
        self.message_parameters = parameters;
        self
    }

    /// Redirect targets keyed by the submit button that was pressed.
    pub fn with_redirect_options(mut self, options: HashMap<String, String>) -> Self {
        self.save_redirect_options = options;
        self
    }

    /// Explicit page to land on after a successful save.
    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.save_success_url = Some(url.into());
        self
    }

    /// Error alert shown when the save itself fails.
    pub fn with_error(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.save_error_title = title.into();
        self.save_error_body = body.into();
        self
    }

    pub fn entity_id(&self) -> Option<u64> {
        self.entity_id
    }

    pub fn message_parameters(&self) -> &[String] {
        &self.message_parameters
    }

    pub fn redirect_options(&self) -> &HashMap<String, String> {
        &self.save_redirect_options
    }

    pub fn success_url(&self) -> Option<&str> {
        self.save_success_url.as_deref()
    }

    pub fn success_title(&self) -> &str {
        &self.save_success_title
    }

    pub fn success_body(&self) -> &str {
        &self.save_success_body
    }

    pub fn error_title(&self) -> &str {
        &self.save_error_title
    }

    pub fn error_body(&self) -> &str {
        &self.save_error_body
    }

    /// Success body with `%s` placeholders filled from the message
    /// parameters, in order. Extra placeholders are left as-is.
    pub fn formatted_success_body(&self) -> String {
        let mut body = self.save_success_body.clone();
        for parameter in &self.message_parameters {
            if let Some(pos) = body.find("%s") {
                body.replace_range(pos..pos + 2, parameter);
            }
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_carries_alert_text() {
        let response = SaveResponse::success("Saved", "Settings saved.");

        assert_eq!(response.success_title(), "Saved");
        assert_eq!(response.success_body(), "Settings saved.");
        assert_eq!(response.entity_id(), None);
    }

    #[test]
    fn builder_accumulates_fields() {
        let response = SaveResponse::success("Saved", "Saved %s.")
            .with_entity_id(7)
            .with_message_parameters(vec!["Products".into()])
            .with_success_url("categories/edit/7")
            .with_error("Failed", "Could not save.");

        assert_eq!(response.entity_id(), Some(7));
        assert_eq!(response.success_url(), Some("categories/edit/7"));
        assert_eq!(response.error_title(), "Failed");
    }

    #[test]
    fn formatted_body_substitutes_in_order() {
        let response = SaveResponse::success("Saved", "Saved %s to %s.")
            .with_message_parameters(vec!["Products".into(), "site one".into()]);

        assert_eq!(
            response.formatted_success_body(),
            "Saved Products to site one."
        );
    }

    #[test]
    fn extra_placeholders_are_left_alone() {
        let response = SaveResponse::success("Saved", "Saved %s and %s.")
            .with_message_parameters(vec!["one".into()]);

        assert_eq!(response.formatted_success_body(), "Saved one and %s.");
    }

    #[test]
    fn redirect_options_lookup_by_button() {
        let response = SaveResponse::success("Saved", "ok").with_redirect_options(
            HashMap::from([("save_and_new".to_string(), "categories/edit/0".to_string())]),
        );

        assert_eq!(
            response.redirect_options().get("save_and_new").unwrap(),
            "categories/edit/0"
        );
    }
}
