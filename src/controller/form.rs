//! Settings-form field sections and validation.
//!
//! The host renders forms from declared sections; each section groups
//! labeled settings, and each setting maps one or more field names to a
//! field definition. Validation runs against the declared rules before a
//! save callback ever sees the submission.

use std::collections::HashMap;

/// One renderable form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Host field type: `text`, `yes_no`, `checkbox`, `select`, ...
    pub kind: String,
    /// Current value rendered into the field.
    pub value: String,
}

/// One labeled setting row inside a section.
#[derive(Debug, Clone, Default)]
pub struct SettingField {
    pub title: String,
    pub desc: Option<String>,
    pub fields: HashMap<String, FieldDefinition>,
}

/// A titled group of settings.
#[derive(Debug, Clone, Default)]
pub struct FieldSection {
    pub name: String,
    pub settings: Vec<SettingField>,
}

/// Options used by [`build_settings_fields`] for one field.
#[derive(Debug, Clone)]
pub struct FieldOptions {
    pub title: String,
    pub desc: Option<String>,
    pub kind: String,
    pub value: String,
}

/// Build setting rows from field options, preferring saved values.
pub fn build_settings_fields(
    field_options: &[(String, FieldOptions)],
    values: &HashMap<String, String>,
) -> Vec<SettingField> {
    field_options
        .iter()
        .map(|(key, options)| {
            let value = values.get(key).cloned().unwrap_or_else(|| options.value.clone());

            SettingField {
                title: options.title.clone(),
                desc: options.desc.clone().filter(|d| !d.is_empty()),
                fields: HashMap::from([(
                    key.clone(),
                    FieldDefinition {
                        kind: options.kind.clone(),
                        value,
                    },
                )]),
            }
        })
        .collect()
}

/// Section title declared for a field name, scanning every section.
pub fn find_field_title(sections: &[FieldSection], needle: &str) -> Option<String> {
    for section in sections {
        for setting in &section.settings {
            if setting.fields.contains_key(needle) {
                return Some(setting.title.clone());
            }
        }
    }

    None
}

/// A declared validation rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Numeric,
}

impl Rule {
    fn check(self, value: Option<&str>) -> Option<&'static str> {
        match self {
            Rule::Required => match value {
                Some(v) if !v.trim().is_empty() => None,
                _ => Some("This field is required."),
            },
            Rule::Numeric => match value {
                Some(v) if !v.is_empty() && v.parse::<f64>().is_err() => {
                    Some("This field must contain a number.")
                }
                _ => None,
            },
        }
    }
}

/// A failed rule for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Run every declared rule against the submitted values.
///
/// Errors come back in rule-declaration order per field; fields are visited
/// in sorted order so output is stable.
pub fn validate(
    rules: &HashMap<String, Vec<Rule>>,
    submitted: &HashMap<String, String>,
) -> Vec<ValidationError> {
    let mut fields: Vec<&String> = rules.keys().collect();
    fields.sort();

    let mut errors = Vec::new();

    for field in fields {
        for rule in &rules[field] {
            if let Some(message) = rule.check(submitted.get(field).map(String::as_str)) {
                errors.push(ValidationError {
                    field: field.clone(),
                    message: message.to_string(),
                });
                break;
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<FieldSection> {
        vec![FieldSection {
            name: "general".into(),
            settings: vec![
                SettingField {
                    title: "Display Mode".into(),
                    desc: None,
                    fields: HashMap::from([(
                        "mode".to_string(),
                        FieldDefinition {
                            kind: "yes_no".into(),
                            value: "no".into(),
                        },
                    )]),
                },
                SettingField {
                    title: "Section Label".into(),
                    desc: Some("Shown in the sidebar".into()),
                    fields: HashMap::from([(
                        "label".to_string(),
                        FieldDefinition {
                            kind: "text".into(),
                            value: String::new(),
                        },
                    )]),
                },
            ],
        }]
    }

    #[test]
    fn find_field_title_scans_sections() {
        let sections = sections();

        assert_eq!(
            find_field_title(&sections, "label").as_deref(),
            Some("Section Label")
        );
        assert_eq!(find_field_title(&sections, "missing"), None);
    }

    #[test]
    fn build_settings_fields_prefers_saved_values() {
        let options = vec![(
            "label".to_string(),
            FieldOptions {
                title: "Section Label".into(),
                desc: Some(String::new()),
                kind: "text".into(),
                value: "default".into(),
            },
        )];
        let values = HashMap::from([("label".to_string(), "saved".to_string())]);

        let fields = build_settings_fields(&options, &values);

        assert_eq!(fields[0].fields["label"].value, "saved");
        // Empty descriptions are dropped.
        assert_eq!(fields[0].desc, None);
    }

    #[test]
    fn build_settings_fields_falls_back_to_default() {
        let options = vec![(
            "label".to_string(),
            FieldOptions {
                title: "Section Label".into(),
                desc: None,
                kind: "text".into(),
                value: "default".into(),
            },
        )];

        let fields = build_settings_fields(&options, &HashMap::new());

        assert_eq!(fields[0].fields["label"].value, "default");
    }

    #[test]
    fn required_rule_rejects_missing_and_empty() {
        let rules = HashMap::from([("label".to_string(), vec![Rule::Required])]);

        assert_eq!(validate(&rules, &HashMap::new()).len(), 1);

        let blank = HashMap::from([("label".to_string(), "  ".to_string())]);
        assert_eq!(validate(&rules, &blank).len(), 1);

        let filled = HashMap::from([("label".to_string(), "ok".to_string())]);
        assert!(validate(&rules, &filled).is_empty());
    }

    #[test]
    fn numeric_rule_allows_empty_and_numbers() {
        let rules = HashMap::from([("limit".to_string(), vec![Rule::Numeric])]);

        assert!(validate(&rules, &HashMap::new()).is_empty());

        let numeric = HashMap::from([("limit".to_string(), "12".to_string())]);
        assert!(validate(&rules, &numeric).is_empty());

        let text = HashMap::from([("limit".to_string(), "twelve".to_string())]);
        assert_eq!(validate(&rules, &text).len(), 1);
    }

    #[test]
    fn first_failing_rule_wins_per_field() {
        let rules = HashMap::from([("limit".to_string(), vec![Rule::Required, Rule::Numeric])]);

        let errors = validate(&rules, &HashMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "This field is required.");
    }
}
