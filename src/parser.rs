//! Template tag scanner and variable substitution.
//!
//! Add-ons expose `{namespace:set}`-style tags that stash values while a
//! template renders:
//!
//! ```text
//! {ns:set name="title" value="Hi"}           self-closing form
//! {ns:set name="title"}Hi{/ns:set}           pair form
//! {ns:set:append name="crumbs" value="Blog"} push to the end
//! {ns:set:prepend name="crumbs" value="Home"} push to the front
//! ```
//!
//! [`Parser::find_variables`] strips the setter tags out of the template and
//! accumulates their values; [`Parser::parse_variables`] substitutes
//! `namespace:key` occurrences back in, expanding sequence values through a
//! [`SectionRenderer`] and delegating `key:modifier` chains to a
//! [`VariableModifier`].
//!
//! Malformed tags are tolerated everywhere: a missing attribute is an empty
//! string, an unclosed tag swallows to the end of the template, and unknown
//! commands are dropped along with their tag. The only hard error is using
//! the host's reserved `layout` namespace.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{BaseeError, Result};

/// Namespace reserved for the host's own layout variables.
const RESERVED_NAMESPACE: &str = "layout";

/// A stored template variable: one value, or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Single(String),
    Many(Vec<String>),
}

impl TemplateValue {
    /// The scalar reading of this value.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            TemplateValue::Single(value) => Some(value),
            TemplateValue::Many(_) => None,
        }
    }

    /// The sequence reading of this value.
    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            TemplateValue::Single(_) => None,
            TemplateValue::Many(items) => Some(items),
        }
    }

    fn push_back(&mut self, value: String) {
        match self {
            TemplateValue::Many(items) => items.push(value),
            TemplateValue::Single(existing) => {
                *self = TemplateValue::Many(vec![std::mem::take(existing), value]);
            }
        }
    }

    fn push_front(&mut self, value: String) {
        match self {
            TemplateValue::Many(items) => items.insert(0, value),
            TemplateValue::Single(existing) => {
                *self = TemplateValue::Many(vec![value, std::mem::take(existing)]);
            }
        }
    }
}

/// One row of an expanded sequence variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRow {
    /// Zero-based position in the sequence.
    pub index: usize,
    /// One-based position.
    pub count: usize,
    /// Positions remaining including this one.
    pub reverse_count: usize,
    /// Sequence length.
    pub total_results: usize,
    /// The stored value.
    pub value: String,
}

/// Repeating-section renderer the host's template engine provides.
///
/// Given the template and the expanded rows for `name`, returns the
/// rewritten template. Occurrences the renderer leaves behind fall back to
/// the sequence's last value.
pub trait SectionRenderer {
    fn expand(&self, template: &str, name: &str, rows: &[SectionRow]) -> String;
}

/// Modifier-chain collaborator for `{ns:key[N]:modifier}` tags.
///
/// Receives the template with indexed tags rewritten into `key[N]:modifier`
/// form plus the resolved `ns:key[N]` base values.
pub trait VariableModifier {
    fn apply(&self, template: &str, variables: &HashMap<String, String>) -> String;
}

/// Scans a template for setter tags and substitutes stored variables.
pub struct Parser {
    template: String,
    variables: HashMap<String, TemplateValue>,
    scoped_variables: HashMap<String, HashMap<String, TemplateValue>>,
    section_renderer: Option<Box<dyn SectionRenderer>>,
    variable_modifier: Option<Box<dyn VariableModifier>>,
}

impl Parser {
    /// Create a parser over `template`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            variables: HashMap::new(),
            scoped_variables: HashMap::new(),
            section_renderer: None,
            variable_modifier: None,
        }
    }

    /// Attach the host's repeating-section renderer.
    pub fn with_section_renderer(mut self, renderer: Box<dyn SectionRenderer>) -> Self {
        self.section_renderer = Some(renderer);
        self
    }

    /// Attach the host's variable-modifier collaborator.
    pub fn with_variable_modifier(mut self, modifier: Box<dyn VariableModifier>) -> Self {
        self.variable_modifier = Some(modifier);
        self
    }

    /// The template in its current state.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Consume the parser, returning the template.
    pub fn into_template(self) -> String {
        self.template
    }

    /// All variables in the default bucket.
    pub fn variables(&self) -> &HashMap<String, TemplateValue> {
        &self.variables
    }

    /// One variable from the default bucket.
    pub fn variable(&self, name: &str) -> Option<&TemplateValue> {
        self.variables.get(name)
    }

    /// All variables routed into `scope`.
    pub fn scoped_variables(&self, scope: &str) -> Option<&HashMap<String, TemplateValue>> {
        self.scoped_variables.get(scope)
    }

    /// Scan for `{namespace:action...}` tags, store their values, and strip
    /// them from the template.
    ///
    /// `action` is almost always `set`; the scan also catches the
    /// `:append`/`:prepend` variants because their open tags share the
    /// `{namespace:set` prefix.
    pub fn find_variables(&mut self, namespace: &str, action: &str) -> Result<()> {
        if namespace == RESERVED_NAMESPACE {
            return Err(BaseeError::ReservedNamespace {
                namespace: namespace.to_string(),
            });
        }

        let tag_open = format!("{{{}:{}", namespace, action);

        while let Some(pos) = self.template.find(&tag_open) {
            let tag = full_tag_at(&self.template, pos).to_string();
            let params = parse_tag_parameters(&tag[tag_open.len().min(tag.len())..]);
            let scope = params.get("scope").cloned();
            let name = params.get("name").cloned().unwrap_or_default();

            // The command is the trailing path segment of the tag name:
            // {ns:set} -> set, {ns:set:append} -> append.
            let tag_name = tag
                .split_whitespace()
                .next()
                .unwrap_or(&tag)
                .trim_matches(|c| c == '{' || c == '}');
            let command = tag_name.rsplit(':').next().unwrap_or("set").to_string();

            let closing_tag = if command == "set" {
                format!("{{/{}:set}}", namespace)
            } else {
                format!("{{/{}:set:{}}}", namespace, command)
            };

            let scan_from = pos + tag_open.len();
            let next = self.template[scan_from..]
                .find(&tag_open)
                .map(|i| i + scan_from);
            let close = self.template[scan_from..]
                .find(&closing_tag)
                .map(|i| i + scan_from);

            // A close tag before the next open tag makes this a pair;
            // otherwise the value rides in the tag's own attributes.
            let (value, replace_len) = match close {
                Some(close) if next.is_none() || close < next.unwrap() => {
                    let start = pos + tag.len();
                    let value = self.template.get(start..close).unwrap_or("").to_string();
                    (value, close + closing_tag.len() - pos)
                }
                _ => (
                    params.get("value").cloned().unwrap_or_default(),
                    tag.len(),
                ),
            };

            self.template.replace_range(pos..pos + replace_len, "");

            let bucket = match &scope {
                Some(scope) => self.scoped_variables.entry(scope.clone()).or_default(),
                None => &mut self.variables,
            };

            match command.as_str() {
                "append" => bucket
                    .entry(name)
                    .or_insert_with(|| TemplateValue::Many(Vec::new()))
                    .push_back(value),
                "prepend" => bucket
                    .entry(name)
                    .or_insert_with(|| TemplateValue::Many(Vec::new()))
                    .push_front(value),
                "set" => {
                    bucket.insert(name, TemplateValue::Single(value));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Substitute stored variables back into the template.
    ///
    /// Pass `scope` to substitute from a scoped bucket instead of the
    /// default one. Scalars replace every `namespace:key` occurrence
    /// directly; sequences go through the section renderer with a last-item
    /// fallback; `{namespace:key index="N"}` tags resolve by position.
    pub fn parse_variables(&mut self, namespace: &str, scope: Option<&str>) {
        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            format!("{}:", namespace)
        };

        let collection = match scope {
            Some(scope) => self.scoped_variables.get(scope).cloned().unwrap_or_default(),
            None => self.variables.clone(),
        };

        for (key, value) in &collection {
            let needle = format!("{}{}", prefix, key);
            let braced = format!("{{{}}}", needle);

            match value {
                TemplateValue::Single(single) => {
                    self.template = self.template.replace(&braced, single);
                    self.template = self.template.replace(&needle, single);
                }
                TemplateValue::Many(items) => {
                    let total = items.len();
                    let rows: Vec<SectionRow> = items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| SectionRow {
                            index,
                            count: index + 1,
                            reverse_count: total - index,
                            total_results: total,
                            value: item.clone(),
                        })
                        .collect();

                    if let Some(renderer) = &self.section_renderer {
                        self.template = renderer.expand(&self.template, key, &rows);
                    }

                    // A sequence used as a single variable gets the last
                    // item. Only the braced form is eaten here so indexed
                    // reads of the same key survive to the pass below.
                    if self.template.contains(&braced) {
                        let last = items.last().map(String::as_str).unwrap_or_default();
                        self.template = self.template.replace(&braced, last);
                    }
                }
            }
        }

        self.parse_indexed_variables(&prefix);
    }

    /// Resolve `{prefix key index="N"}` tags against stored sequences.
    fn parse_indexed_variables(&mut self, prefix: &str) {
        let pattern = format!(
            r#"\{{{}([^\s]+?)\s+index\s*=\s*(?:"([^"]*)"|'([^']*)')\s*\}}"#,
            regex::escape(prefix)
        );
        let regex = Regex::new(&pattern).expect("valid regex");

        let mut replacements: Vec<(String, String)> = Vec::new();
        let mut modified: HashMap<String, String> = HashMap::new();

        for captures in regex.captures_iter(&self.template) {
            let full = captures[0].to_string();
            let var = &captures[1];
            let index = captures
                .get(2)
                .or_else(|| captures.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");

            if let Some(value) = self.variables.get(var) {
                let item = lookup_index(value, index);
                replacements.push((full, item));
            } else if let Some((base, modifiers)) = var.split_once(':') {
                // A modifier chain rides after the key. Rewrite the tag to
                // carry the resolved index so repeated modified reads don't
                // collapse onto one value, then hand off to the modifier
                // collaborator.
                let Some(value) = self.variables.get(base) else {
                    continue;
                };

                let rewritten = full.replacen(
                    &format!("{}{}", prefix, var),
                    &format!("{}{}[{}]:{}", prefix, base, index, modifiers),
                    1,
                );
                modified.insert(
                    format!("{}{}[{}]", prefix, base, index),
                    lookup_index(value, index),
                );
                replacements.push((full, rewritten));
            }
        }

        for (from, to) in replacements {
            self.template = self.template.replace(&from, &to);
        }

        if !modified.is_empty() {
            if let Some(modifier) = &self.variable_modifier {
                self.template = modifier.apply(&self.template, &modified);
            }
        }
    }
}

fn lookup_index(value: &TemplateValue, index: &str) -> String {
    let items = match value {
        TemplateValue::Many(items) => items.as_slice(),
        TemplateValue::Single(_) => return String::new(),
    };

    index
        .parse::<usize>()
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or_default()
}

/// The full `{...}` tag starting at `pos`, quote-aware.
///
/// An unclosed tag runs to the end of the template.
fn full_tag_at(template: &str, pos: usize) -> &str {
    let mut quote: Option<char> = None;

    for (i, c) in template[pos..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '}') => return &template[pos..pos + i + 1],
            _ => {}
        }
    }

    &template[pos..]
}

/// Parse `name="value"` pairs from a tag's attribute string.
///
/// Both quote styles are accepted; anything unparseable is skipped.
pub fn parse_tag_parameters(input: &str) -> HashMap<String, String> {
    let regex = Regex::new(r#"([A-Za-z0-9_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid regex");

    regex
        .captures_iter(input)
        .map(|captures| {
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");
            (captures[1].to_string(), value.to_string())
        })
        .collect()
}
