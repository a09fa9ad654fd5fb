//! Host application context.
//!
//! Add-ons run inside a host CMS that changes behavior between major
//! versions. Rather than reading globals, every collaborator that cares
//! receives a [`HostContext`] at construction and asks it explicit questions:
//! which version is running, which site is active, what kind of request this
//! is, and whether a named host feature exists yet.

use std::collections::HashMap;

use crate::updates::compare_versions;

/// The kind of request the host is currently serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A front-end page render.
    Page,
    /// An admin control-panel request.
    ControlPanel,
    /// A host action endpoint (form posts, webhooks).
    Action,
}

/// Word separator the host is configured to use for slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordSeparator {
    #[default]
    Dash,
    Underscore,
}

impl WordSeparator {
    /// The literal separator character.
    pub fn as_char(self) -> char {
        match self {
            WordSeparator::Dash => '-',
            WordSeparator::Underscore => '_',
        }
    }
}

/// Immutable snapshot of the host environment for one request.
#[derive(Debug, Clone)]
pub struct HostContext {
    version: String,
    site_id: u32,
    request: RequestKind,
    word_separator: WordSeparator,
    features: HashMap<String, String>,
}

impl HostContext {
    /// Create a context for the given host version and active site.
    pub fn new(version: impl Into<String>, site_id: u32, request: RequestKind) -> Self {
        Self {
            version: version.into(),
            site_id,
            request,
            word_separator: WordSeparator::default(),
            features: HashMap::new(),
        }
    }

    /// Override the configured word separator.
    pub fn with_word_separator(mut self, separator: WordSeparator) -> Self {
        self.word_separator = separator;
        self
    }

    /// Register host features and the version each first shipped in.
    ///
    /// Keys are feature names, values are dotted minimum versions, e.g.
    /// `("live_preview", "4.1")`.
    pub fn with_features<I, K, V>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.features
            .extend(features.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Full dotted host version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// First component of the host version, `0` if unparseable.
    pub fn major_version(&self) -> u32 {
        self.version
            .split('.')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// True when the host major version is exactly `major`.
    pub fn is_major(&self, major: u32) -> bool {
        self.major_version() == major
    }

    /// True when the host major version is `major` or newer.
    pub fn is_at_least_major(&self, major: u32) -> bool {
        self.major_version() >= major
    }

    /// True when the host version is at least the given dotted version.
    pub fn is_at_least(&self, version: &str) -> bool {
        compare_versions(&self.version, version) != std::cmp::Ordering::Less
    }

    /// Whether a registered host feature is available in this version.
    ///
    /// Unregistered feature names are never available.
    pub fn is_feature_available(&self, feature: &str) -> bool {
        match self.features.get(feature) {
            Some(min_version) => self.is_at_least(min_version),
            None => false,
        }
    }

    /// The active site id for this request.
    pub fn site_id(&self) -> u32 {
        self.site_id
    }

    /// The kind of request being served.
    pub fn request(&self) -> RequestKind {
        self.request
    }

    /// True when serving an admin control-panel request.
    pub fn is_control_panel(&self) -> bool {
        self.request == RequestKind::ControlPanel
    }

    /// The host's configured slug separator.
    pub fn word_separator(&self) -> WordSeparator {
        self.word_separator
    }
}
