//! Extension registry: keyword to handler lookup, owned by one parser.
//!
//! # Features
//! - Register, look up and remove handlers by keyword (case-sensitive).
//! - Registering an existing keyword replaces the old handler and returns it.
//! - Built-in special forms (`define`, `let`, ...) always win over a
//!   registered handler of the same name; such registrations are accepted
//!   but logged as unreachable.
//!
//! A registry is plain configuration: it is handed to a parser at
//! construction and is never shared process-wide.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::extensions::{register_std_extensions, SyntaxExtension};
use crate::syntax::forms::is_special_form;

#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Arc<dyn SyntaxExtension>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    ///
    /// ```rust
    /// use kacket::extensions::ExtensionRegistry;
    /// let registry = ExtensionRegistry::new();
    /// assert!(registry.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with `define-datatype` and `cases`.
    ///
    /// ```rust
    /// use kacket::extensions::ExtensionRegistry;
    /// let registry = ExtensionRegistry::with_std();
    /// assert!(registry.contains("cases"));
    /// assert!(registry.contains("define-datatype"));
    /// ```
    pub fn with_std() -> Self {
        let mut registry = Self::new();
        register_std_extensions(&mut registry);
        registry
    }

    /// Registers `extension` under `keyword`, returning the handler it replaced.
    pub fn register(
        &mut self,
        keyword: impl Into<String>,
        extension: impl SyntaxExtension + 'static,
    ) -> Option<Arc<dyn SyntaxExtension>> {
        let keyword = keyword.into();
        if is_special_form(&keyword) {
            warn!(keyword = %keyword, "extension shadowed by a built-in special form");
        }
        debug!(keyword = %keyword, "registering syntax extension");
        self.extensions.insert(keyword, Arc::new(extension))
    }

    pub fn unregister(&mut self, keyword: &str) -> Option<Arc<dyn SyntaxExtension>> {
        self.extensions.remove(keyword)
    }

    pub fn lookup(&self, keyword: &str) -> Option<&Arc<dyn SyntaxExtension>> {
        self.extensions.get(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.extensions.contains_key(keyword)
    }

    /// Registered keywords in sorted order.
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("keywords", &self.keywords())
            .finish()
    }
}
