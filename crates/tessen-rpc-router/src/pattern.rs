//! Method pattern compilation.
//!
//! A method pattern is a method string with embedded `{name}` placeholders;
//! `{name?}` marks an optional parameter that may be absent from the tail of
//! the concrete method. Patterns compile into an anchored regex with named
//! capture groups, one per placeholder.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Placeholder token: `{name}` or `{name?}`.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}").unwrap());

/// Default token constraint: any run of characters excluding the method
/// segment separators. A `where` constraint overrides this per parameter.
const DEFAULT_CLASS: &str = "[^/.]+";

/// Method strings are leading/trailing slash-insensitive, like URL paths.
pub(crate) fn trim_method(method: &str) -> &str {
    method.trim_matches('/')
}

/// Faults raised while compiling a method pattern. These surface at
/// registration time, never as dispatch-time JSON-RPC errors.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("stray brace in pattern '{pattern}'")]
    StrayBrace { pattern: String },

    #[error("duplicate parameter '{name}' in pattern '{pattern}'")]
    DuplicateParameter { name: String, pattern: String },

    #[error("optional parameter '{name}' must sit at the tail of pattern '{pattern}'")]
    OptionalNotTrailing { name: String, pattern: String },

    #[error("invalid constraint for parameter '{name}': {source}")]
    InvalidConstraint {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to compile pattern '{pattern}': {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled method pattern: anchored regex plus parameter metadata.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    regex: Regex,
    parameters: Vec<String>,
    optional: HashSet<String>,
}

impl CompiledPattern {
    /// Compile a pattern, applying per-parameter `where` constraints.
    pub fn compile(
        pattern: &str,
        wheres: &HashMap<String, String>,
    ) -> Result<Self, PatternError> {
        let trimmed = trim_method(pattern);

        let mut regex_src = String::from("^");
        let mut parameters: Vec<String> = Vec::new();
        let mut optional = HashSet::new();
        let mut last_end = 0;
        let mut trailing_optional: Option<String> = None;

        for captures in TOKEN.captures_iter(trimmed) {
            let token = captures.get(0).unwrap();
            let name = captures.get(1).unwrap().as_str();
            let is_optional = captures.get(2).is_some();

            let literal = &trimmed[last_end..token.start()];
            if literal.contains('{') || literal.contains('}') {
                return Err(PatternError::StrayBrace {
                    pattern: trimmed.to_string(),
                });
            }
            if parameters.iter().any(|p| p == name) {
                return Err(PatternError::DuplicateParameter {
                    name: name.to_string(),
                    pattern: trimmed.to_string(),
                });
            }
            if let Some(earlier) = &trailing_optional {
                if !is_optional {
                    return Err(PatternError::OptionalNotTrailing {
                        name: earlier.clone(),
                        pattern: trimmed.to_string(),
                    });
                }
            }

            let class = match wheres.get(name) {
                Some(constraint) => {
                    Regex::new(&format!("^(?:{})$", constraint)).map_err(|source| {
                        PatternError::InvalidConstraint {
                            name: name.to_string(),
                            source,
                        }
                    })?;
                    constraint.as_str()
                }
                None => DEFAULT_CLASS,
            };

            if is_optional {
                trailing_optional = Some(name.to_string());
                optional.insert(name.to_string());
                // The separator preceding an optional token folds into its
                // group so the token can vanish together with the separator.
                match literal.chars().last() {
                    Some(sep @ ('.' | '/')) => {
                        regex_src.push_str(&regex::escape(&literal[..literal.len() - 1]));
                        regex_src.push_str(&format!(
                            "(?:{}(?P<{}>{}))?",
                            regex::escape(&sep.to_string()),
                            name,
                            class
                        ));
                    }
                    _ => {
                        regex_src.push_str(&regex::escape(literal));
                        regex_src.push_str(&format!("(?P<{}>{})?", name, class));
                    }
                }
            } else {
                regex_src.push_str(&regex::escape(literal));
                regex_src.push_str(&format!("(?P<{}>{})", name, class));
            }

            parameters.push(name.to_string());
            last_end = token.end();
        }

        let tail = &trimmed[last_end..];
        if tail.contains('{') || tail.contains('}') {
            return Err(PatternError::StrayBrace {
                pattern: trimmed.to_string(),
            });
        }
        if let Some(name) = trailing_optional {
            if !tail.is_empty() {
                return Err(PatternError::OptionalNotTrailing {
                    name,
                    pattern: trimmed.to_string(),
                });
            }
        }
        regex_src.push_str(&regex::escape(tail));
        regex_src.push('$');

        let regex = Regex::new(&regex_src).map_err(|source| PatternError::Compile {
            pattern: trimmed.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: trimmed.to_string(),
            regex,
            parameters,
            optional,
        })
    }

    /// The original (trimmed) pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in order of appearance.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameters
    }

    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.contains(name)
    }

    /// True when the pattern carries no placeholders at all.
    pub fn is_static(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Exact structural match, case-sensitive, slash-insensitive at the ends.
    pub fn matches(&self, method: &str) -> bool {
        self.regex.is_match(trim_method(method))
    }

    /// Named captures present in the concrete method. Missing optional
    /// parameters are simply absent, never present with an empty value.
    pub fn extract(&self, method: &str) -> HashMap<String, String> {
        let mut values = HashMap::new();
        if let Some(captures) = self.regex.captures(trim_method(method)) {
            for name in &self.parameters {
                if let Some(capture) = captures.name(name) {
                    if !capture.as_str().is_empty() {
                        values.insert(name.clone(), capture.as_str().to_string());
                    }
                }
            }
        }
        values
    }
}
