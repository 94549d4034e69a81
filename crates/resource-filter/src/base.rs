//! Name-based include/exclude matching
//!
//! A [`Filter`] holds four kinds of rules: exact include names, include
//! globs, exact exclude names and exclude globs, plus an `exclude_all`
//! switch. [`Filter::matches`] resolves them with a single fixed precedence:
//!
//! 1. `exclude_all` excludes everything.
//! 2. An include name wins, unless the same name is also an exclude name.
//! 3. An exclude name loses.
//! 4. With no globs of either kind, everything is included.
//! 5. With include globs, a name must match one of them, and is still
//!    excluded if it also matches an exclude glob.
//! 6. With only exclude globs, everything not matching them is included.
//!
//! Exact names act as overrides; only globs count as "rules" for steps 4-6.

use crate::error::FilterError;
use globset::{GlobBuilder, GlobMatcher};
use std::collections::HashSet;
use tracing::info;

/// A compiled wildcard expression together with its source text.
///
/// Supports `*` (any run of characters, `/` included), `?` (one
/// character), `[...]` classes and `{a,b}` alternates.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    matcher: GlobMatcher,
}

impl GlobPattern {
    pub fn compile(source: &str) -> Result<Self, FilterError> {
        let glob = GlobBuilder::new(source)
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .map_err(|err| FilterError::PatternCompile {
                pattern: source.to_string(),
                source: err,
            })?;
        Ok(Self {
            source: source.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn compile_all<S: AsRef<str>>(exprs: &[S]) -> Result<Vec<GlobPattern>, FilterError> {
    exprs.iter().map(|expr| GlobPattern::compile(expr.as_ref())).collect()
}

fn match_globs(name: &str, globs: &[GlobPattern]) -> bool {
    globs.iter().any(|glob| glob.is_match(name))
}

fn sorted<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut list: Vec<&str> = names.into_iter().map(String::as_str).collect();
    list.sort_unstable();
    list
}

/// Partition of a candidate set into included and excluded names.
///
/// Every candidate lands in exactly one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub included: HashSet<String>,
    pub excluded: HashSet<String>,
}

impl MatchResult {
    /// Included names in lexical order
    pub fn included_sorted(&self) -> Vec<&str> {
        sorted(&self.included)
    }

    /// Excluded names in lexical order
    pub fn excluded_sorted(&self) -> Vec<&str> {
        sorted(&self.excluded)
    }
}

/// Include/exclude rules over resource names
#[derive(Debug, Clone, Default)]
pub struct Filter {
    exclude_all: bool,

    include_names: HashSet<String>,
    include_globs: Vec<GlobPattern>,

    exclude_names: HashSet<String>,
    exclude_globs: Vec<GlobPattern>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes every name regardless of any other rule
    pub fn set_exclude_all(&mut self, exclude_all: bool) {
        self.exclude_all = exclude_all;
    }

    pub fn exclude_all(&self) -> bool {
        self.exclude_all
    }

    /// Registers exact names to include
    pub fn append_include_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_names.extend(names.into_iter().map(Into::into));
    }

    /// Registers exact names to exclude
    pub fn append_exclude_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_names.extend(names.into_iter().map(Into::into));
    }

    /// Registers exclude globs.
    ///
    /// Exclude globs don't have to match anything. Nothing is registered if
    /// any expression fails to compile.
    pub fn append_exclude_globs<S: AsRef<str>>(&mut self, exprs: &[S]) -> Result<(), FilterError> {
        let compiled = compile_all(exprs)?;
        self.exclude_globs.extend(compiled);
        Ok(())
    }

    /// Registers include globs, which must match at least one of `candidates`.
    ///
    /// When neither the new nor the previously registered include globs
    /// match any candidate, fails with [`FilterError::NoMatch`] and leaves
    /// the filter untouched. `resource` labels the error message.
    pub fn append_include_globs<S: AsRef<str>>(
        &mut self,
        candidates: &[String],
        resource: &str,
        exprs: &[S],
    ) -> Result<(), FilterError> {
        let compiled = compile_all(exprs)?;
        if compiled.is_empty() {
            return Ok(());
        }

        let all: Vec<&GlobPattern> = self.include_globs.iter().chain(compiled.iter()).collect();
        let matches_anything = candidates
            .iter()
            .any(|name| all.iter().any(|glob| glob.is_match(name)));
        if !matches_anything {
            let patterns = all.iter().map(|glob| glob.as_str()).collect::<Vec<_>>().join(",");
            return Err(FilterError::NoMatch {
                resource: resource.to_string(),
                patterns,
            });
        }

        self.include_globs.extend(compiled);
        Ok(())
    }

    /// Whether include globs are registered
    pub fn has_include_rules(&self) -> bool {
        !self.include_globs.is_empty()
    }

    /// Whether exclude globs are registered
    pub fn has_exclude_rules(&self) -> bool {
        !self.exclude_globs.is_empty()
    }

    pub fn matches_include_globs(&self, name: &str) -> bool {
        match_globs(name, &self.include_globs)
    }

    pub fn is_include_name(&self, name: &str) -> bool {
        self.include_names.contains(name)
    }

    pub fn is_exclude_name(&self, name: &str) -> bool {
        self.exclude_names.contains(name)
    }

    /// Include names (sorted) followed by include globs, comma-separated
    pub fn describe_include_rules(&self) -> String {
        describe_rules(&self.include_names, &self.include_globs)
    }

    /// Exclude names (sorted) followed by exclude globs, comma-separated
    pub fn describe_exclude_rules(&self) -> String {
        describe_rules(&self.exclude_names, &self.exclude_globs)
    }

    /// Decides whether `name` is included.
    pub fn matches(&self, name: &str) -> bool {
        if self.exclude_all {
            return false;
        }

        // Name overrides
        if self.include_names.contains(name) && !self.exclude_names.contains(name) {
            return true;
        }
        if self.exclude_names.contains(name) {
            return false;
        }

        let has_include_rules = self.has_include_rules();
        let has_exclude_rules = self.has_exclude_rules();

        if !has_include_rules && !has_exclude_rules {
            return true;
        }

        if has_include_rules {
            // Not matching an include glob excludes regardless of exclude rules;
            // matching both include and exclude globs excludes too.
            return self.matches_include_globs(name) && !match_globs(name, &self.exclude_globs);
        }

        !match_globs(name, &self.exclude_globs)
    }

    /// Partitions `names` into included and excluded sets.
    pub fn match_all<I, S>(&self, names: I) -> MatchResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = MatchResult::default();
        for name in names {
            let name = name.as_ref();
            if !self.exclude_all && self.matches(name) {
                result.included.insert(name.to_string());
            } else {
                result.excluded.insert(name.to_string());
            }
        }
        result
    }

    /// Excludes `names` because they already exist.
    ///
    /// Fails with [`FilterError::Conflict`] if any of them is also requested
    /// by an include name or include glob; in that case nothing is excluded.
    pub fn set_exclude_existing<I, S>(&mut self, names: I, resource: &str) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: HashSet<String> = names.into_iter().map(Into::into).collect();
        let unique = sorted(&unique).into_iter().map(str::to_string).collect::<Vec<_>>();

        if let Some(name) = unique
            .iter()
            .find(|name| self.include_names.contains(*name) || self.matches_include_globs(name))
        {
            return Err(FilterError::Conflict {
                resource: resource.to_string(),
                name: name.clone(),
                rules: self.describe_include_rules(),
            });
        }

        if !unique.is_empty() {
            info!(
                "{} existing {}(s) ({}) will be excluded",
                unique.len(),
                resource,
                unique.join(",")
            );
        }
        self.exclude_names.extend(unique);
        Ok(())
    }

    /// Logs the rules in effect and how they partitioned the candidates.
    pub fn log_info(&self, resource: &str, result: &MatchResult) {
        if self.has_include_rules() {
            info!("combined include rules: {}", self.describe_include_rules());
            if result.included.is_empty() {
                info!("no {resource}s present in the current set were included by the filter");
            }
        }
        if !result.included.is_empty() {
            log_subset(resource, &result.included_sorted(), "included");
        }
        if self.has_exclude_rules() {
            info!("combined exclude rules: {}", self.describe_exclude_rules());
            if result.excluded.is_empty() {
                info!("no {resource}s present in the current set were excluded by the filter");
            }
        }
        if !result.excluded.is_empty() {
            log_subset(resource, &result.excluded_sorted(), "excluded");
        }
    }
}

fn describe_rules(names: &HashSet<String>, globs: &[GlobPattern]) -> String {
    sorted(names)
        .into_iter()
        .chain(globs.iter().map(GlobPattern::as_str))
        .collect::<Vec<_>>()
        .join(",")
}

fn log_subset(resource: &str, names: &[&str], status: &str) {
    let list = names.join(", ");
    if names.len() == 1 {
        info!("1 {resource} ({list}) was {status} (based on the include/exclude rules)");
    } else {
        info!(
            "{} {resource}s ({list}) were {status} (based on the include/exclude rules)",
            names.len()
        );
    }
}
