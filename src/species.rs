//! Species: the atomic unit of a chemical reaction network.
//!
//! A species is either *concrete* (a literal name) or a *schema* (a
//! template with `{group}` placeholders, each bound to a regular
//! expression). See [`crate::schema`] for how schema species are expanded
//! into concrete reactions against a live state.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::Error;

/// Name reserved for the time axis of a simulation result; never a valid
/// species name.
pub const TIME: &str = "time";
/// Name reserved for "no reactant"/"no product". Concentration is fixed at
/// 1 in rate laws and the species is hidden from stochastic output.
pub const NOTHING: &str = "nothing";

#[derive(Debug, Clone)]
enum SpeciesKind {
    Concrete,
    Schema {
        /// group name -> regex pattern, fully populated (default `.*`
        /// for any placeholder the caller didn't specify a pattern for).
        groups: BTreeMap<String, String>,
        compiled: Arc<OnceLock<Regex>>,
    },
}

/// A chemical species: either a concrete, named kind, or a schema standing
/// for a family of concrete species.
#[derive(Debug, Clone)]
pub struct Species {
    name: String,
    kind: SpeciesKind,
}

impl Species {
    /// Constructs a concrete species named `name`.
    ///
    /// # Errors
    /// Returns [`Error::Input`] if `name` is the reserved word `"time"`.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name == TIME {
            return Err(Error::Input(
                "'time' is a reserved species name and cannot be constructed".into(),
            ));
        }
        Ok(Species {
            name,
            kind: SpeciesKind::Concrete,
        })
    }

    /// The reserved `nothing` species: unit concentration, hidden from
    /// stochastic output.
    pub fn nothing() -> Self {
        Species {
            name: NOTHING.to_string(),
            kind: SpeciesKind::Concrete,
        }
    }

    /// Constructs a schema species from a template and a mapping from group
    /// name to regex pattern. Any `{group}` placeholder in `template` not
    /// given an explicit pattern defaults to `.*`.
    pub fn schema(
        template: impl Into<String>,
        groups: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, Error> {
        let template = template.into();
        if template == TIME {
            return Err(Error::Input(
                "'time' is a reserved species name and cannot be constructed".into(),
            ));
        }
        let mut full_groups: BTreeMap<String, String> = groups.into_iter().collect();
        for key in template_keys(&template) {
            full_groups.entry(key).or_insert_with(|| ".*".to_string());
        }
        Ok(Species {
            name: template,
            kind: SpeciesKind::Schema {
                groups: full_groups,
                compiled: Arc::new(OnceLock::new()),
            },
        })
    }

    /// The species' name (for a schema, its template).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this is a schema species.
    pub fn is_schema(&self) -> bool {
        matches!(self.kind, SpeciesKind::Schema { .. })
    }

    /// True if this is the reserved `nothing` species.
    pub fn is_nothing(&self) -> bool {
        !self.is_schema() && self.name == NOTHING
    }

    /// True if a schema species still has unbound `{group}` placeholders.
    /// Always `false` for a concrete species.
    pub fn has_free_groups(&self) -> bool {
        self.is_schema() && !template_keys(&self.name).is_empty()
    }

    /// Compiles (and caches) the anchored regular expression this schema
    /// species' template reactifies to: every `{group}` placeholder becomes
    /// a named capture group `(?P<group>pattern)`, literal text is escaped,
    /// and the whole pattern is anchored with `^...$`.
    ///
    /// # Errors
    /// Returns [`Error::Schema`] if the resulting pattern fails to compile,
    /// or if called on a concrete species.
    pub fn reactify(&self) -> Result<Arc<Regex>, Error> {
        let (groups, compiled) = match &self.kind {
            SpeciesKind::Concrete => {
                return Err(Error::Schema(format!(
                    "cannot reactify concrete species '{}'",
                    self.name
                )))
            }
            SpeciesKind::Schema { groups, compiled } => (groups, compiled),
        };

        // Fast path: already compiled. `get_or_init` can't propagate a
        // compile error, so compile eagerly once and cache the Arc.
        if let Some(re) = compiled.get() {
            return Ok(Arc::new(re.clone()));
        }

        let mut pattern = String::from("^");
        for token in tokenize(&self.name) {
            match token {
                Token::Literal(lit) => pattern.push_str(&regex::escape(lit)),
                Token::Group(name) => {
                    let group_pattern = groups.get(name).map(String::as_str).unwrap_or(".*");
                    pattern.push_str(&format!("(?P<{name}>{group_pattern})"));
                }
            }
        }
        pattern.push('$');

        let re = Regex::new(&pattern)
            .map_err(|e| Error::Schema(format!("failed to compile schema '{}': {e}", self.name)))?;
        let _ = compiled.set(re.clone());
        Ok(Arc::new(re))
    }

    /// Matches a concrete species' name against this schema's reactified
    /// regex, returning the captured groups on success.
    pub fn matches(&self, candidate: &Species) -> Result<Option<BTreeMap<String, String>>, Error> {
        let re = self.reactify()?;
        Ok(re.captures(&candidate.name).map(|caps| {
            re.capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                .collect()
        }))
    }

    /// Binds this schema species' placeholders, in template order, to the
    /// given [`Binding`]s. Trailing placeholders with no corresponding
    /// binding are treated as [`Binding::Omit`].
    ///
    /// # Errors
    /// Returns [`Error::Schema`] if called on a concrete species or if more
    /// bindings are given than there are placeholders.
    pub fn call(&self, args: &[Binding]) -> Result<Species, Error> {
        let groups = match &self.kind {
            SpeciesKind::Concrete => {
                return Err(Error::Schema(format!(
                    "non-schema species '{}' cannot be called",
                    self.name
                )))
            }
            SpeciesKind::Schema { groups, .. } => groups,
        };

        let keys = template_keys(&self.name);
        if args.len() > keys.len() {
            return Err(Error::Schema(format!(
                "too many arguments passed to schema '{}': expected at most {}, got {}",
                self.name,
                keys.len(),
                args.len()
            )));
        }

        let mut new_groups = groups.clone();
        let mut format_dict: BTreeMap<String, String> = BTreeMap::new();
        for (key, binding) in keys.iter().zip(args.iter().chain(std::iter::repeat(&Binding::Omit))) {
            match binding {
                Binding::Omit => {
                    format_dict.insert(key.clone(), String::new());
                    new_groups.remove(key);
                }
                Binding::Literal(s) => {
                    format_dict.insert(key.clone(), s.clone());
                    new_groups.remove(key);
                }
                Binding::Rename(new_name) => {
                    format_dict.insert(key.clone(), format!("{{{new_name}}}"));
                    if let Some(pattern) = new_groups.remove(key) {
                        new_groups.insert(new_name.clone(), pattern);
                    }
                }
            }
        }

        let new_template = substitute(&self.name, &format_dict);
        Species::schema(new_template, new_groups)
    }
}

impl PartialEq for Species {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (SpeciesKind::Concrete, SpeciesKind::Concrete) => self.name == other.name,
            (
                SpeciesKind::Schema { groups: g1, .. },
                SpeciesKind::Schema { groups: g2, .. },
            ) => self.name == other.name && g1 == g2,
            _ => false,
        }
    }
}

impl Eq for Species {}

impl Hash for Species {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.kind {
            SpeciesKind::Concrete => {
                0u8.hash(state);
                self.name.hash(state);
            }
            SpeciesKind::Schema { groups, .. } => {
                1u8.hash(state);
                self.name.hash(state);
                for (k, v) in groups {
                    k.hash(state);
                    v.hash(state);
                }
            }
        }
    }
}

impl PartialOrd for Species {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Species {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (&self.kind, &other.kind) {
            (SpeciesKind::Concrete, SpeciesKind::Concrete) => self.name.cmp(&other.name),
            (SpeciesKind::Concrete, SpeciesKind::Schema { .. }) => Ordering::Less,
            (SpeciesKind::Schema { .. }, SpeciesKind::Concrete) => Ordering::Greater,
            (
                SpeciesKind::Schema { groups: g1, .. },
                SpeciesKind::Schema { groups: g2, .. },
            ) => self.name.cmp(&other.name).then_with(|| {
                if g1 == g2 {
                    Ordering::Equal
                } else {
                    canonical_groups(g1).cmp(&canonical_groups(g2))
                }
            }),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn canonical_groups(groups: &BTreeMap<String, String>) -> String {
    groups
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// A value bound to a schema placeholder via [`Species::call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Substitutes a concrete literal fragment (e.g. from an integer).
    Literal(String),
    /// Renames the placeholder, preserving its regex.
    Rename(String),
    /// Drops the placeholder (empty substitution).
    Omit,
}

impl Binding {
    /// A literal binding from any `Display`-able value.
    pub fn literal(value: impl fmt::Display) -> Binding {
        Binding::Literal(value.to_string())
    }

    /// A rename binding.
    pub fn rename(name: impl Into<String>) -> Binding {
        Binding::Rename(name.into())
    }
}

#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    Literal(&'a str),
    Group(&'a str),
}

fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = template.as_bytes();
    let mut i = 0;
    let mut lit_start = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if lit_start < i {
                tokens.push(Token::Literal(&template[lit_start..i]));
            }
            if let Some(end) = template[i..].find('}') {
                let name = &template[i + 1..i + end];
                tokens.push(Token::Group(name));
                i += end + 1;
                lit_start = i;
                continue;
            }
        }
        i += 1;
    }
    if lit_start < template.len() {
        tokens.push(Token::Literal(&template[lit_start..]));
    }
    tokens
}

/// Unique placeholder names in the order they first appear in `template`.
fn template_keys(template: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut keys = Vec::new();
    for token in tokenize(template) {
        if let Token::Group(name) = token {
            if seen.insert(name.to_string()) {
                keys.push(name.to_string());
            }
        }
    }
    keys
}

/// Rewrites every `{key}` placeholder in `template` per `format_dict`,
/// leaving unmentioned placeholders untouched.
fn substitute(template: &str, format_dict: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for token in tokenize(template) {
        match token {
            Token::Literal(lit) => out.push_str(lit),
            Token::Group(name) => match format_dict.get(name) {
                Some(replacement) => out.push_str(replacement),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            },
        }
    }
    out
}

/// Substitutes every `{key}` placeholder in `template` with
/// `groups[key]`, for instantiating a schema product's concrete name from
/// captured groups. Used by [`crate::schema`].
///
/// # Errors
/// Returns [`Error::Schema`] if any placeholder has no corresponding entry
/// in `groups` (an incompletely-captured product template).
pub(crate) fn format_template(
    template: &str,
    groups: &BTreeMap<String, String>,
) -> Result<String, Error> {
    let mut out = String::new();
    for token in tokenize(template) {
        match token {
            Token::Literal(lit) => out.push_str(lit),
            Token::Group(name) => match groups.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(Error::Schema(format!(
                        "product template '{template}' has an uncaptured group '{name}'"
                    )))
                }
            },
        }
    }
    Ok(out)
}

/// Constructs one or more concrete species from a whitespace-separated
/// string of names, per §6's species factory. Always returns a `Vec`
/// (Rust has no ergonomic single-value/iterable union), even for a single
/// name.
///
/// # Errors
/// Returns [`Error::Input`] if `"nothing"` appears among the names (use
/// [`Species::nothing`] directly) or any name is `"time"`.
pub fn species(names: &str) -> Result<Vec<Species>, Error> {
    let names: Vec<&str> = names.split_whitespace().collect();
    if names.iter().any(|&n| n == NOTHING) {
        return Err(Error::Input(
            "'nothing' is reserved and cannot be created via the species() factory; \
             construct it directly with Species::nothing()"
                .into(),
        ));
    }
    names.into_iter().map(Species::new).collect()
}

/// Constructs one or more schema species from a whitespace-separated string
/// of templates, all sharing the same group-regex mapping, per §6's schema
/// factory.
pub fn schemas(
    templates: &str,
    groups: impl IntoIterator<Item = (String, String)>,
) -> Result<Vec<Species>, Error> {
    let groups: BTreeMap<String, String> = groups.into_iter().collect();
    templates
        .split_whitespace()
        .map(|t| Species::schema(t, groups.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_equality_and_order() {
        let a = Species::new("A").unwrap();
        let a2 = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        assert_eq!(a, a2);
        assert!(a < b);
    }

    #[test]
    fn time_is_reserved_everywhere() {
        assert!(Species::new("time").is_err());
        assert!(Species::schema("time", []).is_err());
    }

    #[test]
    fn nothing_factory_rejects_but_direct_construction_allows() {
        assert!(species("A nothing").is_err());
        assert!(Species::nothing().is_nothing());
    }

    #[test]
    fn concrete_sorts_before_schema() {
        let c = Species::new("Z").unwrap();
        let s = Species::schema("{x}", []).unwrap();
        assert!(c < s);
    }

    #[test]
    fn schema_reactify_and_match() {
        let s = Species::schema(
            "Stack1<{rest}{top}>",
            [("top".to_string(), "[01]".to_string())],
        )
        .unwrap();
        let concrete = Species::new("Stack1<1011>").unwrap();
        let groups = s.matches(&concrete).unwrap().unwrap();
        assert_eq!(groups.get("top").unwrap(), "1");
        assert_eq!(groups.get("rest").unwrap(), "101");
    }

    #[test]
    fn schema_call_literal_rename_omit() {
        let s = Species::schema(
            "S{a}{b}",
            [
                ("a".to_string(), "[0-9]".to_string()),
                ("b".to_string(), "[a-z]".to_string()),
            ],
        )
        .unwrap();

        let literal = s.call(&[Binding::literal(5)]).unwrap();
        assert_eq!(literal.name(), "S5{b}");
        assert!(literal.has_free_groups());

        let renamed = s.call(&[Binding::rename("n"), Binding::Omit]).unwrap();
        assert_eq!(renamed.name(), "S{n}");
        assert!(renamed.has_free_groups());

        let dropped = s.call(&[Binding::Omit, Binding::Omit]).unwrap();
        assert_eq!(dropped.name(), "S");
        assert!(!dropped.has_free_groups());
    }

    #[test]
    fn schema_tie_break_is_deterministic() {
        let s1 = Species::schema("X{a}", [("a".to_string(), "[0-9]".to_string())]).unwrap();
        let s2 = Species::schema("X{a}", [("a".to_string(), "[a-z]".to_string())]).unwrap();
        assert_ne!(s1, s2);
        // ordering must agree with itself regardless of argument order
        assert_eq!(s1.cmp(&s2), s1.cmp(&s2));
        assert_ne!(s1.cmp(&s2), std::cmp::Ordering::Equal);
    }
}
