//! Planning of secrets that are generated at provisioning time.
//!
//! A secret-like variable whose value is empty or `auto` is not baked into
//! the document. Instead it carries a placeholder token, and the guest script
//! replaces that token with a freshly generated value after the document has
//! been written.

use std::collections::BTreeMap;

use stackport_common::constants::{
    AUTO_SECRET_VALUE, SECRET_KEYWORDS, SECRET_PLACEHOLDER_PREFIX, SECRET_PLACEHOLDER_SUFFIX,
};

/// One variable whose value is generated in the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSlot {
    /// Environment variable name.
    pub name: String,
    /// Token standing in for the value inside the serialized document.
    pub placeholder: String,
}

/// Ordered set of variables to generate, one slot per variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretPlan {
    slots: Vec<SecretSlot>,
}

impl SecretPlan {
    /// Plans generation for every qualifying entry of `env`.
    ///
    /// Each slot gets its own token: when the name-derived token is already
    /// taken, or overlaps another token as a substring, it is numbered
    /// (`__AUTO_GEN_2_<NAME>__`, ...) until it is distinct.
    pub fn plan(env: &BTreeMap<String, String>) -> Self {
        let mut slots: Vec<SecretSlot> = Vec::new();
        for name in env
            .iter()
            .filter(|(name, value)| is_secret_name(name) && wants_generation(value))
            .map(|(name, _)| name)
        {
            let placeholder = unique_placeholder(name, &slots);
            slots.push(SecretSlot {
                name: name.clone(),
                placeholder,
            });
        }
        if !slots.is_empty() {
            tracing::info!(count = slots.len(), "planned generated secrets");
        }
        Self { slots }
    }

    /// Planned slots in variable-name order.
    pub fn slots(&self) -> &[SecretSlot] {
        &self.slots
    }

    /// Whether nothing needs generating.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keeps only the slots whose placeholder occurs in `text`.
    ///
    /// A document that passed through sanitization unchanged carries no
    /// placeholders, so nothing should be generated for it.
    #[must_use]
    pub fn present_in(&self, text: &str) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .filter(|slot| text.contains(&slot.placeholder))
                .cloned()
                .collect(),
        }
    }

    /// Returns a copy of `env` with each planned variable set to its placeholder.
    pub fn apply(&self, env: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut resolved = env.clone();
        for slot in &self.slots {
            let _ = resolved.insert(slot.name.clone(), slot.placeholder.clone());
        }
        resolved
    }
}

/// Whether `name` contains a secret keyword, case-insensitively.
pub fn is_secret_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SECRET_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}

fn wants_generation(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(AUTO_SECRET_VALUE)
}

/// Placeholder token for variable `name`, e.g. `__AUTO_GEN_DB_PASSWORD__`.
///
/// The name keeps its case. Characters outside `[A-Za-z0-9_]` become `_` so
/// the token is safe inside YAML plain scalars and `sed` expressions.
pub fn placeholder_for(name: &str) -> String {
    framed(&token_body(name))
}

fn token_body(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn framed(body: &str) -> String {
    format!("{SECRET_PLACEHOLDER_PREFIX}{body}{SECRET_PLACEHOLDER_SUFFIX}")
}

fn unique_placeholder(name: &str, taken: &[SecretSlot]) -> String {
    let body = token_body(name);
    let overlaps = |candidate: &str| {
        taken.iter().any(|slot| {
            slot.placeholder.contains(candidate) || candidate.contains(&slot.placeholder)
        })
    };
    let base = framed(&body);
    if !overlaps(&base) {
        return base;
    }
    (2..=taken.len() + 2)
        .map(|n| framed(&format!("{n}_{body}")))
        .find(|candidate| !overlaps(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn plan_selects_empty_and_auto_secrets_only() {
        let plan = SecretPlan::plan(&env(&[
            ("DB_PASSWORD", ""),
            ("API_KEY", "auto"),
            ("READY_FLAG", "true"),
        ]));
        let names: Vec<&str> = plan.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["API_KEY", "DB_PASSWORD"]);
    }

    #[test]
    fn plan_keeps_secrets_with_real_values() {
        let plan = SecretPlan::plan(&env(&[("ADMIN_TOKEN", "hunter2")]));
        assert!(plan.is_empty());
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(is_secret_name("oauth_client"));
        assert!(is_secret_name("Jwt_Secret"));
        assert!(!is_secret_name("PUID"));
    }

    #[test]
    fn auto_marker_is_case_insensitive() {
        let plan = SecretPlan::plan(&env(&[("SESSION_SECRET", " AUTO ")]));
        assert_eq!(plan.slots().len(), 1);
    }

    #[test]
    fn placeholder_is_derived_from_name() {
        assert_eq!(placeholder_for("DB_PASSWORD"), "__AUTO_GEN_DB_PASSWORD__");
        assert_eq!(
            placeholder_for("GITEA__security__SECRET.KEY"),
            "__AUTO_GEN_GITEA__security__SECRET_KEY__"
        );
    }

    #[test]
    fn plan_gives_case_variants_distinct_tokens() {
        let plan = SecretPlan::plan(&env(&[("DB_PASSWORD", ""), ("db_password", "")]));
        let tokens: Vec<&str> = plan.slots().iter().map(|s| s.placeholder.as_str()).collect();
        assert_eq!(
            tokens,
            vec!["__AUTO_GEN_DB_PASSWORD__", "__AUTO_GEN_db_password__"]
        );
    }

    #[test]
    fn plan_numbers_tokens_that_collide_after_sanitizing() {
        let plan = SecretPlan::plan(&env(&[("API.KEY", ""), ("API_KEY", "auto")]));
        let slots = plan.slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].placeholder, "__AUTO_GEN_API_KEY__");
        assert_eq!(slots[1].placeholder, "__AUTO_GEN_2_API_KEY__");
    }

    #[test]
    fn plan_tokens_never_contain_one_another() {
        let plan = SecretPlan::plan(&env(&[("A_TOKEN", ""), ("A_TOKEN__B", "")]));
        let slots = plan.slots();
        assert_eq!(slots.len(), 2);
        for (i, a) in slots.iter().enumerate() {
            for b in slots.iter().skip(i + 1) {
                assert!(!a.placeholder.contains(&b.placeholder));
                assert!(!b.placeholder.contains(&a.placeholder));
            }
        }
    }

    #[test]
    fn apply_keeps_each_variable_on_its_own_token() {
        let vars = env(&[("DB_PASSWORD", ""), ("db_password", "")]);
        let plan = SecretPlan::plan(&vars);
        let resolved = plan.apply(&vars);
        assert_ne!(resolved.get("DB_PASSWORD"), resolved.get("db_password"));
    }

    #[test]
    fn present_in_drops_slots_missing_from_text() {
        let plan = SecretPlan::plan(&env(&[("DB_PASSWORD", ""), ("API_KEY", "")]));
        let kept = plan.present_in("DB_PASSWORD: __AUTO_GEN_DB_PASSWORD__\n");
        assert_eq!(kept.slots().len(), 1);
        assert_eq!(kept.slots()[0].name, "DB_PASSWORD");
    }

    #[test]
    fn apply_substitutes_placeholders_and_keeps_others() {
        let vars = env(&[("DB_PASSWORD", ""), ("TZ", "UTC")]);
        let plan = SecretPlan::plan(&vars);
        let resolved = plan.apply(&vars);
        assert_eq!(
            resolved.get("DB_PASSWORD").map(String::as_str),
            Some("__AUTO_GEN_DB_PASSWORD__")
        );
        assert_eq!(resolved.get("TZ").map(String::as_str), Some("UTC"));
    }
}
