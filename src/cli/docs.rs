//! Documentation content for the transmute CLI

use super::CliError;
use crate::filters::{Filter, FilterGroup};

const OVERVIEW: &str = r#"TRANSMUTE

Transmute reshapes JSON with a template: a JSON document whose keys and
string values are expressions evaluated against the input.

EXPRESSIONS

  name.name         Dotted lookup in the current scope
  ^name.name        Dotted lookup in the root scope
  'text'            Literal text
  [expr]rest        Evaluate rest with expr as its scope
  {{ expr }}        Expression embedded in surrounding text
  expr | f(a, b)    Filter pipeline

KEYS

  "@path": expr     Scope for this level (arrays fan out)
  "@root": expr     Root scope for this level
  "!key": {...}     Merge the nested object into this level
  "key[expr]": ...  Array with one entry per element of expr
  "key{expr}": ...  Nested template evaluated against expr

FILTER GROUPS
"#;

/// Group listing with the names of every filter in each group
pub fn filters_overview() -> String {
    let mut out = String::from(OVERVIEW);
    out.push('\n');
    for group in FilterGroup::ALL {
        let names: Vec<&str> = Filter::ALL
            .into_iter()
            .filter(|filter| filter.group() == group)
            .map(Filter::name)
            .collect();
        out.push_str(&format!("  {:<12} {}\n", group.name(), names.join(", ")));
    }
    out.push_str("\nRun 'transmute filters <group>' for details.\n");
    out
}

/// Signatures and descriptions of one group's filters
pub fn filter_group_docs(name: &str) -> Result<String, CliError> {
    let group = FilterGroup::from_name(name).ok_or_else(|| CliError::UnknownGroup(name.to_string()))?;

    let mut out = format!("{} FILTERS\n\n", group.name().to_uppercase());
    for filter in Filter::ALL.into_iter().filter(|filter| filter.group() == group) {
        let (signature, description) = filter.summary();
        out.push_str(&format!("  {signature:<44} {description}\n"));
    }
    Ok(out)
}
