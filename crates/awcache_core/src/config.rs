//! Merge and output configuration.

use crate::error::{CoreError, CoreResult};
use awcache_codec::{section_schema, MergeRule};
use std::fmt;
use std::str::FromStr;

/// A user-supplied merge rule for one field of a section.
///
/// Written as `section.field=rule`, e.g. `visitor.last_visit_page=latest`.
/// Applies to every row of the section that has the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOverride {
    /// Lowercase section name.
    pub section: String,
    /// Field name.
    pub field: String,
    /// Rule to use instead of the schema's.
    pub rule: MergeRule,
}

impl FromStr for RuleOverride {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CoreError::configuration(format!(
                "rule override '{s}' is not of the form section.field=rule"
            ))
        };
        let (target, rule) = s.split_once('=').ok_or_else(invalid)?;
        let (section, field) = target.split_once('.').ok_or_else(invalid)?;
        if section.is_empty() || field.is_empty() {
            return Err(invalid());
        }
        let rule = rule
            .parse::<MergeRule>()
            .map_err(|e| CoreError::configuration(e.to_string()))?;

        Ok(Self {
            section: section.to_ascii_lowercase(),
            field: field.to_string(),
            rule,
        })
    }
}

impl fmt::Display for RuleOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.section, self.field, self.rule)
    }
}

/// Configuration for merging and emitting cache files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether merged sections are re-sorted per their sort metadata.
    pub sort_merged: bool,

    /// Field rules that replace the schema table's.
    pub rule_overrides: Vec<RuleOverride>,

    /// Tool tag written at the start of emitted header lines.
    pub tool_name: String,

    /// Width `POS_` offsets are padded to in emitted offset maps.
    pub offset_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sort_merged: true,
            rule_overrides: Vec::new(),
            tool_name: "AWSTATS".to_string(),
            offset_width: 20,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether merged sections are re-sorted.
    #[must_use]
    pub fn sort_merged(mut self, value: bool) -> Self {
        self.sort_merged = value;
        self
    }

    /// Adds a rule override.
    #[must_use]
    pub fn rule_override(mut self, rule: RuleOverride) -> Self {
        self.rule_overrides.push(rule);
        self
    }

    /// Sets the header tool tag.
    #[must_use]
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    /// Sets the `POS_` offset padding width.
    #[must_use]
    pub fn offset_width(mut self, width: usize) -> Self {
        self.offset_width = width;
        self
    }

    /// Returns the overriding rule for a field, if one was configured.
    ///
    /// The last matching override wins.
    #[must_use]
    pub fn override_for(&self, section: &str, field: &str) -> Option<&MergeRule> {
        self.rule_overrides
            .iter()
            .rev()
            .find(|o| o.section == section && o.field == field)
            .map(|o| &o.rule)
    }

    /// Checks every override against the schema table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] for an override naming an
    /// unknown section or a field the section does not have, for a
    /// `replace:` literal that field cannot hold, or for an empty tool tag.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tool_name.trim().is_empty() || self.tool_name.contains(char::is_whitespace) {
            return Err(CoreError::configuration(format!(
                "tool name '{}' must be a single non-empty word",
                self.tool_name
            )));
        }
        for o in &self.rule_overrides {
            let schema = section_schema(&o.section).ok_or_else(|| {
                CoreError::configuration(format!("override '{o}': unknown section"))
            })?;
            if !schema.has_field(&o.field) {
                return Err(CoreError::configuration(format!(
                    "override '{o}': section has no field '{}'",
                    o.field
                )));
            }
            if let MergeRule::Replace(literal) = &o.rule {
                let shapes = std::iter::once(schema.default_row)
                    .chain(schema.rows.iter().map(|r| r.fields));
                for fields in shapes {
                    let Some(pos) = fields.iter().position(|f| f.name == o.field) else {
                        continue;
                    };
                    let spec = &fields[pos];
                    // An empty token only reads back as a missing last field.
                    let fits = if literal.is_empty() {
                        spec.optional && pos + 1 == fields.len()
                    } else {
                        spec.decoder.decode(literal).is_ok()
                    };
                    if !fits {
                        return Err(CoreError::configuration(format!(
                            "override '{o}': literal does not fit field '{}'",
                            o.field
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.sort_merged);
        assert!(config.rule_overrides.is_empty());
        assert_eq!(config.tool_name, "AWSTATS");
        assert_eq!(config.offset_width, 20);
        config.validate().unwrap();
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .sort_merged(false)
            .tool_name("AWSTATS2")
            .offset_width(8)
            .rule_override("visitor.last_visit_page=latest".parse().unwrap());

        assert!(!config.sort_merged);
        assert_eq!(config.offset_width, 8);
        assert_eq!(
            config.override_for("visitor", "last_visit_page"),
            Some(&MergeRule::Latest)
        );
        assert_eq!(config.override_for("visitor", "pages"), None);
        config.validate().unwrap();
    }

    #[test]
    fn parse_override() {
        let o: RuleOverride = "General.signature=repl:x".parse().unwrap();
        assert_eq!(o.section, "general");
        assert_eq!(o.field, "signature");
        assert_eq!(o.to_string(), "general.signature=replace:x");
    }

    #[test]
    fn malformed_overrides() {
        for text in ["visitor", "visitor.pages", "=sum", ".pages=sum", "visitor.pages=avg"] {
            let err = text.parse::<RuleOverride>().unwrap_err();
            assert!(matches!(err, CoreError::Configuration { .. }), "{text}");
        }
    }

    #[test]
    fn validate_rejects_unknown_targets() {
        let config = Config::new().rule_override("nosuch.pages=sum".parse().unwrap());
        assert!(config.validate().is_err());

        let config = Config::new().rule_override("os.pages=sum".parse().unwrap());
        assert!(config.validate().is_err());

        let config = Config::new().tool_name("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_checks_replace_literals() {
        let ok = Config::new()
            .rule_override("general.signature=replace:".parse().unwrap())
            .rule_override("os.value=replace:0".parse().unwrap())
            .rule_override("visitor.last_visit_page=replace:/".parse().unwrap());
        ok.validate().unwrap();

        for text in [
            "general.signature=repl:x",
            "os.value=replace:",
            "os.value=replace:lots",
            "visitor.last_visit=replace:",
        ] {
            let config = Config::new().rule_override(text.parse().unwrap());
            let err = config.validate().unwrap_err();
            assert!(matches!(err, CoreError::Configuration { .. }), "{text}");
        }
    }

    #[test]
    fn last_override_wins() {
        let config = Config::new()
            .rule_override("os.value=min".parse().unwrap())
            .rule_override("os.value=max".parse().unwrap());
        assert_eq!(config.override_for("os", "value"), Some(&MergeRule::Max));
    }
}
