//! Output styles and the style catalog.
//!
//! A catalog is an ordered, immutable table of named styles, each mapping to
//! one rewrite instruction. The built-in catalog is embedded from
//! `catalog.yaml`; deployments can load their own and inject it into the
//! [`Reformatter`](crate::stages::reformat::Reformatter). Nothing here is
//! process-global, so concurrent runs can use different catalogs.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utilities::errors::{OpAmpError, Result};

/// Embedded built-in catalog.
const EMBEDDED_CATALOG_YAML: &str = include_str!("catalog.yaml");

/// Menu label of the custom-style marker, listed after the named styles.
pub const CUSTOM_MENU_LABEL: &str = "Other (Custom)";

// ---------------------------------------------------------------------------
// OutputStyle
// ---------------------------------------------------------------------------

/// A requested output style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum OutputStyle {
    /// A style looked up by name in the catalog.
    Named(String),
    /// A free-form label; instructions are generated on demand.
    Custom(String),
}

impl OutputStyle {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn custom(label: impl Into<String>) -> Self {
        Self::Custom(label.into())
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Named(label) | Self::Custom(label) => label,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Parse the command-line form: `custom:<label>` for custom styles,
    /// anything else is a catalog name.
    pub fn parse(value: &str) -> Self {
        match value.split_once(':') {
            Some((prefix, label)) if prefix.trim().eq_ignore_ascii_case("custom") => {
                Self::Custom(label.trim().to_string())
            }
            _ => Self::Named(value.trim().to_string()),
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// StyleCatalog
// ---------------------------------------------------------------------------

/// One named style and its rewrite instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleEntry {
    pub name: String,
    pub instruction: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    styles: Vec<StyleEntry>,
}

/// A numbered menu line: the named styles in order, then the custom marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub number: usize,
    pub label: String,
    pub is_custom: bool,
}

/// Ordered, immutable table of named output styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCatalog {
    entries: Vec<StyleEntry>,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleCatalog {
    /// The built-in ten-style catalog.
    pub fn builtin() -> Self {
        Self::from_yaml_str(EMBEDDED_CATALOG_YAML).expect("embedded style catalog is valid")
    }

    /// Build a catalog from entries.
    ///
    /// Names must be non-empty and unique (ignoring ASCII case) and every
    /// instruction must be non-empty.
    pub fn new(entries: Vec<StyleEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(OpAmpError::Catalog("catalog has no styles".to_string()));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(OpAmpError::Catalog(format!("style #{} has an empty name", i + 1)));
            }
            if entry.instruction.trim().is_empty() {
                return Err(OpAmpError::Catalog(format!(
                    "style '{}' has an empty instruction",
                    entry.name
                )));
            }
            if entry.name.trim().eq_ignore_ascii_case(CUSTOM_MENU_LABEL) {
                return Err(OpAmpError::Catalog(format!(
                    "'{}' is reserved for custom styles",
                    CUSTOM_MENU_LABEL
                )));
            }
            if entries[..i]
                .iter()
                .any(|prev| prev.name.trim().eq_ignore_ascii_case(entry.name.trim()))
            {
                return Err(OpAmpError::Catalog(format!("duplicate style '{}'", entry.name)));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a catalog from YAML (`styles: [{name, instruction}, ...]`).
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| OpAmpError::Catalog(format!("invalid YAML: {}", e)))?;
        Self::new(file.styles)
    }

    /// Load a catalog from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OpAmpError::Catalog(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a named style, ignoring ASCII case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<&StyleEntry> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// The rewrite instruction for a named style.
    pub fn instruction(&self, name: &str) -> Option<&str> {
        self.get(name).map(|entry| entry.instruction.as_str())
    }

    /// Check that `style` can be resolved without issuing any call.
    pub fn validate(&self, style: &OutputStyle) -> Result<()> {
        match style {
            OutputStyle::Named(name) => self.get(name).map(|_| ()).ok_or_else(|| {
                OpAmpError::UnknownStyle { name: name.clone() }
            }),
            OutputStyle::Custom(label) if label.trim().is_empty() => Err(OpAmpError::EmptyInput {
                field: "custom style label",
            }),
            OutputStyle::Custom(_) => Ok(()),
        }
    }

    /// The numbered selection menu, custom marker last.
    pub fn menu(&self) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| MenuItem {
                number: i + 1,
                label: entry.name.clone(),
                is_custom: false,
            })
            .collect();
        items.push(MenuItem {
            number: self.entries.len() + 1,
            label: CUSTOM_MENU_LABEL.to_string(),
            is_custom: true,
        });
        items
    }

    /// Turn a menu number into a style. The custom marker needs `custom_label`.
    pub fn select(&self, number: usize, custom_label: Option<&str>) -> Result<OutputStyle> {
        if number >= 1 && number <= self.entries.len() {
            return Ok(OutputStyle::Named(self.entries[number - 1].name.clone()));
        }
        if number == self.entries.len() + 1 {
            let label = custom_label.map(str::trim).unwrap_or_default();
            if label.is_empty() {
                return Err(OpAmpError::EmptyInput {
                    field: "custom style label",
                });
            }
            return Ok(OutputStyle::Custom(label.to_string()));
        }
        Err(OpAmpError::UnknownStyle {
            name: format!("#{}", number),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_ten_styles_in_order() {
        let catalog = StyleCatalog::builtin();
        let names: Vec<_> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Factual Summary",
                "Advertising Copy",
                "Legal Statement",
                "Inspirational Message",
                "Press Release",
                "Technical Report",
                "Social Media Post",
                "Policy Recommendation",
                "Email Draft",
                "Editorial Opinion",
            ]
        );
    }

    #[test]
    fn test_builtin_instructions_are_single_paragraphs() {
        let catalog = StyleCatalog::builtin();
        let summary = catalog.instruction("Factual Summary").unwrap();
        assert!(summary.starts_with("Rewrite the synthesis as a concise, objective summary."));
        assert!(summary.ends_with("logical distinctions."));
        assert!(!summary.contains('\n'));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let catalog = StyleCatalog::builtin();
        assert!(catalog.get("press release").is_some());
        assert!(catalog.get("  EMAIL DRAFT ").is_some());
        assert!(catalog.get("Limerick").is_none());
    }

    #[test]
    fn test_validate_style() {
        let catalog = StyleCatalog::builtin();
        assert!(catalog.validate(&OutputStyle::named("Technical Report")).is_ok());
        assert!(catalog.validate(&OutputStyle::custom("Haiku")).is_ok());
        assert!(matches!(
            catalog.validate(&OutputStyle::named("Haiku")),
            Err(OpAmpError::UnknownStyle { .. })
        ));
        assert!(matches!(
            catalog.validate(&OutputStyle::custom("  ")),
            Err(OpAmpError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_menu_and_select() {
        let catalog = StyleCatalog::builtin();
        let menu = catalog.menu();
        assert_eq!(menu.len(), 11);
        assert_eq!(menu[0].label, "Factual Summary");
        assert_eq!(menu[10].label, CUSTOM_MENU_LABEL);
        assert!(menu[10].is_custom);

        assert_eq!(
            catalog.select(6, None).unwrap(),
            OutputStyle::named("Technical Report")
        );
        assert_eq!(
            catalog.select(11, Some(" Limerick ")).unwrap(),
            OutputStyle::custom("Limerick")
        );
        assert!(catalog.select(11, None).is_err());
        assert!(catalog.select(0, None).is_err());
        assert!(catalog.select(12, None).is_err());
    }

    #[test]
    fn test_custom_catalog_validation() {
        let catalog = StyleCatalog::from_yaml_str(
            "styles:\n  - name: Haiku\n    instruction: Write three lines.\n",
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.menu().len(), 2);

        assert!(StyleCatalog::from_yaml_str("styles: []\n").is_err());
        assert!(StyleCatalog::from_yaml_str(
            "styles:\n  - name: A\n    instruction: x\n  - name: a\n    instruction: y\n"
        )
        .is_err());
        assert!(StyleCatalog::from_yaml_str("styles:\n  - name: A\n    instruction: ''\n").is_err());
        assert!(StyleCatalog::from_yaml_str(
            "styles:\n  - name: Other (Custom)\n    instruction: x\n"
        )
        .is_err());
    }

    #[test]
    fn test_output_style_parse() {
        assert_eq!(OutputStyle::parse("Press Release"), OutputStyle::named("Press Release"));
        assert_eq!(OutputStyle::parse("custom: Sea shanty"), OutputStyle::custom("Sea shanty"));
        assert_eq!(OutputStyle::parse("Custom:Haiku"), OutputStyle::custom("Haiku"));
    }

    #[test]
    fn test_output_style_serde() {
        let json = serde_json::to_value(OutputStyle::custom("Haiku")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "custom", "label": "Haiku"}));
        let parsed: OutputStyle =
            serde_json::from_value(serde_json::json!({"kind": "named", "label": "Email Draft"}))
                .unwrap();
        assert_eq!(parsed, OutputStyle::named("Email Draft"));
    }
}
