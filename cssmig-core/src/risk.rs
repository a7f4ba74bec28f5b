//! Layout-impact risk classification.
//!
//! A class is HIGH risk if any of its declarations touches a layout property,
//! MEDIUM if any touches a directional/logical margin or padding longhand, and
//! LOW otherwise. Tiers are checked across the whole set, so one HIGH property
//! anywhere dominates.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Properties whose change usually reflows surrounding layout.
pub const DEFAULT_HIGH_RISK_PROPS: &[&str] = &[
    "display",
    "position",
    "float",
    "flex",
    "flex-direction",
    "flex-wrap",
    "flex-flow",
    "flex-grow",
    "flex-shrink",
    "flex-basis",
    "grid",
    "grid-template",
    "grid-template-columns",
    "grid-template-rows",
    "grid-column",
    "grid-row",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "overflow",
    "overflow-x",
    "overflow-y",
    "margin",
    "padding",
];

/// Directional and logical spacing longhands.
pub const DEFAULT_MEDIUM_RISK_PROPS: &[&str] = &[
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin-inline",
    "margin-block",
    "padding-inline",
    "padding-block",
];

/// Severity tier of a class's styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier over immutable property tables.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    high: BTreeSet<String>,
    medium: BTreeSet<String>,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_HIGH_RISK_PROPS.iter().copied(),
            DEFAULT_MEDIUM_RISK_PROPS.iter().copied(),
        )
    }
}

impl RiskClassifier {
    pub fn new<H, M, S>(high: H, medium: M) -> Self
    where
        H: IntoIterator<Item = S>,
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            high: high.into_iter().map(Into::into).collect(),
            medium: medium.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify a merged declaration set.
    ///
    /// Declarations are visited in sorted order; the result does not depend on
    /// insertion order.
    pub fn classify<I, S>(&self, declarations: I) -> RiskLevel
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut props: Vec<String> = declarations
            .into_iter()
            .map(|decl| property_of(decl.as_ref()))
            .collect();
        props.sort();

        if props.iter().any(|p| self.is_high(p)) {
            return RiskLevel::High;
        }
        if props.iter().any(|p| self.is_medium(p)) {
            return RiskLevel::Medium;
        }
        RiskLevel::Low
    }

    pub fn high_props(&self) -> impl Iterator<Item = &str> {
        self.high.iter().map(String::as_str)
    }

    pub fn medium_props(&self) -> impl Iterator<Item = &str> {
        self.medium.iter().map(String::as_str)
    }

    fn is_medium(&self, prop: &str) -> bool {
        matches_tier(prop, &self.medium)
    }

    // A MEDIUM longhand such as `margin-top` is also a dash variant of the
    // HIGH shorthand `margin`; the more specific tier wins.
    fn is_high(&self, prop: &str) -> bool {
        !self.is_medium(prop) && matches_tier(prop, &self.high)
    }
}

/// Property name of a `"property: value"` string.
fn property_of(declaration: &str) -> String {
    declaration
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Exact member, or `member-…` dash variant.
fn matches_tier(prop: &str, tier: &BTreeSet<String>) -> bool {
    if tier.contains(prop) {
        return true;
    }
    tier.iter().any(|member| {
        prop.strip_prefix(member.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(decls: &[&str]) -> RiskLevel {
        RiskClassifier::default().classify(decls.iter().copied())
    }

    #[test]
    fn test_color_only_is_low() {
        assert_eq!(classify(&["color: red"]), RiskLevel::Low);
    }

    #[test]
    fn test_directional_margin_is_medium() {
        assert_eq!(classify(&["margin-top: 4px"]), RiskLevel::Medium);
        assert_eq!(classify(&["padding-inline-start: 2px"]), RiskLevel::Medium);
    }

    #[test]
    fn test_layout_property_is_high_in_any_order() {
        assert_eq!(classify(&["display: flex", "color: red"]), RiskLevel::High);
        assert_eq!(classify(&["color: red", "display: flex"]), RiskLevel::High);
    }

    #[test]
    fn test_high_dominates_medium() {
        assert_eq!(classify(&["margin-top: 4px", "width: 10px"]), RiskLevel::High);
    }

    #[test]
    fn test_dash_variant_of_high() {
        assert_eq!(classify(&["flex-grow: 1"]), RiskLevel::High);
        assert_eq!(classify(&["grid-auto-flow: row"]), RiskLevel::High);
    }

    #[test]
    fn test_prefix_without_dash_is_not_a_variant() {
        // `gridline` is not `grid-…`
        assert_eq!(classify(&["gridline: none"]), RiskLevel::Low);
    }

    #[test]
    fn test_empty_set_is_low() {
        assert_eq!(classify(&[]), RiskLevel::Low);
    }

    #[test]
    fn test_custom_tables() {
        let classifier = RiskClassifier::new(["color"], ["opacity"]);
        assert_eq!(classifier.classify(["color: red"]), RiskLevel::High);
        assert_eq!(classifier.classify(["opacity: 0.5"]), RiskLevel::Medium);
        assert_eq!(classifier.classify(["display: flex"]), RiskLevel::Low);
    }

    #[test]
    fn test_serializes_uppercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
    }
}
