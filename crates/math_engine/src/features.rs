//! LaTeX feature collection
//!
//! `validate` walks the tree and records the packages a LaTeX document needs
//! for it. The HTML exporter uses the same walk to collect the CSS classes
//! its output refers to.

use std::collections::BTreeSet;

/// Requirements collected from a math tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatexFeatures {
    packages: BTreeSet<String>,
    css_classes: BTreeSet<&'static str>,
    html: bool,
}

impl LatexFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector for HTML output, which also records CSS classes
    pub fn for_html() -> Self {
        Self {
            html: true,
            ..Self::default()
        }
    }

    pub fn is_html(&self) -> bool {
        self.html
    }

    /// Record that `package` is needed
    pub fn require(&mut self, package: &str) {
        if !self.packages.contains(package) {
            tracing::trace!(package, "feature required");
            self.packages.insert(package.to_string());
        }
    }

    pub fn is_required(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }

    /// Record a CSS class used by the HTML output
    pub fn add_css(&mut self, class: &'static str) {
        if self.html {
            self.css_classes.insert(class);
        }
    }

    pub fn css_classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.css_classes.iter().copied()
    }

    /// `\usepackage` lines for the collected packages
    pub fn preamble(&self) -> String {
        self.packages
            .iter()
            .map(|p| format!("\\usepackage{{{}}}\n", p))
            .collect()
    }

    pub fn merge(&mut self, other: &LatexFeatures) {
        self.packages.extend(other.packages.iter().cloned());
        self.css_classes.extend(other.css_classes.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_and_preamble() {
        let mut f = LatexFeatures::new();
        f.require("amsmath");
        f.require("amsmath");
        f.require("bm");
        assert!(f.is_required("bm"));
        assert!(!f.is_required("cancel"));
        assert_eq!(f.preamble(), "\\usepackage{amsmath}\n\\usepackage{bm}\n");
    }

    #[test]
    fn test_css_only_in_html_mode() {
        let mut latex = LatexFeatures::new();
        latex.add_css("frac");
        assert_eq!(latex.css_classes().count(), 0);

        let mut html = LatexFeatures::for_html();
        html.add_css("frac");
        html.add_css("frac");
        assert_eq!(html.css_classes().collect::<Vec<_>>(), vec!["frac"]);
        assert!(html.is_html());
    }
}
