mod stylesheet;
mod theme;
mod tokens;

pub use stylesheet::{Stylesheet, CONTAINER_SELECTOR, OUTPUT_SUFFIX};
pub use theme::{StyleProperty, StyleRule};
pub use tokens::{build_rules, build_rules_from, Candidate, ScopeSource, TokenClass, TOKEN_CLASSES};
