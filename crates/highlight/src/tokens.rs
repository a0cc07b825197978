use tracing::debug;

use crate::theme::StyleRule;

/// Lookup surface the rule builder reads theme values through.
pub trait ScopeSource {
    /// Raw attribute strings registered for `scope`; empty when unknown.
    fn scope(&self, scope: &str) -> &[String];

    /// Default text color of the editor.
    fn text_color(&self) -> &str;
}

/// One candidate group of a token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Attribute list registered for a theme scope.
    Scope(&'static str),
    /// Single-element group holding the editor's default text color.
    TextColor,
    /// Single-element group with a fixed attribute string.
    Literal(&'static str),
}

impl Candidate {
    fn resolve<'a, S: ScopeSource + ?Sized>(&self, source: &'a S) -> Vec<&'a str> {
        match *self {
            Candidate::Scope(scope) => source.scope(scope).iter().map(String::as_str).collect(),
            Candidate::TextColor => vec![source.text_color()],
            Candidate::Literal(value) => vec![value],
        }
    }
}

/// A highlighter token class and the candidate groups it is styled from,
/// most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClass {
    pub name: &'static str,
    pub groups: &'static [Candidate],
}

impl TokenClass {
    const fn new(name: &'static str, groups: &'static [Candidate]) -> Self {
        Self { name, groups }
    }

    pub fn build<S: ScopeSource + ?Sized>(&self, source: &S) -> StyleRule {
        StyleRule::cascade(
            self.name,
            self.groups.iter().map(|candidate| candidate.resolve(source)),
        )
    }
}

use Candidate::{Literal, Scope, TextColor};

const NUMBER: &[Candidate] = &[
    Scope("constant.numeric"),
    Scope("constant.other"),
    Scope("constant"),
    Scope("support.constant"),
];
const LANGUAGE_CONSTANT: &[Candidate] = &[
    Scope("constant.language"),
    Scope("constant.other"),
    Scope("constant"),
    Scope("support.constant"),
];
const DOUBLE_QUOTED: &[Candidate] = &[
    Scope("string.quoted.double"),
    Scope("string.quoted"),
    Scope("string"),
];
const OPERATOR: &[Candidate] = &[
    Scope("keyword.operator"),
    Scope("keyword.operator"),
    Scope("keyword"),
];

/// Pygments token classes in emission order.
///
/// `bp` appears twice; both rules are written and the later one takes
/// precedence in the browser.
pub static TOKEN_CLASSES: &[TokenClass] = &[
    // generic
    TokenClass::new("ge", &[Literal("italic")]),
    TokenClass::new("gs", &[Literal("bold")]),
    // comments
    TokenClass::new("c", &[Scope("comment")]),
    TokenClass::new("cp", &[Scope("comment")]),
    TokenClass::new("c1", &[Scope("comment")]),
    TokenClass::new("cs", &[Scope("comment")]),
    TokenClass::new("cm", &[Scope("comment.block"), Scope("comment")]),
    // constants
    TokenClass::new("m", NUMBER),
    TokenClass::new("mf", NUMBER),
    TokenClass::new("mi", NUMBER),
    TokenClass::new("mo", NUMBER),
    TokenClass::new("se", LANGUAGE_CONSTANT),
    TokenClass::new("kc", LANGUAGE_CONSTANT),
    // keywords
    TokenClass::new(
        "k",
        &[
            Scope("entity.name.type"),
            Scope("support.type"),
            Scope("keyword"),
        ],
    ),
    TokenClass::new("kd", &[Scope("storage.type"), Scope("storage")]),
    TokenClass::new(
        "kn",
        &[
            Scope("support.function.construct"),
            Scope("keyword.control"),
            Scope("keyword"),
        ],
    ),
    TokenClass::new(
        "kt",
        &[
            Scope("entity.name.type"),
            Scope("support.type"),
            Scope("support.constant"),
        ],
    ),
    // strings
    TokenClass::new("s", DOUBLE_QUOTED),
    TokenClass::new("sb", DOUBLE_QUOTED),
    TokenClass::new(
        "sc",
        &[
            Scope("string.quoted.single"),
            Scope("string.quoted"),
            Scope("string"),
        ],
    ),
    TokenClass::new("sd", DOUBLE_QUOTED),
    TokenClass::new("s2", DOUBLE_QUOTED),
    TokenClass::new("sh", &[Scope("string")]),
    TokenClass::new("si", &[Scope("string.interpolated"), Scope("string")]),
    TokenClass::new("sx", &[Scope("string.other"), Scope("string")]),
    TokenClass::new("sr", &[Scope("string.regexp"), Scope("string")]),
    TokenClass::new("s1", &[Scope("string.quoted.single"), Scope("string")]),
    TokenClass::new("ss", &[Scope("string")]),
    // names
    TokenClass::new(
        "na",
        &[Scope("entity.other.attribute-name"), Scope("entity.other")],
    ),
    TokenClass::new("bp", &[Scope("variable.language"), Scope("variable")]),
    TokenClass::new(
        "nc",
        &[
            Scope("entity.name.class"),
            Scope("entity.other.inherited-class"),
            Scope("support.class"),
        ],
    ),
    TokenClass::new("no", &[Scope("constant.language"), Scope("constant")]),
    TokenClass::new("nd", &[Scope("entity.name.class")]),
    TokenClass::new("ne", &[Scope("entity.name.class")]),
    TokenClass::new(
        "nf",
        &[Scope("entity.name.function"), Scope("support.function")],
    ),
    TokenClass::new("nt", &[Scope("entity.name.tag"), Scope("keyword")]),
    TokenClass::new("nv", &[Scope("variable"), TextColor]),
    TokenClass::new("vc", &[Scope("variable.language")]),
    TokenClass::new("vg", &[Scope("variable.language")]),
    TokenClass::new("vi", &[Scope("variable.language")]),
    // operators
    TokenClass::new("ow", OPERATOR),
    TokenClass::new("o", OPERATOR),
    // plain text
    TokenClass::new("n", &[TextColor]),
    TokenClass::new("nl", &[TextColor]),
    TokenClass::new("nn", &[TextColor]),
    TokenClass::new("nx", &[TextColor]),
    TokenClass::new(
        "bp",
        &[Scope("variable.language"), Scope("variable"), TextColor],
    ),
    TokenClass::new("p", &[TextColor]),
];

/// Builds one rule per entry of [`TOKEN_CLASSES`], in table order.
pub fn build_rules<S: ScopeSource + ?Sized>(source: &S) -> Vec<StyleRule> {
    build_rules_from(TOKEN_CLASSES, source)
}

pub fn build_rules_from<S: ScopeSource + ?Sized>(
    table: &[TokenClass],
    source: &S,
) -> Vec<StyleRule> {
    table
        .iter()
        .map(|class| {
            let rule = class.build(source);
            if rule.is_empty() {
                debug!(class = class.name, "no theme values for token class");
            }
            rule
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::theme::StyleProperty;

    #[derive(Default)]
    struct MapSource {
        scopes: HashMap<String, Vec<String>>,
        text_color: String,
    }

    impl MapSource {
        fn with(mut self, scope: &str, attrs: &[&str]) -> Self {
            self.scopes.insert(
                scope.to_string(),
                attrs.iter().map(|value| value.to_string()).collect(),
            );
            self
        }
    }

    impl ScopeSource for MapSource {
        fn scope(&self, scope: &str) -> &[String] {
            self.scopes.get(scope).map(Vec::as_slice).unwrap_or(&[])
        }

        fn text_color(&self) -> &str {
            &self.text_color
        }
    }

    fn rule<'a>(rules: &'a [StyleRule], name: &str) -> &'a StyleRule {
        rules
            .iter()
            .find(|rule| rule.name() == name)
            .expect("token class present")
    }

    #[test]
    fn table_has_every_pygments_class_in_order() {
        let names: Vec<_> = TOKEN_CLASSES.iter().map(|class| class.name).collect();
        assert_eq!(names.len(), 48);
        assert_eq!(names.first(), Some(&"ge"));
        assert_eq!(names.last(), Some(&"p"));
        assert_eq!(names.iter().filter(|name| **name == "bp").count(), 2);
    }

    #[test]
    fn block_comment_falls_back_to_comment() {
        let source = MapSource::default()
            .with("comment", &["#888888", "italic"])
            .with("comment.block", &["#999999"]);
        let rules = build_rules(&source);

        let cm = rule(&rules, "cm");
        assert_eq!(cm.get(StyleProperty::Color), Some("#999999"));
        assert_eq!(cm.get(StyleProperty::FontStyle), Some("italic"));

        let c = rule(&rules, "c");
        assert_eq!(c.get(StyleProperty::Color), Some("#888888"));
    }

    #[test]
    fn missing_scopes_leave_rules_empty() {
        let rules = build_rules(&MapSource::default());
        assert_eq!(rules.len(), TOKEN_CLASSES.len());
        assert!(rule(&rules, "kc").is_empty());
        assert!(rule(&rules, "n").is_empty());
        assert_eq!(
            rule(&rules, "ge").get(StyleProperty::FontStyle),
            Some("italic")
        );
        assert_eq!(
            rule(&rules, "gs").get(StyleProperty::FontWeight),
            Some("bold")
        );
    }

    #[test]
    fn text_color_fills_plain_names() {
        let source = MapSource {
            text_color: "#F8F8F2".into(),
            ..MapSource::default()
        }
        .with("variable", &["italic"]);
        let rules = build_rules(&source);

        let nv = rule(&rules, "nv");
        assert_eq!(nv.get(StyleProperty::FontStyle), Some("italic"));
        assert_eq!(nv.get(StyleProperty::Color), Some("#F8F8F2"));
        assert_eq!(rule(&rules, "p").declarations(), "color: #F8F8F2;");
    }

    #[test]
    fn custom_table_is_honoured() {
        static TABLE: &[TokenClass] = &[TokenClass::new(
            "x",
            &[Candidate::Scope("a"), Candidate::Literal("underline")],
        )];
        let source = MapSource::default().with("a", &["#010203"]);
        let rules = build_rules_from(TABLE, &source);
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].declarations(),
            "color: #010203; text-decoration: underline;"
        );
    }
}
