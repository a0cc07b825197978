use std::fmt;

/// CSS properties a highlighter rule can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Color,
    FontStyle,
    TextDecoration,
    FontWeight,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::TextDecoration => "text-decoration",
            StyleProperty::FontWeight => "font-weight",
        }
    }

    fn bit(self) -> u8 {
        match self {
            StyleProperty::Color => 1,
            StyleProperty::FontStyle => 1 << 1,
            StyleProperty::TextDecoration => 1 << 2,
            StyleProperty::FontWeight => 1 << 3,
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Font-style keywords recognised inside raw attribute strings. The keyword
/// itself becomes the property value.
const KEYWORDS: [(&str, StyleProperty); 3] = [
    ("italic", StyleProperty::FontStyle),
    ("underline", StyleProperty::TextDecoration),
    ("bold", StyleProperty::FontWeight),
];

/// One rule of the generated stylesheet, scoped to a single token class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    name: String,
    properties: Vec<(StyleProperty, String)>,
}

impl StyleRule {
    /// Builds a rule by folding candidate groups in priority order.
    /// 依優先順序折疊候選群組以建立規則。
    ///
    /// Each property is taken from the first attribute string that supplies
    /// it; later groups only fill properties that are still unset.
    pub fn cascade<G, A>(name: impl Into<String>, groups: G) -> Self
    where
        G: IntoIterator,
        G::Item: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let mut cascade = Cascade::default();
        for group in groups {
            for attribute in group {
                cascade.apply(attribute.as_ref());
            }
        }
        Self {
            name: name.into(),
            properties: cascade.properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.properties
            .iter()
            .find(|(candidate, _)| *candidate == property)
            .map(|(_, value)| value.as_str())
    }

    /// Properties in the order they were first set.
    pub fn properties(&self) -> impl Iterator<Item = (StyleProperty, &str)> {
        self.properties
            .iter()
            .map(|(property, value)| (*property, value.as_str()))
    }

    /// Renders the declaration block body, e.g. `color: #fff; font-weight: bold;`.
    /// Empty rules render as an empty string.
    pub fn declarations(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let joined = self
            .properties()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        format!("{joined};")
    }
}

#[derive(Debug, Default)]
struct Cascade {
    assigned: u8,
    properties: Vec<(StyleProperty, String)>,
}

impl Cascade {
    fn apply(&mut self, attribute: &str) {
        if attribute.starts_with('#') && !self.is_set(StyleProperty::Color) {
            self.set(StyleProperty::Color, attribute);
            return;
        }
        for (keyword, property) in KEYWORDS {
            if attribute.contains(keyword) && !self.is_set(property) {
                self.set(property, keyword);
            }
        }
    }

    fn is_set(&self, property: StyleProperty) -> bool {
        self.assigned & property.bit() != 0
    }

    fn set(&mut self, property: StyleProperty, value: &str) {
        self.assigned |= property.bit();
        self.properties.push((property, value.to_string()));
    }
}
