//! Phase one: copy the parsed fragment into an owned tree and rewrite it.
//!
//! Each rule is a separate pass over the tree, applied in a fixed order.
//! A pass replaces every outermost matching element with a text node; the
//! text it computes already contains the output of earlier passes, so a
//! `<b>` inside a margin-spaced `<div>` arrives there as `**...**`.
//!
//! Element text is the concatenation of its text nodes, trimmed at the ends
//! only, so words on either side of inline markup stay apart.

use scraper::{ElementRef, Html};

/// Paragraph-break sentinel. Private-use code point, never present in page text.
pub(crate) const PARA_MARK: char = '\u{E000}';

/// Sentinel with the padding the linearizer expects around it.
const PARA: &str = "\n\n\u{E000}\n\n";

/// Elements whose text never reaches the output.
const SKIPPED: &[&str] = &["script", "style", "template", "noscript"];

// ---------------------------------------------------------------------------
// Owned tree
// ---------------------------------------------------------------------------

/// A node of the rewritten tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element reduced to what the rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub classes: Vec<String>,
    pub href: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn has_any_class(&self, classes: &[&str]) -> bool {
        classes.iter().any(|c| self.has_class(c))
    }

    fn is(&self, names: &[&str]) -> bool {
        names.contains(&self.name.as_str())
    }

    /// Text of everything below this element, trimmed at both ends.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out.trim().to_string()
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// A rewritten markup fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Copy a parsed fragment into the owned representation.
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_fragment(html);
        Self {
            nodes: copy_children(doc.root_element()),
        }
    }

    /// All text nodes in document order, joined by single spaces.
    pub fn joined_text(&self) -> String {
        let mut parts = Vec::new();
        collect_all(&self.nodes, &mut parts);
        parts.join(" ")
    }
}

fn collect_all<'a>(nodes: &'a [Node], out: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push(t),
            Node::Element(el) => collect_all(&el.children, out),
        }
    }
}

fn copy_children(parent: ElementRef<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if let Some(text) = child.value().as_text() {
            nodes.push(Node::Text(text.to_string()));
        } else if let Some(el) = ElementRef::wrap(child) {
            let value = el.value();
            if SKIPPED.contains(&value.name()) {
                continue;
            }
            nodes.push(Node::Element(Element {
                name: value.name().to_string(),
                classes: value.classes().map(str::to_string).collect(),
                href: value.attr("href").map(str::to_string),
                children: copy_children(el),
            }));
        }
    }
    nodes
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One rewrite: which elements it applies to and what replaces them.
///
/// `render` returning `None` leaves the element in place and lets the pass
/// continue into its children.
struct Rule {
    name: &'static str,
    matches: fn(&Element) -> bool,
    render: fn(&Element) -> Option<String>,
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Wrap in `**`, folding bold markers already produced for nested elements.
fn strong(text: String) -> Option<String> {
    let inner = text.replace("**", "");
    let inner = inner.trim();
    (!inner.is_empty()).then(|| format!("**{inner}**"))
}

const RULES: &[Rule] = &[
    Rule {
        name: "quotation",
        matches: |el| el.has_any_class(&["prakriya", "derivation", "prakriya-box"]),
        render: |el| non_empty(el.text()).map(|t| format!("{PARA}> {t}{PARA}")),
    },
    Rule {
        name: "heading",
        matches: |el| el.has_class("section-header") || el.is(&["h3", "h4", "h5"]),
        render: |el| non_empty(el.text()).map(|t| format!("{PARA}### {t}{PARA}")),
    },
    Rule {
        name: "strong",
        matches: |el| el.is(&["b", "strong"]),
        render: |el| strong(el.text()),
    },
    Rule {
        name: "emphasis-class",
        matches: |el| el.has_any_class(&["font-weight-bold", "bigtext-font"]),
        render: |el| strong(el.text()),
    },
    Rule {
        name: "italic",
        matches: |el| el.is(&["i", "em"]),
        render: |el| non_empty(el.text()).map(|t| format!("*{t}*")),
    },
    Rule {
        name: "line-break",
        matches: |el| el.is(&["br"]),
        render: |_| Some("\n".to_string()),
    },
    Rule {
        name: "separator",
        matches: |el| el.has_class("section-separator") || el.is(&["hr"]),
        render: |_| Some(format!("{PARA}---{PARA}")),
    },
    Rule {
        name: "spaced-block",
        matches: |el| el.is(&["div"]) && el.has_any_class(&["mt-3", "mt-4", "mb-3", "mb-4"]),
        render: |el| non_empty(el.text()).map(|t| format!("{PARA}{t}{PARA}")),
    },
    Rule {
        name: "link",
        matches: |el| el.is(&["a"]),
        render: |el| {
            let text = non_empty(el.text())?;
            match el.href.as_deref() {
                Some(href) if !href.is_empty() => Some(format!("[{text}]({href})")),
                _ => Some(text),
            }
        },
    },
];

/// Run every rule over the fragment, in order, producing a new fragment.
pub fn rewrite(fragment: &Fragment) -> Fragment {
    let mut nodes = fragment.nodes.clone();
    for rule in RULES {
        nodes = apply(nodes, rule);
        tracing::trace!(rule = rule.name, "rewrite pass done");
    }
    Fragment { nodes }
}

fn apply(nodes: Vec<Node>, rule: &Rule) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(el) => {
                if (rule.matches)(&el) {
                    if let Some(text) = (rule.render)(&el) {
                        return Node::Text(text);
                    }
                }
                Node::Element(Element {
                    children: apply(el.children, rule),
                    ..el
                })
            }
            text => text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewritten_text(html: &str) -> String {
        rewrite(&Fragment::parse(html)).joined_text()
    }

    #[test]
    fn rewrite_leaves_source_fragment_alone() {
        let fragment = Fragment::parse("<p>one <b>two</b><script>var x;</script></p>");
        let before = fragment.clone();
        let rewritten = rewrite(&fragment);
        assert_eq!(fragment, before);
        assert_ne!(rewritten, before);
        assert!(!fragment.joined_text().contains("var x"));
    }

    #[test]
    fn strong_inside_spaced_block_is_kept() {
        let text = rewritten_text(r#"<div class="mt-3">a <b>b</b> c</div>"#);
        assert_eq!(text, format!("{PARA}a **b** c{PARA}"));
    }

    #[test]
    fn quotation_flattens_inner_markup() {
        let text = rewritten_text(r#"<div class="prakriya">x <b>y</b></div>"#);
        assert_eq!(text, format!("{PARA}> x y{PARA}"));
    }

    #[test]
    fn nested_bold_is_wrapped_once() {
        assert_eq!(
            rewritten_text(r#"<span class="font-weight-bold"><b>वृद्धिः</b></span>"#),
            "**वृद्धिः**"
        );
        assert_eq!(
            rewritten_text(r#"<span class="bigtext-font"><b>आत्</b> ऐच्</span>"#),
            "**आत् ऐच्**"
        );
    }

    #[test]
    fn empty_bold_is_left_as_element() {
        let fragment = rewrite(&Fragment::parse("<b> </b>"));
        assert!(matches!(&fragment.nodes[0], Node::Element(el) if el.name == "b"));
    }

    #[test]
    fn link_without_href_becomes_text() {
        assert_eq!(rewritten_text("<a>plain</a>"), "plain");
        assert_eq!(
            rewritten_text(r#"<a href="/sutraani/1/1/1">वृद्धिरादैच्</a>"#),
            "[वृद्धिरादैच्](/sutraani/1/1/1)"
        );
    }

    #[test]
    fn line_break_is_a_single_newline() {
        assert_eq!(rewritten_text("a<br>b"), "a \n b");
    }
}
