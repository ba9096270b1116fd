//! Pieces shared by the JSX targets, React and Solid.

use crate::dialect::updater;
use crate::emit::{indent, join_sections};
use crate::naming::{capitalize, setter_name};
use crate::GeneratedCode;
use mtm_syntax::AssignOp;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VOID_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(area|base|br|col|embed|hr|img|input|link|meta|source|track|wbr)\b([^<>]*?)\s*(/?)>")
        .expect("Invalid void element regex pattern")
});
static HTML_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s)(class|for)=").expect("Invalid attribute regex pattern"));

const EVENT_NAMES: [(&str, &str); 10] = [
    ("click", "onClick"),
    ("change", "onChange"),
    ("input", "onInput"),
    ("submit", "onSubmit"),
    ("focus", "onFocus"),
    ("blur", "onBlur"),
    ("keydown", "onKeyDown"),
    ("keyup", "onKeyUp"),
    ("mouseenter", "onMouseEnter"),
    ("mouseleave", "onMouseLeave"),
];

/// JSX prop for a DOM event: `keydown` -> `onKeyDown`, anything not in the
/// table -> `on` + capitalized name.
pub fn event_prop(event: &str) -> String {
    EVENT_NAMES
        .iter()
        .find(|(dom, _)| *dom == event)
        .map(|(_, prop)| (*prop).to_string())
        .unwrap_or_else(|| format!("on{}", capitalize(event)))
}

pub(crate) fn event_attribute(event: &str, handler: &str, arguments: Option<&str>) -> String {
    match arguments {
        Some(arguments) => format!("{}={{() => {}({})}}", event_prop(event), handler, arguments),
        None => format!("{}={{{}}}", event_prop(event), handler),
    }
}

/// `setX(value)`, or a functional update for compound assignments.
pub(crate) fn setter_call(name: &str, op: AssignOp, value: &str) -> String {
    let argument = updater(op, value).unwrap_or_else(|| value.trim().to_string());
    format!("{}({})", setter_name(name), argument)
}

/// Self-closes void elements, which JSX requires.
pub(crate) fn close_void_elements(markup: &str) -> String {
    VOID_ELEMENT
        .replace_all(markup, |caps: &Captures<'_>| {
            if &caps[3] == "/" {
                caps[0].to_string()
            } else {
                format!("<{}{} />", &caps[1], &caps[2])
            }
        })
        .into_owned()
}

/// `class` and `for` attributes under their React prop names.
pub(crate) fn react_attributes(markup: &str) -> String {
    HTML_ATTRIBUTE
        .replace_all(markup, |caps: &Captures<'_>| {
            let prop = if &caps[2] == "class" { "className" } else { "htmlFor" };
            format!("{}{}=", &caps[1], prop)
        })
        .into_owned()
}

/// An ES module default-exporting a function component.
pub(crate) fn function_component(name: &str, code: &GeneratedCode) -> String {
    let markup = code
        .template
        .as_ref()
        .map(|template| template.template.as_str())
        .filter(|markup| !markup.trim().is_empty());
    let render = match markup {
        Some(markup) => format!("return (\n  <>\n{}\n  </>\n);", indent(markup, 4)),
        None => "return null;".to_string(),
    };
    let body = join_sections([
        code.state.join("\n"),
        code.functions.join("\n\n"),
        code.effects.join("\n"),
        code.statements.join("\n"),
        render,
    ]);

    let mut out = String::new();
    if !code.imports.is_empty() {
        out.push_str(&code.imports.join("\n"));
        out.push_str("\n\n");
    }
    out.push_str(&format!("export default function {}() {{\n{}\n}}\n", name, indent(&body, 2)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_props() {
        assert_eq!(event_prop("click"), "onClick");
        assert_eq!(event_prop("keydown"), "onKeyDown");
        assert_eq!(event_prop("mouseleave"), "onMouseLeave");
        assert_eq!(event_prop("dblclick"), "onDblclick");
        assert_eq!(event_prop("scroll"), "onScroll");
    }

    #[test]
    fn test_event_attribute_with_arguments() {
        assert_eq!(event_attribute("click", "remove", Some("item.id")), "onClick={() => remove(item.id)}");
    }

    #[test]
    fn test_markup_fixups() {
        assert_eq!(
            close_void_elements(r#"<input value={name}><br/><img src="a.png" />"#),
            r#"<input value={name} /><br/><img src="a.png" />"#
        );
        assert_eq!(
            react_attributes(r#"<label class="field" for="name">"#),
            r#"<label className="field" htmlFor="name">"#
        );
    }
}
