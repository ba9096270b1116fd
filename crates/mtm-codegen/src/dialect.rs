use crate::symbols::StateShape;
use mtm_syntax::AssignOp;

/// String literal quoting of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn char(&self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }

    /// Quotes `value`, escaping it for a JavaScript string literal.
    pub fn quote(&self, value: &str) -> String {
        let quote = self.char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\0' => out.push_str("\\0"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

/// Where generated code ends up. Several targets read state differently in
/// the script and in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Place {
    Script,
    Markup,
}

/// The per-target surface syntax used by the shared emitters.
pub trait Dialect {
    fn quote(&self) -> Quote;

    /// Reading reactive state `name`.
    fn read(&self, name: &str, shape: StateShape, place: Place) -> String;

    /// Assigning `value` to reactive state `name` with `op`. `value` is
    /// already lowered.
    fn write(&self, name: &str, shape: StateShape, op: AssignOp, value: &str) -> String;

    /// Wraps a lowered markup expression in the target's interpolation.
    fn interpolate(&self, expression: &str) -> String;

    /// An event attribute calling `handler`, with the call arguments as
    /// written when there are any.
    fn event(&self, event: &str, handler: &str, arguments: Option<&str>) -> String;
}

/// `value` as the right operand of a binary operator.
pub(crate) fn operand(value: &str) -> String {
    let value = value.trim();
    let simple = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if simple && !value.is_empty() {
        value.to_string()
    } else {
        format!("({})", value)
    }
}

/// `prev + value` style update shared by the setter-function targets.
pub(crate) fn updater(op: AssignOp, value: &str) -> Option<String> {
    op.binary()
        .map(|binary| format!("(prev) => prev {} {}", binary.symbol(), operand(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(Quote::Double.quote("say \"hi\"\n"), r#""say \"hi\"\n""#);
        assert_eq!(Quote::Single.quote("it's"), r"'it\'s'");
        assert_eq!(Quote::Single.quote("say \"hi\""), r#"'say "hi"'"#);
    }

    #[test]
    fn test_operand_parenthesizes_compound_values() {
        assert_eq!(operand("1"), "1");
        assert_eq!(operand("step.size"), "step.size");
        assert_eq!(operand("a - b"), "(a - b)");
    }

    #[test]
    fn test_updater() {
        assert_eq!(updater(AssignOp::Add, "1").as_deref(), Some("(prev) => prev + 1"));
        assert_eq!(updater(AssignOp::Assign, "1"), None);
    }
}
