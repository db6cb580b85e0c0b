use super::descriptor::{ArgDescriptor, ArgKind, ArgMarker};
use super::value::{ArgData, ArgValue};
use crate::buffers::TokenBuf;

/// Result of trying one descriptor against the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    /// Accepted; any consumed tokens are gone from the cursor
    Bound,
    /// Not a match; the token was not consumed and may fit a later descriptor
    NotFound,
    /// A malformed token that cannot be valid anywhere on this line
    Syntax(String),
}

/// Token cursor over the argument part of one script line.
///
/// Keeps one token of lookahead so optional descriptors can be tried against
/// the same token repeatedly, and retains access to the raw remainder for
/// sentence arguments.
pub struct ArgCursor {
    buf: TokenBuf,
    current: Option<String>,
}

impl ArgCursor {
    /// Whitespace-delimited tokens with backslash as protector.
    pub fn new(raw: &str) -> Self {
        let mut buf = TokenBuf::from_text(raw);
        buf.set_protector(Some('\\'));
        let current = buf.first_token();
        Self { buf, current }
    }

    /// The whole input as a single token, splitting disabled. Used when
    /// resolving deferred variables from host-supplied values.
    pub fn whole_value(raw: &str) -> Self {
        let mut buf = TokenBuf::from_text(raw);
        buf.set_delimiters("");
        let current = buf.first_token();
        Self { buf, current }
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.current.is_some()
    }

    pub fn advance(&mut self) {
        self.current = self.buf.next_token();
    }

    /// Raw text from the start of the current token to the end of the line,
    /// delimiters untouched; exhausts the cursor.
    pub fn take_rest(&mut self) -> String {
        let rest = self.buf.rest().to_string();
        self.buf.consume_rest();
        self.current = None;
        rest
    }
}

/// Try to bind the cursor's current token against one descriptor.
///
/// An argument that is already set is never rebound. A `$N` token defers
/// binding for every token-consuming kind; the concrete value arrives later
/// through the variable-resolution pass.
pub fn bind(desc: &ArgDescriptor, value: &mut ArgValue, cursor: &mut ArgCursor) -> BindOutcome {
    if value.is_set() {
        return BindOutcome::NotFound;
    }
    if desc.kind == ArgKind::Nothing {
        value.data = ArgData::Flag;
        return BindOutcome::Bound;
    }
    let token = match cursor.token() {
        Some(t) => t.to_string(),
        None => {
            // An optional selection is satisfied by an empty value: a
            // variable may decline to use one of the choices at run time.
            if desc.kind == ArgKind::Selection
                && matches!(desc.marker, ArgMarker::OptionalPositional { .. })
            {
                return BindOutcome::Bound;
            }
            return BindOutcome::NotFound;
        }
    };

    if let Some(number) = token.strip_prefix('$') {
        return match number.parse::<usize>() {
            Ok(n) if n > 0 => {
                value.variable = Some(n);
                cursor.advance();
                BindOutcome::Bound
            }
            _ => BindOutcome::Syntax(format!(">{token}< is not a proper variable identifier")),
        };
    }

    match desc.kind {
        ArgKind::Nothing => unreachable!(),
        ArgKind::Integer => match token.parse::<i64>() {
            Ok(i) => value.data = ArgData::Int(i),
            Err(_) => return numeric_failure(&token),
        },
        ArgKind::Float => match token.parse::<f64>() {
            Ok(f) => value.data = ArgData::Float(f),
            Err(_) => return numeric_failure(&token),
        },
        ArgKind::Word | ArgKind::Filename => {
            value.data = ArgData::Str(token.clone());
        }
        ArgKind::Sentence => {
            value.data = ArgData::Str(cursor.take_rest());
            return BindOutcome::Bound;
        }
        ArgKind::Selection => match desc.choices.iter().position(|c| *c == token) {
            Some(i) => value.data = ArgData::Choice(i),
            None => return BindOutcome::NotFound,
        },
    }
    cursor.advance();
    BindOutcome::Bound
}

/// A numeric-looking token that failed to parse is a syntax error (trailing
/// garbage); anything else is simply not a number and may match elsewhere.
fn numeric_failure(token: &str) -> BindOutcome {
    let body = token
        .strip_prefix(['+', '-'])
        .unwrap_or(token);
    if body.starts_with(|c: char| c.is_ascii_digit()) || body.starts_with('.') {
        BindOutcome::Syntax(format!("trailing garbage in number >{token}<"))
    } else {
        BindOutcome::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_binds_and_consumes() {
        let desc = ArgDescriptor::required(ArgKind::Integer, "count");
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("42 next");
        assert_eq!(bind(&desc, &mut value, &mut cursor), BindOutcome::Bound);
        assert_eq!(value.data, ArgData::Int(42));
        assert_eq!(cursor.token(), Some("next"));
    }

    #[test]
    fn trailing_garbage_is_syntax_error() {
        let desc = ArgDescriptor::required(ArgKind::Float, "threshold");
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("3.5x");
        assert!(matches!(
            bind(&desc, &mut value, &mut cursor),
            BindOutcome::Syntax(_)
        ));
    }

    #[test]
    fn non_numeric_token_is_not_found() {
        let desc = ArgDescriptor::required(ArgKind::Integer, "count");
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("hello");
        assert_eq!(bind(&desc, &mut value, &mut cursor), BindOutcome::NotFound);
        assert_eq!(cursor.token(), Some("hello"));
    }

    #[test]
    fn variable_placeholder_defers() {
        let desc = ArgDescriptor::required(ArgKind::Float, "threshold");
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("$2");
        assert_eq!(bind(&desc, &mut value, &mut cursor), BindOutcome::Bound);
        assert_eq!(value.variable, Some(2));
        assert_eq!(value.data, ArgData::Unset);
    }

    #[test]
    fn bad_variable_is_syntax_error() {
        let desc = ArgDescriptor::required(ArgKind::Word, "name");
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("$zero");
        assert!(matches!(
            bind(&desc, &mut value, &mut cursor),
            BindOutcome::Syntax(_)
        ));
    }

    #[test]
    fn selection_mismatch_leaves_token() {
        let desc =
            ArgDescriptor::required(ArgKind::Selection, "mode").with_choices(&["a", "b"]);
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("c");
        assert_eq!(bind(&desc, &mut value, &mut cursor), BindOutcome::NotFound);
        assert_eq!(cursor.token(), Some("c"));
    }

    #[test]
    fn sentence_takes_raw_remainder() {
        let desc = ArgDescriptor::required(ArgKind::Sentence, "text");
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::new("hello  wide   world");
        assert_eq!(bind(&desc, &mut value, &mut cursor), BindOutcome::Bound);
        assert_eq!(value.data, ArgData::Str("hello  wide   world".to_string()));
        assert!(!cursor.has_token());
    }

    #[test]
    fn empty_value_satisfies_optional_selection() {
        let desc = ArgDescriptor::optional(ArgKind::Selection, "mode").with_choices(&["a"]);
        let mut value = ArgValue::unset();
        let mut cursor = ArgCursor::whole_value("");
        assert_eq!(bind(&desc, &mut value, &mut cursor), BindOutcome::Bound);
        assert!(!value.is_set());
    }
}
