//! Regular grammar shared by the clause parser and the literal classifier.
//!
//! Every token class is a regex fragment. Fragments are non-capturing so they
//! can be nested freely; callers add named groups where they need captures.

/// Lowercase-led property path, e.g. `foo` or `a.b_c`.
pub(crate) const PLAIN_ATTRIBUTE: &str = r"(?:[a-z][a-zA-Z0-9_.]*)";

/// UTC instant without fractional seconds.
pub(crate) const TIME: &str = r"[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z";

pub(crate) const DURATION: &str =
    r"P(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+W)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+S)?)?";

pub(crate) const NUMBER: &str = r"-?[0-9]+(?:\.[0-9]+)?";

/// Single-quoted string with `''` as the escaped quote.
pub(crate) const STRING: &str = r"'(?:[^']|'')*'";

pub(crate) const BOOLEAN: &str = r"true|false";

/// Zero-argument call, e.g. `f()`.
pub(crate) const FUNCTION_CALL0: &str = r"[a-zA-Z_]+\(\)";

/// Lazy polygon body; the enclosing pattern decides where it ends.
pub(crate) const POLYGON: &str = r"POLYGON\s*\(.+?\)";

/// Arithmetic operator character class.
pub(crate) const OPERATOR: &str = r"[+\-*/]";

/// `instant/instant`, `instant/duration` or `duration/instant`.
pub(crate) fn interval() -> String {
    format!("(?:{TIME}/{TIME})|(?:{TIME}/{DURATION})|(?:{DURATION}/{TIME})")
}

/// Function call wrapping a property path, e.g. `round(foo)`.
pub(crate) fn attribute_call() -> String {
    format!(r"[a-zA-Z_]+\({PLAIN_ATTRIBUTE}\)")
}

/// Argument accepted by a function call in literal position.
pub(crate) fn call_argument() -> String {
    format!("(?:{}|{TIME}|{NUMBER}|{PLAIN_ATTRIBUTE})", interval())
}

/// Function call in literal position, e.g. `end(2020-01-01T00:00:00Z/P1D)`.
pub(crate) fn literal_call() -> String {
    format!(r"[a-zA-Z_]+\({}\)", call_argument())
}

/// Any single literal operand. Alternatives are tried in order.
pub(crate) fn plain_literal() -> String {
    format!(
        "{}|{TIME}|{}|{FUNCTION_CALL0}|{NUMBER}|{BOOLEAN}|{STRING}|{DURATION}",
        interval(),
        literal_call()
    )
}

/// The left-hand side of a clause.
pub(crate) fn attribute() -> String {
    format!("(?:{PLAIN_ATTRIBUTE}|{})", attribute_call())
}

/// A literal operand optionally combined with a second one.
pub(crate) fn literal() -> String {
    let plain = plain_literal();
    format!("(?:(?:{plain})(?:{OPERATOR}(?:{plain}))?)")
}
