//! Token rewriting applied before the command line is handed to the compiler

/// Rewrite macro definitions so the joined command line survives re-splitting.
///
/// Every `/D` or `-D` becomes a single `/D<value>` token, pulling the value
/// from the next token when the flag stood alone. Values that assign a quoted
/// string (`FOO="bar"`) get each `"` tripled so the quotes reach the
/// preprocessor intact. All other tokens pass through unchanged.
pub fn normalize_for_shell<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut iter = tokens.iter().map(|t| t.as_ref());

    while let Some(token) = iter.next() {
        if !(token.starts_with("/D") || token.starts_with("-D")) {
            out.push(token.to_string());
            continue;
        }

        let value = if token.len() == 2 {
            iter.next().unwrap_or_default()
        } else {
            &token[2..]
        };

        let value = if value.contains("=\"") {
            value.replace('"', "\"\"\"")
        } else {
            value.to_string()
        };

        out.push(format!("/D{}", value));
    }

    out
}
