//! Command-line splitting and joining with MSVC runtime quoting rules
//!
//! Splitting follows the rules the Microsoft C runtime applies to a process
//! command line:
//!
//! - spaces, tabs and line breaks separate tokens outside quotes
//! - `"` toggles quoted mode and is removed
//! - `""` inside quoted mode produces one literal `"`
//! - `2n` backslashes before a `"` produce `n` backslashes, the quote is a delimiter
//! - `2n+1` backslashes before a `"` produce `n` backslashes and a literal `"`
//! - backslashes not followed by `"` are literal

/// Split a command line string into tokens.
pub fn split_command_line(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let run = chars[i..].iter().take_while(|&&c| c == '\\').count();
                let next = i + run;
                in_token = true;
                if chars.get(next) == Some(&'"') {
                    current.extend(std::iter::repeat_n('\\', run / 2));
                    if run % 2 == 1 {
                        current.push('"');
                        i = next + 1;
                    } else {
                        i = next;
                    }
                } else {
                    current.extend(std::iter::repeat_n('\\', run));
                    i = next;
                }
            }
            '"' => {
                in_token = true;
                if quoted && chars.get(i + 1) == Some(&'"') {
                    current.push('"');
                    i += 2;
                } else {
                    quoted = !quoted;
                    i += 1;
                }
            }
            ' ' | '\t' | '\r' | '\n' if !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
                i += 1;
            }
            c => {
                current.push(c);
                in_token = true;
                i += 1;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}

/// Join tokens into one command line, quoting tokens that contain whitespace.
pub fn join_arguments<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| {
            let t = t.as_ref();
            if t.contains(' ') || t.contains('\t') {
                format!("\"{}\"", t)
            } else {
                t.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
