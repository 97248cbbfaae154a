//! Connection string redaction for log output

/// Mask credential values in a `key=value;` connection string
///
/// Any segment whose key contains `password` or equals `pwd`
/// (case-insensitive) has its whole value replaced with `***`. Jet strings
/// such as `Jet OLEDB:Database Password=...` are covered by the substring
/// match.
///
/// Values wrapped in `{...}` (ODBC, `}}` escapes a brace) or in `"..."` /
/// `'...'` (OLE DB, a doubled quote escapes it) are kept whole, so a `;`
/// inside them does not end the segment. An unterminated quote runs to the
/// end of the string. Everything else, including segment order and
/// separators, is kept.
pub fn redact_connection_string(connection_string: &str) -> String {
    let mut redacted = String::with_capacity(connection_string.len());
    let mut rest = connection_string;

    loop {
        let end = segment_len(rest);
        let segment = &rest[..end];
        match segment.split_once('=') {
            Some((key, value)) if !value.trim().is_empty() && is_secret_key(key) => {
                redacted.push_str(key);
                redacted.push_str("=***");
            }
            _ => redacted.push_str(segment),
        }

        if end == rest.len() {
            break;
        }
        redacted.push(';');
        rest = &rest[end + 1..];
    }

    redacted
}

/// Length of the leading segment, up to but excluding its `;` separator
fn segment_len(input: &str) -> usize {
    match (input.find('='), input.find(';')) {
        (Some(eq), semi) if semi.is_none_or(|semi| eq < semi) => {
            eq + 1 + value_len(&input[eq + 1..])
        }
        (_, Some(semi)) => semi,
        (Some(eq), None) => eq + 1 + value_len(&input[eq + 1..]),
        (None, None) => input.len(),
    }
}

fn value_len(value: &str) -> usize {
    let start = value.len() - value.trim_start().len();
    let closing = match value[start..].chars().next() {
        Some('{') => Some(b'}'),
        Some('"') => Some(b'"'),
        Some('\'') => Some(b'\''),
        _ => None,
    };

    let scan_from = match closing {
        Some(close) => match quoted_len(&value[start..], close) {
            Some(len) => start + len,
            None => return value.len(),
        },
        None => start,
    };

    value[scan_from..]
        .find(';')
        .map_or(value.len(), |semi| scan_from + semi)
}

/// Length of a quoted value including both delimiters, if it is terminated
fn quoted_len(value: &str, close: u8) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == close {
            if bytes.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn is_secret_key(key: &str) -> bool {
    let key = key.trim().to_ascii_lowercase();
    key == "pwd" || key.contains("password")
}
