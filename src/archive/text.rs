use super::{DecodeError, TextDecoder, TextPair};

/// One `identifier<TAB>value` pair per line. Values may use `\n`, `\t` and
/// `\\` escapes; blank lines are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvTextDecoder;

impl TextDecoder for TsvTextDecoder {
    fn decode(&self, data: &[u8]) -> Result<Vec<TextPair>, DecodeError> {
        let text = std::str::from_utf8(data).map_err(|_| DecodeError::Utf8)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut pairs = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (identifier, value) = line
                .split_once('\t')
                .ok_or(DecodeError::MissingSeparator { line: idx + 1 })?;
            pairs.push(TextPair::new(identifier, unescape(value)));
        }
        Ok(pairs)
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
