//! Low-level HTML string helpers tailored to the HFA "Table A" exports.
//! Deliberately naive: the exports are machine-generated, shallow markup,
//! so tag matching is ASCII case-insensitive substring search rather than
//! a full parser.

/// Return the content between the first `<tag ...>` and its `</tag>`,
/// case-insensitive on the tag name. Nested same-name tags are not handled
/// (the exports never nest tables or rows).
pub fn inner_of_first<'a>(s: &'a str, tag: &str) -> Option<&'a str> {
    let lc = ascii_lowercase(s);
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}", tag.to_ascii_lowercase());

    let open_idx = find_tag_open(&lc, &open)?;
    let after_open = lc[open_idx..].find('>')? + open_idx + 1;
    let close_idx = lc[after_open..].find(&close)? + after_open;
    Some(&s[after_open..close_idx])
}

/// Iterate the inner contents of every `<tag ...>...</tag>` block in `s`.
pub fn inner_blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = ascii_lowercase(s);
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}", tag.to_ascii_lowercase());

    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = find_tag_open(&lc[from..], &open) {
        let start = from + rel;
        let Some(gt) = lc[start..].find('>') else { break };
        let content_start = start + gt + 1;
        let Some(end_rel) = lc[content_start..].find(&close) else { break };
        out.push(&s[content_start..content_start + end_rel]);
        from = content_start + end_rel + close.len();
    }
    out
}

/// Find `open` (e.g. "<tr") only where it starts a real tag, i.e. followed
/// by '>', whitespace or an attribute, not a longer tag name like `<trx>`.
fn find_tag_open(lc: &str, open: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = lc[from..].find(open) {
        let idx = from + rel;
        match lc.as_bytes().get(idx + open.len()) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') | Some(b'/') => {
                return Some(idx)
            }
            None => return None,
            _ => from = idx + open.len(),
        }
    }
    None
}

/// Remove all `<...>` tags, decode entities, collapse whitespace.
pub fn text_content(s: &str) -> String {
    let mut stripped = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&stripped))
}

/// Decode the HTML entities that occur in HFA exports and index files:
/// the common named ones plus numeric (`&#NNN;` / `&#xHH;`) references.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';').filter(|&n| n <= 10) else {
            out.push('&');
            rest = &rest[amp + 1..];
            continue;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[amp + semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[amp + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix('#').and_then(|e| {
        e.strip_prefix('x').or_else(|| e.strip_prefix('X'))
    }) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

/// Collapse whitespace runs into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

fn ascii_lowercase(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}
