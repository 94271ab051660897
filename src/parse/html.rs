//! Small string-level HTML helpers.
//!
//! These are naive on purpose and tailored to the festival site's markup:
//! tag and attribute names are matched case-insensitively, values must be
//! quoted, and there is no handling of comments or scripts.

/// Visible text and target of an `<a>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub href: Option<String>,
}

/// An element located by [`elements_with_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// The opening tag, `<` through `>`.
    pub open_tag: &'a str,
    /// Everything between the opening tag and its matching close tag.
    pub inner: &'a str,
}

impl Element<'_> {
    pub fn attr(&self, name: &str) -> Option<String> {
        attr_value(self.open_tag, name)
    }

    pub fn text(&self) -> String {
        strip_tags(self.inner)
    }
}

/// Parse the first anchor in a fragment such as
/// `<a href="https://maps.example/?q=12+Elm">12 Elm St <i class="icon"></i></a>`.
///
/// Falls back to the whole fragment as text when there is no anchor, so a
/// plain address passes through unchanged.
pub fn parse_anchor(fragment: &str) -> Option<Anchor> {
    match anchors(fragment).into_iter().next() {
        Some(anchor) => Some(anchor),
        None => {
            let text = strip_tags(fragment);
            (!text.is_empty()).then_some(Anchor { text, href: None })
        }
    }
}

/// Every `<a ...>...</a>` in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let lc = to_lowercase_fast(html);
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(rel) = lc[from..].find("<a") {
        let start = from + rel;
        // Skip `<abbr>`, `<area>` and friends
        let next = lc[start + 2..].chars().next();
        if !matches!(next, Some(c) if c.is_whitespace() || c == '>') {
            from = start + 2;
            continue;
        }
        let Some(open_end) = html[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let close = lc[open_end..].find("</a>").map(|i| open_end + i);
        let inner_end = close.unwrap_or(html.len());

        out.push(Anchor {
            text: strip_tags(&html[open_end..inner_end]),
            href: attr_value(&html[start..open_end], "href"),
        });

        from = close.map(|c| c + 4).unwrap_or(html.len());
    }

    out
}

/// Elements whose `class` attribute contains `class` as a whole token.
///
/// The matching close tag is found by counting nested tags of the same name.
pub fn elements_with_class<'a>(html: &'a str, class: &str) -> Vec<Element<'a>> {
    let lc = to_lowercase_fast(html);
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(rel) = lc[from..].find('<') {
        let start = from + rel;
        let Some(open_end) = html[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        from = open_end;

        let open_tag = &html[start..open_end];
        let Some(name) = tag_name(open_tag) else {
            continue;
        };
        let has_class = attr_value(open_tag, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class));
        if !has_class {
            continue;
        }

        if open_tag.ends_with("/>") || is_void(&name) {
            out.push(Element { open_tag, inner: "" });
            continue;
        }

        let inner_end = matching_close(&lc, &name, open_end).unwrap_or(html.len());
        out.push(Element {
            open_tag,
            inner: &html[open_end..inner_end],
        });
    }

    out
}

/// Value of a quoted attribute in an opening tag, entities decoded.
pub fn attr_value(open_tag: &str, name: &str) -> Option<String> {
    let lc = to_lowercase_fast(open_tag);
    let name = to_lowercase_fast(name);
    let mut from = 0;

    while let Some(rel) = lc[from..].find(&name) {
        let at = from + rel;
        from = at + name.len();

        let boundary = lc[..at].chars().next_back().is_some_and(char::is_whitespace);
        if !boundary {
            continue;
        }
        let rest = lc[from..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let value_start = open_tag.len() - rest.len();
        let quote = rest.chars().next()?;
        if quote != '"' && quote != '\'' {
            continue;
        }
        let value = &open_tag[value_start + 1..];
        let end = value.find(quote)?;
        return Some(normalize_entities(&value[..end]));
    }

    None
}

/// Remove all tags, decode the common entities, collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&normalize_entities(&out))
}

/// Minimal entity decoding for what the listing dumps actually contain.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "–")
        .replace("&#039;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tag_name(open_tag: &str) -> Option<String> {
    let name: String = open_tag
        .strip_prefix('<')?
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "img" | "br" | "hr" | "input" | "meta" | "link" | "source" | "area" | "col" | "embed" | "wbr"
    )
}

fn matching_close(lc: &str, name: &str, from: usize) -> Option<usize> {
    let open = format!("<{}", name);
    let close = format!("</{}", name);
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let next_open = find_tag(lc, &open, pos);
        let next_close = lc[pos..].find(&close).map(|i| pos + i)?;

        match next_open {
            Some(o) if o < next_close => {
                depth += 1;
                pos = o + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                pos = next_close + close.len();
            }
        }
    }
}

/// Find `<name` followed by a delimiter, so `<div` doesn't match `<divider`.
fn find_tag(lc: &str, open: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(rel) = lc[pos..].find(open) {
        let at = pos + rel;
        let after = lc[at + open.len()..].chars().next();
        if matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        pos = at + open.len();
    }
    None
}

/// ASCII-only lowercasing; keeps byte offsets aligned with the input.
fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}
