//! Just enough HTML tokenizing to find start tags and their attributes in block
//! markup, and to rewrite attribute values in place.
//!
//! Comments are skipped, and so is the raw text inside `script` and `style`. Nothing
//! here builds a tree.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    /// Byte range of `name[=value]` in the scanned source.
    span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    pub(crate) name: String,
    pub(crate) attrs: Vec<Attr>,
    /// Byte offset right after the tag name, where new attributes go.
    insert_at: usize,
}

impl Tag {
    pub(crate) fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Value of `name`; `Some("")` for a bare attribute.
    pub(crate) fn value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(|attr| attr.value.as_deref().unwrap_or_default())
    }
}

/// Change to one attribute of the `tag`-th start tag returned by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Edit {
    Set { tag: usize, name: &'static str, value: String },
    Remove { tag: usize, name: &'static str },
}

/// Start tags in document order.
pub(crate) fn scan(html: &str) -> Vec<Tag> {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut tags = Vec::new();
    let mut i = 0;

    while let Some(offset) = html[i..].find('<') {
        let start = i + offset;
        if html[start..].starts_with("<!--") {
            i = html[start + 4..].find("-->").map_or(len, |end| start + 4 + end + 3);
            continue;
        }
        if !bytes.get(start + 1).is_some_and(u8::is_ascii_alphabetic) {
            i = start + 1;
            continue;
        }

        let mut j = start + 1;
        while j < len && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-') {
            j += 1;
        }
        let name = html[start + 1..j].to_ascii_lowercase();
        let insert_at = j;
        let (attrs, end) = scan_attrs(html, j);
        i = end;

        if name == "script" || name == "style" {
            let close = format!("</{name}");
            i = find_ascii_ci(html, end, &close).unwrap_or(len);
        }
        tags.push(Tag { name, attrs, insert_at });
    }

    tags
}

/// Reads attributes from `from` up to and including the closing `>`.
fn scan_attrs(html: &str, from: usize) -> (Vec<Attr>, usize) {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut attrs = Vec::new();
    let mut i = from;

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            return (attrs, len);
        }
        match bytes[i] {
            b'>' => return (attrs, i + 1),
            b'/' => {
                i += 1;
                continue;
            },
            _ => {},
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == name_start {
            i += 1;
            continue;
        }
        let name = html[name_start..i].to_ascii_lowercase();
        let name_end = i;

        let mut k = i;
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len || bytes[k] != b'=' {
            attrs.push(Attr { name, value: None, span: name_start..name_end });
            continue;
        }

        k += 1;
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let value = if k < len && matches!(bytes[k], b'"' | b'\'') {
            let quote = char::from(bytes[k]);
            let value_start = k + 1;
            let value_end = html[value_start..].find(quote).map_or(len, |end| value_start + end);
            i = (value_end + 1).min(len);
            &html[value_start..value_end]
        } else {
            let value_start = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                k += 1;
            }
            i = k;
            &html[value_start..k]
        };

        attrs.push(Attr { name, value: Some(decode_entities(value)), span: name_start..i });
    }
}

fn find_ascii_ci(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack.as_bytes()[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|pos| from + pos)
}

/// Applies `edits` to `html` and returns the rewritten markup.
pub(crate) fn rewrite(html: &str, edits: &[Edit]) -> String {
    let tags = scan(html);
    let mut patches: Vec<(Range<usize>, String)> = Vec::with_capacity(edits.len());

    for edit in edits {
        match edit {
            Edit::Set { tag, name, value } => {
                let Some(tag) = tags.get(*tag) else { continue };
                let rendered = format!("{name}=\"{}\"", escape_attr(value));
                match tag.attr(name) {
                    Some(attr) => patches.push((attr.span.clone(), rendered)),
                    None => patches.push((tag.insert_at..tag.insert_at, format!(" {rendered}"))),
                }
            },
            Edit::Remove { tag, name } => {
                let Some(attr) = tags.get(*tag).and_then(|tag| tag.attr(name)) else { continue };
                let start = html[..attr.span.start].trim_end().len();
                patches.push((start..attr.span.end, String::new()));
            },
        }
    }

    patches.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut out = html.to_owned();
    for (range, replacement) in patches {
        out.replace_range(range, &replacement);
    }
    out
}

pub(crate) fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_owned();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub(crate) fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

pub(crate) fn escape_text(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
