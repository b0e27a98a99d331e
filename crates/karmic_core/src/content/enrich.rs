//! Content enrichment pipeline.
//!
//! # Responsibility
//! - Apply the ordered markup passes to authored interpretation content
//!   right before display.
//!
//! # Invariants
//! - `enrich` is pure and idempotent: `enrich(enrich(x)) == enrich(x)`.
//! - Every pass skips what it (or a later pass) already produced: bolding
//!   never happens inside `<strong>`/`<b>`, class/style edits check for the
//!   attribute first, wrappers check for an enclosing container.
//! - Text inside tag markup (attributes) and inside comments is never
//!   rewritten.
//! - Dash bullets never swallow closing tags of elements they did not open.

use std::iter;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Domain phrases bolded wherever they appear in text.
pub const KEY_PHRASES: &[&str] = &[
    "Matriz Kármica",
    "Selo Kármico",
    "Chamado do Destino",
    "Portal do Karma",
    "Herança Kármica",
    "Códex da Reprogramação",
    "Profecia dos Ciclos",
    "Marca Espiritual",
    "Enigma da Manifestação",
];

/// Single words bolded as whole words.
pub const EMPHASIS_WORDS: &[&str] = &[
    "karma",
    "missão",
    "propósito",
    "transformação",
    "libertação",
    "cura",
    "equilíbrio",
    "consciência",
    "gratidão",
    "perdão",
];

pub const SUBTITLE_CLASS: &str = "subtitle";
pub const AFFIRMATION_BOX_CLASS: &str = "affirmation-box";
pub const AFFIRMATION_TITLE_CLASS: &str = "affirmation-title";
pub const PARAGRAPH_STYLE: &str = "margin-bottom: 1rem;";

const AFFIRMATION_MARKERS: &[&str] = &["afirmação", "afirmacao", "affirmation"];

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--[\s\S]*?-->|</?[A-Za-z][^>]*>").expect("valid tag regex"));
static BLANK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid blank line regex"));
static DASH_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*-[ \t]+(.*\S)[ \t\r]*$").expect("valid dash line regex"));
static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(/?)([A-Za-z][A-Za-z0-9]*)").expect("valid tag name regex"));
static TRAILING_CLOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</([A-Za-z][A-Za-z0-9]*)\s*>$").expect("valid trailing close regex")
});
static STRONG_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<(/?)(?:strong|b)(?:\s[^>]*)?>$").expect("valid strong tag regex")
});
static KEY_PHRASE_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(KEY_PHRASES));
static EMPHASIS_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(EMPHASIS_WORDS));
static HEADING_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h([1-6])(\s[^>]*)?>").expect("valid heading open regex"));
static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h[1-6](?:\s[^>]*)?>.*?</h[1-6]\s*>").expect("valid heading regex")
});
static CLASS_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid class regex")
});
static STYLE_OR_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|\s)(?:style|class)\s*=").expect("valid attr regex"));
static LI_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li(?:\s[^>]*)?>").expect("valid li open regex"));
static LI_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</li\s*>").expect("valid li close regex"));
static LI_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<li(?:\s[^>]*)?>.*?</li\s*>").expect("valid li element regex")
});
static P_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<p(\s[^>]*)?>").expect("valid paragraph regex"));

/// Turns authored content into display-ready markup.
pub fn enrich(raw: &str) -> String {
    let html = wrap_plain_blocks(raw);
    let html = bold_outside_strong(&html, &KEY_PHRASE_RE);
    let html = tag_headings(&html);
    let html = wrap_affirmations(&html);
    let html = bold_outside_strong(&html, &EMPHASIS_RE);
    let html = convert_dash_bullets(&html);
    let html = group_list_items(&html);
    style_paragraphs(&html)
}

/// Whether `text` contains at least one markup tag.
pub fn has_markup(text: &str) -> bool {
    TAG_RE.is_match(text)
}

/// Pass 1: paragraphs for tag-free text.
///
/// Runs of dash-bullet lines stay bare so the list passes pick them up.
fn wrap_plain_blocks(raw: &str) -> String {
    if has_markup(raw) {
        return raw.to_string();
    }

    let normalized = raw.replace("\r\n", "\n");
    let mut blocks: Vec<String> = Vec::new();
    for block in BLANK_LINE_RE.split(&normalized) {
        let mut paragraph: Vec<&str> = Vec::new();
        for line in block.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if DASH_LINE_RE.is_match(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(trimmed.to_string());
            } else {
                paragraph.push(trimmed);
            }
        }
        flush_paragraph(&mut paragraph, &mut blocks);
    }
    blocks.join("\n")
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(format!("<p>{}</p>", paragraph.join("<br>\n")));
    paragraph.clear();
}

/// Passes 2 and 5: bold vocabulary matches in text outside bold elements.
fn bold_outside_strong(html: &str, vocabulary: &Regex) -> String {
    let mut out = String::with_capacity(html.len());
    let mut strong_depth = 0usize;
    let mut cursor = 0;

    for tag in TAG_RE.find_iter(html) {
        push_text(&mut out, &html[cursor..tag.start()], strong_depth, vocabulary);
        if let Some(caps) = STRONG_TAG_RE.captures(tag.as_str()) {
            if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
                strong_depth = strong_depth.saturating_sub(1);
            } else {
                strong_depth += 1;
            }
        }
        out.push_str(tag.as_str());
        cursor = tag.end();
    }
    push_text(&mut out, &html[cursor..], strong_depth, vocabulary);
    out
}

fn push_text(out: &mut String, text: &str, strong_depth: usize, vocabulary: &Regex) {
    if strong_depth > 0 {
        out.push_str(text);
    } else {
        out.push_str(&vocabulary.replace_all(text, "<strong>${0}</strong>"));
    }
}

/// Pass 3: semantic subtitle class on headings.
fn tag_headings(html: &str) -> String {
    rewrite_outside_comments(html, &HEADING_OPEN_RE, |caps| {
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        format!("<h{}{}>", &caps[1], with_class(attrs, SUBTITLE_CLASS))
    })
}

/// Pass 4: affirmation heading plus its section into a styled block.
fn wrap_affirmations(html: &str) -> String {
    let open = format!("<div class=\"{AFFIRMATION_BOX_CLASS}\">");
    let masked = mask_comments(html);
    let headings: Vec<_> = HEADING_RE.find_iter(&masked).map(|m| m.range()).collect();
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;

    for (index, heading) in headings.iter().enumerate() {
        let text = &html[heading.clone()];
        if heading.start < cursor || !is_affirmation_heading(text) {
            continue;
        }
        if inside_affirmation_box(&masked[..heading.start]) {
            continue;
        }

        let section_end = headings
            .get(index + 1)
            .map_or(html.len(), |next| next.start);
        out.push_str(&html[cursor..heading.start]);
        out.push_str(&open);
        out.push_str(&mark_affirmation_title(text));
        out.push_str(&html[heading.end..section_end]);
        out.push_str("</div>");
        cursor = section_end;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Whether the end of `prefix` sits inside an open affirmation box.
fn inside_affirmation_box(prefix: &str) -> bool {
    let mut divs: Vec<bool> = Vec::new();
    for tag in TAG_RE.find_iter(prefix) {
        match tag_name(tag.as_str()) {
            Some((name, false)) if name.eq_ignore_ascii_case("div") => {
                divs.push(has_class(tag.as_str(), AFFIRMATION_BOX_CLASS));
            }
            Some((name, true)) if name.eq_ignore_ascii_case("div") => {
                divs.pop();
            }
            _ => {}
        }
    }
    divs.contains(&true)
}

fn is_affirmation_heading(heading: &str) -> bool {
    let text = TAG_RE.replace_all(heading, "").to_lowercase();
    AFFIRMATION_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

fn mark_affirmation_title(heading: &str) -> String {
    HEADING_OPEN_RE
        .replacen(heading, 1, |caps: &Captures<'_>| {
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            format!("<h{}{}>", &caps[1], with_class(attrs, AFFIRMATION_TITLE_CLASS))
        })
        .into_owned()
}

/// Pass 6: bare `- item` lines into list items.
fn convert_dash_bullets(html: &str) -> String {
    let masked = mask_comments(html);
    let mut out = String::with_capacity(html.len());
    let mut li_depth = 0usize;

    for (line, visible) in html.split_inclusive('\n').zip(masked.split_inclusive('\n')) {
        let (body, ending) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        if li_depth == 0 && DASH_LINE_RE.is_match(visible.trim_end_matches('\n')) {
            if let Some(item) = dash_item(body) {
                out.push_str(&item);
                out.push_str(ending);
                continue;
            }
        }
        let opened = LI_OPEN_RE.find_iter(visible).count();
        let closed = LI_CLOSE_RE.find_iter(visible).count();
        li_depth = (li_depth + opened).saturating_sub(closed);
        out.push_str(line);
    }
    out
}

/// `- text</p>` becomes `<li>text</li></p>`; closers opened inside `text` stay.
fn dash_item(line: &str) -> Option<String> {
    let caps = DASH_LINE_RE.captures(line)?;
    let content = caps.get(1)?.as_str();
    let mut end = content.len();
    while let Some(closer) = TRAILING_CLOSE_RE.captures(&content[..end]) {
        let start = closer.get(0)?.start();
        let before = content[..start].trim_end();
        if before.is_empty() {
            return None;
        }
        if open_depth(before, &[&closer[1]]) > 0 {
            break;
        }
        end = before.len();
    }
    Some(format!("<li>{}</li>{}", &content[..end], &content[end..]))
}

/// Pass 7: adjacent loose list items into one `<ul>`.
fn group_list_items(html: &str) -> String {
    let masked = mask_comments(html);
    let items: Vec<_> = LI_ELEMENT_RE.find_iter(&masked).collect();
    let mut out = String::with_capacity(html.len() + 16);
    let mut cursor = 0;
    let mut index = 0;

    while index < items.len() {
        let first = items[index];
        if open_depth(&masked[..first.start()], &["ul", "ol"]) > 0 {
            index += 1;
            continue;
        }

        let mut last = index;
        while last + 1 < items.len()
            && html[items[last].end()..items[last + 1].start()]
                .trim()
                .is_empty()
        {
            last += 1;
        }

        out.push_str(&html[cursor..first.start()]);
        out.push_str("<ul>");
        out.push_str(&html[first.start()..items[last].end()]);
        out.push_str("</ul>");
        cursor = items[last].end();
        index = last + 1;
    }
    out.push_str(&html[cursor..]);
    out
}


/// Pass 8: default spacing on unstyled paragraphs.
fn style_paragraphs(html: &str) -> String {
    rewrite_outside_comments(html, &P_OPEN_RE, |caps| {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        if STYLE_OR_CLASS_RE.is_match(attrs) {
            format!("<p{attrs}>")
        } else {
            format!("<p{attrs} style=\"{PARAGRAPH_STYLE}\">")
        }
    })
}

/// Copy of `html` with comment bodies blanked; byte offsets and line breaks
/// are preserved so matches index back into the original.
fn mask_comments(html: &str) -> String {
    let mut masked = String::with_capacity(html.len());
    let mut cursor = 0;
    for tag in TAG_RE.find_iter(html) {
        if !tag.as_str().starts_with("<!--") {
            continue;
        }
        masked.push_str(&html[cursor..tag.start()]);
        for ch in tag.as_str().chars() {
            if ch == '\n' {
                masked.push('\n');
            } else {
                masked.extend(iter::repeat(' ').take(ch.len_utf8()));
            }
        }
        cursor = tag.end();
    }
    masked.push_str(&html[cursor..]);
    masked
}

/// `Regex::replace_all` that leaves comment bodies alone.
fn rewrite_outside_comments(
    html: &str,
    pattern: &Regex,
    rewrite: impl Fn(&Captures<'_>) -> String,
) -> String {
    let masked = mask_comments(html);
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for caps in pattern.captures_iter(&masked) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&html[cursor..whole.start()]);
        out.push_str(&rewrite(&caps));
        cursor = whole.end();
    }
    out.push_str(&html[cursor..]);
    out
}

/// Name of a start or end tag and whether it closes.
fn tag_name(tag: &str) -> Option<(&str, bool)> {
    let caps = TAG_NAME_RE.captures(tag)?;
    let closing = caps.get(1).is_some_and(|slash| !slash.as_str().is_empty());
    Some((caps.get(2)?.as_str(), closing))
}

/// Elements named in `names` left open at the end of `html`.
fn open_depth(html: &str, names: &[&str]) -> usize {
    let mut depth = 0usize;
    for tag in TAG_RE.find_iter(html) {
        match tag_name(tag.as_str()) {
            Some((name, closing)) if names.iter().any(|n| n.eq_ignore_ascii_case(name)) => {
                depth = if closing { depth.saturating_sub(1) } else { depth + 1 };
            }
            _ => {}
        }
    }
    depth
}

fn has_class(attrs: &str, class: &str) -> bool {
    CLASS_ATTR_RE
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .is_some_and(|value| value.as_str().split_whitespace().any(|existing| existing == class))
}

/// Adds `class` to an attribute string unless it is already listed.
fn with_class(attrs: &str, class: &str) -> String {
    let Some(caps) = CLASS_ATTR_RE.captures(attrs) else {
        return format!("{attrs} class=\"{class}\"");
    };
    let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
        return attrs.to_string();
    };
    if value.as_str().split_whitespace().any(|existing| existing == class) {
        return attrs.to_string();
    }

    let separator = if value.as_str().trim().is_empty() { "" } else { " " };
    format!(
        "{}{}{}{}",
        &attrs[..value.end()],
        separator,
        class,
        &attrs[value.end()..]
    )
}

fn vocabulary_regex(words: &[&str]) -> Regex {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by_key(|word| std::cmp::Reverse(word.chars().count()));
    let alternation = sorted
        .iter()
        .map(|word| regex::escape(word).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid vocabulary regex")
}
