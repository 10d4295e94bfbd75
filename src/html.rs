//! Regex-based HTML structural cleanup and link absolutization (spec
//! component C2). Deliberately does not depend on a DOM parser: the
//! contract is an exact, ordered set of tag/attribute removals, not a
//! reparse-and-reserialize round trip (§9 — a real parser may be used
//! internally as long as the removal contract is preserved exactly; this
//! module sticks to `regex`, the simpler and more literal way to honor it).

use regex::{Captures, Regex};
use std::sync::OnceLock;
use url::Url;

macro_rules! lazy_regex {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pat).unwrap())
        }
    };
}

lazy_regex!(comments_re, r"(?s)<!--.*?-->");
lazy_regex!(
    wrapper_tags_re,
    r"(?is)<(script|style|noscript|svg)\b[^>]*>.*?</\s*\1\s*>"
);
lazy_regex!(void_tags_re, r"(?is)<(meta|link)\b[^>]*/?>");
lazy_regex!(
    strip_attrs_re,
    r#"(?is)\s(?:style|class|id|data-[\w-]+|on\w+|role|aria-[\w-]+)\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#
);
lazy_regex!(whitespace_run_re, r"[ \t\r\n]{2,}");
lazy_regex!(tag_gap_re, r">\s+<");

/// Structural cleanup: strips comments, `<script>`/`<style>`/`<noscript>`/
/// `<svg>` (tag and contents), void `<meta>`/`<link>` tags, the listed
/// attributes, then collapses whitespace. Idempotent.
pub fn clean(html: &str) -> String {
    let mut out = comments_re().replace_all(html, "").into_owned();
    out = wrapper_tags_re().replace_all(&out, "").into_owned();
    out = void_tags_re().replace_all(&out, "").into_owned();
    out = strip_attrs_re().replace_all(&out, "").into_owned();
    out = whitespace_run_re().replace_all(&out, " ").into_owned();
    out = tag_gap_re().replace_all(&out, "><").into_owned();
    out
}

lazy_regex!(
    href_src_re,
    r#"(?is)\b(href|src)\s*=\s*("[^"]*"|'[^']*')"#
);

fn is_excluded(attr: &str, value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with('#')
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
    {
        return true;
    }
    attr.eq_ignore_ascii_case("src") && lower.starts_with("data:")
}

/// Rewrites relative `href=`/`src=` values to absolute URLs against
/// `base`. Values that are already absolute-ish (scheme-relative,
/// fragment, `mailto:`, `tel:`, and `data:` for `src`) are left untouched,
/// as are values that fail to resolve against `base`. Idempotent (an
/// already-absolute value is always excluded from rewriting).
pub fn absolutize(html: &str, base: &str) -> String {
    let base_url = match Url::parse(base) {
        Ok(u) => u,
        Err(_) => return html.to_string(),
    };

    href_src_re()
        .replace_all(html, |caps: &Captures| {
            let attr = &caps[1];
            let quoted = &caps[2];
            let (quote, inner) = match quoted.chars().next() {
                Some(c @ ('"' | '\'')) => (c, &quoted[1..quoted.len() - 1]),
                _ => ('"', quoted),
            };

            if is_excluded(attr, inner) {
                return caps[0].to_string();
            }

            match base_url.join(inner) {
                Ok(joined) => format!("{}={}{}{}", attr, quote, joined, quote),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// `absolutize(clean(raw), current_url)` when cleanup is requested, else
/// `absolutize(raw, current_url)`.
pub fn process(raw: &str, current_url: &str, remove_unnecessary_html: bool) -> String {
    if remove_unnecessary_html {
        absolutize(&clean(raw), current_url)
    } else {
        absolutize(raw, current_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_comments_and_wrapper_tags() {
        let html = "<div><!-- hi --><script>alert(1)</script><style>.a{}</style><p>text</p></div>";
        let out = clean(html);
        assert!(!out.contains("<!--"));
        assert!(!out.contains("<script"));
        assert!(!out.contains("<style"));
        assert!(out.contains("<p>text</p>"));
    }

    #[test]
    fn clean_strips_void_tags_and_attrs() {
        let html = r#"<head><meta charset="utf-8"><link rel="stylesheet" href="a.css"></head><div class="x" id="y" data-foo="1" onclick="go()" role="button" aria-hidden="true">hi</div>"#;
        let out = clean(html);
        assert!(!out.contains("<meta"));
        assert!(!out.contains("<link"));
        assert!(!out.contains("class="));
        assert!(!out.contains("id="));
        assert!(!out.contains("data-foo"));
        assert!(!out.contains("onclick"));
        assert!(!out.contains("role="));
        assert!(!out.contains("aria-hidden"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn clean_collapses_whitespace_between_tags() {
        let out = clean("<div>\n   <p>x</p>   \n</div>");
        assert!(!out.contains(">   <"));
    }

    #[test]
    fn clean_is_idempotent() {
        let html = r#"<div class="x"><script>a()</script><p>hi</p></div>"#;
        let once = clean(html);
        let twice = clean(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn absolutize_rewrites_relative_href_and_src() {
        let html = r#"<a href="/page">link</a><img src="img.png">"#;
        let out = absolutize(html, "https://example.com/dir/page.html");
        assert!(out.contains(r#"href="https://example.com/page""#));
        assert!(out.contains(r#"src="https://example.com/dir/img.png""#));
    }

    #[test]
    fn absolutize_leaves_excluded_schemes_alone() {
        let html = r#"<a href="https://other.com/x">a</a><a href="#frag">b</a><a href="mailto:me@x.com">c</a><a href="tel:123">d</a><img src="data:image/png;base64,AAAA">"#;
        let out = absolutize(html, "https://example.com/");
        assert_eq!(html, out);
    }

    #[test]
    fn absolutize_is_idempotent() {
        let html = r#"<a href="/page">link</a>"#;
        let once = absolutize(html, "https://example.com/dir/");
        let twice = absolutize(&once, "https://example.com/dir/");
        assert_eq!(once, twice);
    }

    #[test]
    fn process_composes_clean_then_absolutize() {
        let html = r#"<div class="x"><a href="/p">x</a></div>"#;
        let out = process(html, "https://example.com/", true);
        assert!(!out.contains("class="));
        assert!(out.contains(r#"href="https://example.com/p""#));

        let out_noclean = process(html, "https://example.com/", false);
        assert!(out_noclean.contains("class="));
        assert!(out_noclean.contains(r#"href="https://example.com/p""#));
    }
}
