//! Text-level pre-pass.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref COMMENTS: Regex = Regex::new(r"<!--[\s\S]*?-->").unwrap();
    static ref REACT_ATTRS: Regex = Regex::new(r#"\sdata-react\S+=".*?""#).unwrap();
}

/// Remove HTML comments and `data-react*` attributes by pattern.
///
/// Runs before parsing so very large framework payloads never reach the
/// rewriter. Returns the input borrowed when nothing matched.
pub fn text_prepass(html: &str) -> Cow<'_, str> {
    let without_comments = COMMENTS.replace_all(html, "");

    let stripped = match REACT_ATTRS.replace_all(&without_comments, "") {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    };

    match stripped {
        Some(s) => Cow::Owned(s),
        None => without_comments,
    }
}
