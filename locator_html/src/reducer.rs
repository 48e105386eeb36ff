//! Structural reduction and the configurable reducer.

use crate::prepass::text_prepass;
use lol_html::errors::RewritingError;
use lol_html::{doc_comments, element, rewrite_str, RewriteStrSettings};
use std::path::{Path, PathBuf};

/// `rel` values that mark a `<link>` as non-structural.
const DROPPED_LINK_RELS: &[&str] = &["stylesheet", "preload", "manifest", "icon"];

/// Upper bound on structural passes; malformed markup can expose new nodes per pass.
const MAX_STRUCTURAL_PASSES: usize = 4;

/// Attributes removed from every element.
const DROPPED_ATTRIBUTES: &[&str] = &["style", "rel", "hreflang"];

/// Options for [`SnapshotReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducerOptions {
    /// Run the text pre-pass before parsing.
    pub text_prepass: bool,
    /// Write every reduced snapshot into this directory.
    pub dump_dir: Option<PathBuf>,
}

impl Default for ReducerOptions {
    fn default() -> Self {
        Self {
            text_prepass: true,
            dump_dir: None,
        }
    }
}

impl ReducerOptions {
    /// Enable or disable the text pre-pass.
    pub fn with_text_prepass(mut self, enabled: bool) -> Self {
        self.text_prepass = enabled;
        self
    }

    /// Dump reduced snapshots into `dir`.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }
}

/// Strips a page snapshot to its structurally relevant markup.
///
/// # Example
/// ```
/// use locator_html::SnapshotReducer;
///
/// let reducer = SnapshotReducer::default();
/// let reduced = reducer.reduce(r#"<script>track()</script><input id="user-name" style="x">"#);
/// assert_eq!(reduced, r#"<input id="user-name">"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotReducer {
    options: ReducerOptions,
}

impl SnapshotReducer {
    /// Create a reducer with the given options.
    pub fn new(options: ReducerOptions) -> Self {
        Self { options }
    }

    /// The active options.
    pub fn options(&self) -> &ReducerOptions {
        &self.options
    }

    /// Reduce a raw snapshot.
    pub fn reduce(&self, html: &str) -> String {
        let prepassed = if self.options.text_prepass {
            text_prepass(html).into_owned()
        } else {
            html.to_string()
        };

        let structural = structural_fixpoint(&prepassed);
        let reduced = fail_open(prepassed, structural);

        if let Some(dir) = &self.options.dump_dir {
            dump_snapshot(dir, &reduced);
        }

        log::debug!(
            "reduced snapshot from {} to {} bytes",
            html.len(),
            reduced.len()
        );

        reduced
    }
}

/// Reduce with default options.
#[inline]
pub fn reduce_snapshot(html: &str) -> String {
    SnapshotReducer::default().reduce(html)
}

/// Parse `html` and drop non-structural nodes and attributes.
pub fn structural_pass(html: &str) -> Result<String, RewritingError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("style", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("noscript", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("meta", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("svg", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("path", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("link", |el| {
                    if let Some(rel) = el.get_attribute("rel") {
                        let rel = rel.to_ascii_lowercase();
                        if rel
                            .split_ascii_whitespace()
                            .any(|r| DROPPED_LINK_RELS.contains(&r))
                        {
                            el.remove();
                        }
                    }
                    Ok(())
                }),
                element!("img", |el| {
                    if let Some(src) = el.get_attribute("src") {
                        if src.trim_start().starts_with("data:image") {
                            el.remove();
                        }
                    }
                    Ok(())
                }),
                element!("*", |el| {
                    let to_remove: Vec<String> = el
                        .attributes()
                        .iter()
                        .filter(|attr| {
                            let name = attr.name();
                            DROPPED_ATTRIBUTES.contains(&name.as_str())
                                || name.starts_with("data-")
                                || attr.value().trim_start().starts_with("data:")
                        })
                        .map(|attr| attr.name())
                        .collect();

                    for attr in to_remove {
                        el.remove_attribute(&attr);
                    }
                    Ok(())
                }),
            ],
            document_content_handlers: vec![doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
}

/// Repeat [`structural_pass`] until the output stops changing.
fn structural_fixpoint(html: &str) -> Result<String, RewritingError> {
    let mut current = structural_pass(html)?;

    for _ in 1..MAX_STRUCTURAL_PASSES {
        let next = structural_pass(&current)?;
        if next == current {
            break;
        }
        current = next;
    }

    Ok(current)
}

/// Keep the pre-pass text when the structural pass could not run.
fn fail_open<E: std::fmt::Display>(prepassed: String, structural: Result<String, E>) -> String {
    match structural {
        Ok(reduced) => reduced,
        Err(e) => {
            log::warn!("structural reduction failed, using pre-pass output: {}", e);
            prepassed
        }
    }
}

fn dump_snapshot(dir: &Path, reduced: &str) {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = dir.join(format!("cleaned_html_{}.html", millis));

    let written = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, reduced));

    match written {
        Ok(()) => log::debug!("reduced snapshot written to {}", path.display()),
        Err(e) => log::warn!("could not write reduced snapshot to {}: {}", path.display(), e),
    }
}
