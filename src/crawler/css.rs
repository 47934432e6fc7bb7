//! CSS extractor
//!
//! Walks a stylesheet's token tree and collects every `url()` reference that
//! appears in a declaration value. References in at-rule preludes, such as
//! `@import url(...)`, are not declarations and are left alone.

use crate::crawler::events::Enqueue;
use crate::state::ResourceKind;
use crate::url::AdmissionFilter;
use cssparser::{ParseError, Parser, ParserInput, Token};

/// Collects the raw `url()` references used in declarations, in source order
///
/// Both `url(a.png)` and `url("a.png")` forms are recognized, including
/// inside other functions such as `image-set()`.
///
/// # Example
///
/// ```
/// use site_mirror::crawler::collect_css_references;
///
/// let css = r#"@import url(base.css); body { background: url("/img/bg.png") }"#;
/// assert_eq!(collect_css_references(css), vec!["/img/bg.png".to_string()]);
/// ```
pub fn collect_css_references(css: &str) -> Vec<String> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut urls = Vec::new();
    walk(&mut parser, false, false, &mut urls);
    urls
}

/// `in_block`: inside `{}`, where `:` starts a declaration value.
/// `in_value`: between a declaration's `:` and its terminating `;`.
fn walk<'i, 't>(
    parser: &mut Parser<'i, 't>,
    in_block: bool,
    mut in_value: bool,
    urls: &mut Vec<String>,
) {
    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::Colon if in_block => in_value = true,
            Token::Semicolon => in_value = false,
            Token::UnquotedUrl(url) => {
                if in_value {
                    urls.push(String::from(&*url));
                }
            }
            Token::Function(name) => {
                let is_url = name.eq_ignore_ascii_case("url");
                let _ = parser.parse_nested_block(|nested| {
                    if is_url {
                        read_quoted_url(nested, in_value, urls);
                    } else {
                        walk(nested, in_block, in_value, urls);
                    }
                    Ok::<(), ParseError<'i, ()>>(())
                });
            }
            Token::ParenthesisBlock | Token::SquareBracketBlock => {
                let _ = parser.parse_nested_block(|nested| {
                    walk(nested, in_block, in_value, urls);
                    Ok::<(), ParseError<'i, ()>>(())
                });
            }
            Token::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(|nested| {
                    walk(nested, true, false, urls);
                    Ok::<(), ParseError<'i, ()>>(())
                });
                in_value = false;
            }
            _ => {}
        }
    }
}

fn read_quoted_url(parser: &mut Parser<'_, '_>, in_value: bool, urls: &mut Vec<String>) {
    if let Ok(Token::QuotedString(url)) = parser.next() {
        if in_value {
            urls.push(String::from(&**url));
        }
    }
}

/// Parses a stylesheet, admits its references and enqueues the accepted ones as `other`
///
/// Returns the number of references enqueued.
pub fn extract_css(css: &str, filter: &AdmissionFilter, sink: &dyn Enqueue) -> usize {
    let mut enqueued = 0;
    for reference in collect_css_references(css) {
        if let Some(canonical) = filter.accepted(&reference) {
            tracing::trace!("Discovered {} from stylesheet", canonical);
            sink.enqueue(canonical, ResourceKind::Other);
            enqueued += 1;
        }
    }
    enqueued
}
