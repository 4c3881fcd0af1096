//! Robots.txt parser implementation
//!
//! Directive matching is delegated to the robotstxt crate (a port of Google's
//! matcher). This module adds the up-front validation that decides whether a
//! fetched body is a robots.txt at all.

use crate::robots::PolicyError;
use robotstxt::DefaultMatcher;

/// A validated robots.txt document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    /// Validates a fetched robots.txt body
    ///
    /// Every non-blank line, once `#` comments are removed, must look like
    /// `field: value`. Unknown fields (`Sitemap`, `Host`, ...) are accepted;
    /// lines that are not directives at all (HTML error pages, prose) are not.
    /// A blank or comment-only file is a valid, permissive policy.
    ///
    /// # Errors
    ///
    /// * `PolicyError::Encoding` - The body is not UTF-8
    /// * `PolicyError::Malformed` - A line is not a directive
    pub fn parse(body: &[u8]) -> Result<Self, PolicyError> {
        let content = std::str::from_utf8(body).map_err(|_| PolicyError::Encoding)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        for (index, line) in content.lines().enumerate() {
            let directive = strip_comment(line).trim();
            if directive.is_empty() {
                continue;
            }

            let is_directive = directive
                .split_once(':')
                .map(|(field, _)| is_field_name(field.trim()))
                .unwrap_or(false);

            if !is_directive {
                return Err(PolicyError::Malformed {
                    line: index + 1,
                    text: truncate(directive, 80),
                });
            }
        }

        Ok(Self {
            content: content.to_string(),
        })
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The full URL (or path) to check
    /// * `user_agent` - The user agent token; `"*"` evaluates the global group
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay declared for the `*` group
    ///
    /// Consecutive `User-agent` lines form one group; the first
    /// `Crawl-delay` of a group containing `*` is returned.
    pub fn crawl_delay(&self) -> Option<f64> {
        let mut wildcard_group = false;
        let mut in_agent_lines = false;

        for line in self.content.lines() {
            let Some((field, value)) = strip_comment(line).split_once(':') else {
                continue;
            };
            let field = field.trim().to_ascii_lowercase();
            let value = value.trim();

            if field == "user-agent" {
                if !in_agent_lines {
                    wildcard_group = false;
                }
                wildcard_group |= value == "*";
                in_agent_lines = true;
                continue;
            }
            in_agent_lines = false;

            if wildcard_group && field == "crawl-delay" {
                if let Ok(delay) = value.parse::<f64>() {
                    return Some(delay);
                }
            }
        }

        None
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn is_field_name(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((pos, _)) => format!("{}...", &text[..pos]),
        None => text.to_string(),
    }
}
