use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::domain::ticket::TicketId;
use crate::error::{AppError, AppResult};

pub const DEFAULT_TICKET_PATTERN: &str = r"/([A-Z][A-Z0-9]+-\d+)/";

/// Configured ticket-key pattern.
///
/// Accepts either a `/source/flags` literal or a bare expression. Matching is
/// always find-all, whatever flags were supplied.
#[derive(Debug, Clone)]
pub struct TicketPattern {
    regex: Regex,
}

impl TicketPattern {
    pub fn parse(input: &str) -> AppResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::Extraction("pattern must not be empty".to_string()));
        }

        let (source, flags) = split_literal(trimmed);
        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                // find-all is forced and the regex crate is always unicode-aware
                'g' | 'u' | 'y' => &mut builder,
                other => {
                    return Err(AppError::Extraction(format!(
                        "unsupported flag '{other}' in {trimmed}"
                    )));
                }
            };
        }

        let regex = builder
            .build()
            .map_err(|err| AppError::Extraction(format!("{trimmed}: {err}")))?;

        Ok(Self { regex })
    }

    /// Every distinct ticket key in `text`, in order of first occurrence.
    pub fn extract(&self, text: &str) -> Vec<TicketId> {
        let has_group = self.regex.captures_len() > 1;
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for captures in self.regex.captures_iter(text) {
            let matched = if has_group {
                captures.get(1).or_else(|| captures.get(0))
            } else {
                captures.get(0)
            };
            let Some(matched) = matched else {
                continue;
            };

            let id = TicketId::new(matched.as_str());
            if !id.is_empty() && seen.insert(id.clone()) {
                ids.push(id);
            }
        }

        ids
    }
}

fn split_literal(input: &str) -> (&str, &str) {
    if let Some(rest) = input.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            return (&rest[..end], &rest[end + 1..]);
        }
    }
    (input, "")
}
