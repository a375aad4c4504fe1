// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Pulls dependency versions out of manifest text.
//!
//! Patterns are compiled once per chain. Extraction is total: a term that
//! does not occur in the text yields an empty value rather than an error.

use regex::Regex;
use serde::Serialize;

use crate::config::ExtractionPolicy;

/// Value captured for a single search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct TermMatch
{
    /// Search term as configured.
    pub term:  String,
    /// Token following the term, or an empty string when absent.
    pub value: String,
}

/// Outcome of applying a [`TermExtractor`] to manifest text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub enum Extraction
{
    /// One entry per configured term, in configured order.
    Tokens(Vec<TermMatch,>,),
    /// Lines matching any term, in document order.
    Lines(Vec<String,>,),
    /// Whole document, produced by the line policy when no terms are set.
    Document(String,),
}

impl Extraction
{
    /// Returns the extracted value for `term`, if this is a token
    /// extraction that contains it.
    pub fn value_of(&self, term: &str,) -> Option<&str,>
    {
        match self {
            Self::Tokens(matches,) => matches
                .iter()
                .find(|candidate| candidate.term == term,)
                .map(|candidate| candidate.value.as_str(),),
            Self::Lines(_,) | Self::Document(_,) => None,
        }
    }
}

/// Drops lines whose trimmed form starts with a comment marker.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct CommentFilter
{
    marker: String,
}

impl CommentFilter
{
    /// Creates a filter for the given marker. Blank markers disable
    /// filtering.
    pub fn new(marker: &str,) -> Option<Self,>
    {
        let marker = marker.trim();
        if marker.is_empty() {
            return None;
        }
        Some(Self {
            marker: marker.to_owned(),
        },)
    }

    fn is_comment(&self, line: &str,) -> bool
    {
        line.trim().starts_with(&self.marker,)
    }
}

/// Precompiled search terms for one chain.
#[derive(Debug, Clone,)]
pub struct TermExtractor
{
    policy:   ExtractionPolicy,
    patterns: Vec<(String, Option<Regex,>,),>,
    comments: Option<CommentFilter,>,
}

impl TermExtractor
{
    /// Compiles the patterns for `terms` under `policy`.
    ///
    /// The token policy matches each term literally followed by whitespace
    /// and captures the next run of non-whitespace characters. The line
    /// policy treats each term as a regular expression and falls back to a
    /// literal match when the term is not a valid pattern. `comments` only
    /// affects the line policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainver::{Extraction, ExtractionPolicy, TermExtractor, TermMatch};
    ///
    /// let extractor = TermExtractor::new(ExtractionPolicy::Token, &["foo".to_owned()], None,);
    /// assert_eq!(
    ///     extractor.extract("foo v1.2.3 bar",),
    ///     Extraction::Tokens(vec![TermMatch {
    ///         term:  "foo".to_owned(),
    ///         value: "v1.2.3".to_owned(),
    ///     }])
    /// );
    /// ```
    pub fn new(
        policy: ExtractionPolicy,
        terms: &[String],
        comments: Option<CommentFilter,>,
    ) -> Self
    {
        let patterns = terms
            .iter()
            .map(|term| {
                let pattern = match policy {
                    ExtractionPolicy::Token => token_pattern(term,),
                    ExtractionPolicy::Lines => line_pattern(term,),
                };
                (term.clone(), pattern,)
            },)
            .collect();

        Self {
            policy,
            patterns,
            comments,
        }
    }

    /// Applies the compiled patterns to `content`.
    pub fn extract(&self, content: &str,) -> Extraction
    {
        match self.policy {
            ExtractionPolicy::Token => Extraction::Tokens(self.extract_tokens(content,),),
            ExtractionPolicy::Lines if self.patterns.is_empty() => {
                Extraction::Document(content.to_owned(),)
            }
            ExtractionPolicy::Lines => Extraction::Lines(self.extract_lines(content,),),
        }
    }

    fn extract_tokens(&self, content: &str,) -> Vec<TermMatch,>
    {
        self.patterns
            .iter()
            .map(|(term, pattern,)| {
                let value = pattern
                    .as_ref()
                    .and_then(|regex| regex.captures(content,),)
                    .and_then(|captures| captures.get(1,),)
                    .map_or_else(String::new, |capture| capture.as_str().to_owned(),);
                TermMatch {
                    term: term.clone(),
                    value,
                }
            },)
            .collect()
    }

    fn extract_lines(&self, content: &str,) -> Vec<String,>
    {
        content
            .split('\n',)
            .filter(|line| {
                self.patterns
                    .iter()
                    .any(|(_, pattern,)| pattern.as_ref().is_some_and(|regex| regex.is_match(line,),),)
            },)
            .filter(|line| !self.comments.as_ref().is_some_and(|filter| filter.is_comment(line,),),)
            .map(str::to_owned,)
            .collect()
    }
}

fn token_pattern(term: &str,) -> Option<Regex,>
{
    Regex::new(&format!(r"{}\s+(\S+)", regex::escape(term,)),).ok()
}

fn line_pattern(term: &str,) -> Option<Regex,>
{
    Regex::new(term,).or_else(|_| Regex::new(&regex::escape(term,),),).ok()
}
