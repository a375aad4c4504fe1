// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Summary rendering for processed chains.
///
/// The token policy produces a fixed-column table serialized as a
/// GitHub-flavored markdown pipe table or as aligned plain text. The line
/// policy produces an excerpts report listing matched manifest lines.
use std::fmt::Write as _;

use clap::ValueEnum;

use crate::{config::ExtractionPolicy, error::Error, extract::Extraction, pipeline::ChainReport};

/// Header of the first column.
pub const LABEL_HEADER: &str = "repo - release_version";
/// Header of the optional market capitalization column.
pub const MARKET_CAP_HEADER: &str = "market_cap";

/// Serialization used for the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum,)]
pub enum OutputFormat
{
    /// GitHub-flavored markdown pipe table.
    #[default]
    Markdown,
    /// Whitespace-aligned columns.
    Plain,
    /// Processed chains as a pretty-printed JSON array.
    Json,
}

/// Fixed-width table with one row per processed chain.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Table
{
    header: Vec<String,>,
    rows:   Vec<Vec<String,>,>,
}

impl Table
{
    /// Builds the table from processed chains in the given order.
    ///
    /// Term columns follow the first-seen order of search terms across all
    /// reports. Cells for terms a chain does not search are left empty.
    pub fn from_reports(reports: &[ChainReport], include_market_cap: bool,) -> Self
    {
        let mut terms: Vec<&str,> = Vec::new();
        for report in reports {
            for term in &report.search {
                if !terms.contains(&term.as_str(),) {
                    terms.push(term.as_str(),);
                }
            }
        }

        let mut header = Vec::with_capacity(terms.len() + 2,);
        header.push(LABEL_HEADER.to_owned(),);
        if include_market_cap {
            header.push(MARKET_CAP_HEADER.to_owned(),);
        }
        header.extend(terms.iter().map(|term| (*term).to_owned(),),);

        let rows = reports
            .iter()
            .map(|report| {
                let mut row = Vec::with_capacity(header.len(),);
                row.push(format!("{} - {}", report.repository, report.version),);
                if include_market_cap {
                    row.push(report.market_cap.map(|cap| cap.to_string(),).unwrap_or_default(),);
                }
                row.extend(terms.iter().map(|term| {
                    report.extraction.value_of(term,).unwrap_or_default().to_owned()
                },),);
                row
            },)
            .collect();

        Self {
            header,
            rows,
        }
    }

    /// Header cells: label, optional market cap, then term columns.
    pub fn header(&self,) -> &[String]
    {
        &self.header
    }

    /// Body rows in processing order, each as wide as the header.
    pub fn rows(&self,) -> &[Vec<String,>]
    {
        &self.rows
    }

    /// Serializes the table as a markdown pipe table.
    ///
    /// The separator under each header contains exactly as many dashes as
    /// the header has characters.
    pub fn to_markdown(&self,) -> String
    {
        let mut output = String::new();
        push_markdown_row(&mut output, &self.header,);

        let separator: Vec<String,> =
            self.header.iter().map(|cell| "-".repeat(cell.chars().count(),),).collect();
        push_markdown_row(&mut output, &separator,);

        for row in &self.rows {
            push_markdown_row(&mut output, row,);
        }
        output
    }

    /// Serializes the table as whitespace-aligned columns.
    pub fn to_plain(&self,) -> String
    {
        let widths: Vec<usize,> = (0..self.header.len())
            .map(|column| {
                std::iter::once(&self.header,)
                    .chain(self.rows.iter(),)
                    .map(|row| row[column].chars().count(),)
                    .max()
                    .unwrap_or_default()
            },)
            .collect();

        let mut output = String::new();
        push_plain_row(&mut output, &self.header, &widths,);
        let rule: Vec<String,> = widths.iter().map(|width| "-".repeat(*width,),).collect();
        push_plain_row(&mut output, &rule, &widths,);
        for row in &self.rows {
            push_plain_row(&mut output, row, &widths,);
        }
        output
    }
}

fn push_markdown_row(output: &mut String, cells: &[String],)
{
    output.push('|',);
    for cell in cells {
        output.push(' ',);
        output.push_str(&cell.replace('|', "\\|",),);
        output.push_str(" |",);
    }
    output.push('\n',);
}

fn push_plain_row(output: &mut String, cells: &[String], widths: &[usize],)
{
    let mut line = String::new();
    for (index, (cell, width,),) in cells.iter().zip(widths.iter().copied(),).enumerate() {
        if index > 0 {
            line.push_str("  ",);
        }
        let _ = write!(line, "{cell:<width$}");
    }
    output.push_str(line.trim_end(),);
    output.push('\n',);
}

/// Lists matched manifest lines per chain.
///
/// Chains whose terms matched nothing are omitted. Chains without terms
/// print the whole manifest.
pub fn render_excerpts(reports: &[ChainReport],) -> String
{
    let mut output = String::new();
    for report in reports {
        match &report.extraction {
            Extraction::Lines(lines,) if lines.is_empty() => {}
            Extraction::Lines(lines,) => {
                let _ = writeln!(
                    output,
                    "Contents of {} in {} at version {} containing any of {}:",
                    report.manifest_path,
                    report.repository,
                    report.version,
                    quoted_list(&report.search,)
                );
                for line in lines {
                    let _ = writeln!(output, "    {line}");
                }
            }
            Extraction::Document(text,) => {
                let _ = writeln!(
                    output,
                    "Contents of {} in {} at version {}:\n{}",
                    report.manifest_path, report.repository, report.version, text
                );
            }
            Extraction::Tokens(matches,) => {
                let _ = writeln!(
                    output,
                    "Contents of {} in {} at version {}:",
                    report.manifest_path, report.repository, report.version
                );
                for found in matches {
                    let _ = writeln!(output, "    {} {}", found.term, found.value);
                }
            }
        }
    }
    output
}

/// Formats terms as a bracketed list of single-quoted items.
fn quoted_list(terms: &[String],) -> String
{
    let items: Vec<String,> = terms.iter().map(|term| format!("'{term}'"),).collect();
    format!("[{}]", items.join(", "))
}

/// Renders processed chains for `policy` in `format`.
///
/// JSON output serializes the reports under either policy. Otherwise the
/// line policy yields the excerpts report and the token policy yields the
/// table in the requested layout.
///
/// # Errors
///
/// Returns [`Error::Serialize`] when JSON serialization fails.
pub fn render_report(
    reports: &[ChainReport],
    policy: ExtractionPolicy,
    format: OutputFormat,
    include_market_cap: bool,
) -> Result<String, Error,>
{
    let rendered = match (format, policy,) {
        (OutputFormat::Json, _,) => {
            let mut json = serde_json::to_string_pretty(reports,)?;
            json.push('\n',);
            json
        }
        (_, ExtractionPolicy::Lines,) => render_excerpts(reports,),
        (OutputFormat::Markdown, ExtractionPolicy::Token,) => {
            Table::from_reports(reports, include_market_cap,).to_markdown()
        }
        (OutputFormat::Plain, ExtractionPolicy::Token,) => {
            Table::from_reports(reports, include_market_cap,).to_plain()
        }
    };
    Ok(rendered,)
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;
    use crate::{
        extract::TermMatch,
        market::MarketCap,
    };

    fn report(repository: &str, version: &str, values: &[(&str, &str,)], cap: Option<MarketCap,>,) -> ChainReport
    {
        ChainReport {
            repository:    repository.to_owned(),
            manifest_path: "go.mod".to_owned(),
            version:       version.to_owned(),
            search:        values.iter().map(|(term, _,)| (*term).to_owned(),).collect(),
            market_cap:    cap,
            extraction:    Extraction::Tokens(
                values
                    .iter()
                    .map(|(term, value,)| TermMatch {
                        term:  (*term).to_owned(),
                        value: (*value).to_owned(),
                    },)
                    .collect(),
            ),
        }
    }

    fn parse_markdown_header(markdown: &str,) -> Vec<String,>
    {
        let first = markdown.lines().next().unwrap_or_default();
        first
            .trim()
            .trim_start_matches('|',)
            .trim_end_matches('|',)
            .split(" | ",)
            .map(|cell| cell.trim().to_owned(),)
            .collect()
    }

    #[test]
    fn markdown_table_matches_expected_layout()
    {
        let reports = vec![
            report("cosmos/gaia", "v18.1.0", &[("cosmos-sdk", "v0.50.6",)], Some(MarketCap::Usd(1234567.8,),),),
            report("osmosis-labs/osmosis", "v25.0.0", &[("cosmos-sdk", "v0.47.5",)], Some(MarketCap::Unavailable,),),
        ];

        let markdown = Table::from_reports(&reports, true,).to_markdown();
        let expected = "\
| repo - release_version | market_cap | cosmos-sdk |
| ---------------------- | ---------- | ---------- |
| cosmos/gaia - v18.1.0 | $1,234,567.80 | v0.50.6 |
| osmosis-labs/osmosis - v25.0.0 | Error | v0.47.5 |
";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn market_cap_column_is_optional()
    {
        let reports = vec![report("cosmos/gaia", "v18.1.0", &[("cosmos-sdk", "v0.50.6",)], None,)];
        let table = Table::from_reports(&reports, false,);

        assert_eq!(table.header(), ["repo - release_version", "cosmos-sdk"]);
        assert_eq!(table.rows()[0], vec!["cosmos/gaia - v18.1.0".to_owned(), "v0.50.6".to_owned()]);
    }

    #[test]
    fn markdown_header_round_trips_search_terms()
    {
        let terms = [("github.com/cosmos/cosmos-sdk", "v0.50.6",), ("github.com/cometbft/cometbft", "",), ("ibc-go/v8", "v8.2.1",)];
        let reports = vec![report("cosmos/gaia", "v18.1.0", &terms, None,)];

        let header = parse_markdown_header(&Table::from_reports(&reports, false,).to_markdown(),);
        let expected: Vec<String,> = terms.iter().map(|(term, _,)| (*term).to_owned(),).collect();
        assert_eq!(header[0], LABEL_HEADER);
        assert_eq!(header[1..], expected[..]);
    }

    #[test]
    fn term_columns_union_preserves_first_seen_order()
    {
        let reports = vec![
            report("a/one", "v1", &[("x", "1",), ("y", "2",)], None,),
            report("b/two", "v2", &[("z", "3",), ("x", "4",)], None,),
        ];
        let table = Table::from_reports(&reports, false,);

        assert_eq!(table.header(), ["repo - release_version", "x", "y", "z"]);
        assert_eq!(table.rows()[1], vec!["b/two - v2".to_owned(), "4".to_owned(), String::new(), "3".to_owned()]);
    }

    #[test]
    fn pipes_inside_cells_are_escaped()
    {
        let reports = vec![report("a/one", "v1", &[("x", "a|b",)], None,)];
        let markdown = Table::from_reports(&reports, false,).to_markdown();
        assert!(markdown.contains("| a\\|b |"));
    }

    #[test]
    fn empty_report_list_renders_header_only()
    {
        let markdown = Table::from_reports(&[], true,).to_markdown();
        assert_eq!(markdown, "| repo - release_version | market_cap |\n| ---------------------- | ---------- |\n");
    }

    #[test]
    fn plain_table_aligns_columns()
    {
        let reports = vec![
            report("a/one", "v1", &[("sdk", "v0.50.6",)], Some(MarketCap::NotAvailable,),),
        ];
        let plain = Table::from_reports(&reports, true,).to_plain();
        let expected = "\
repo - release_version  market_cap  sdk
----------------------  ----------  -------
a/one - v1              N/A         v0.50.6
";
        assert_eq!(plain, expected);
    }

    #[test]
    fn excerpts_list_matched_lines_and_skip_empty_matches()
    {
        let mut matched = report("cosmos/gaia", "v18.1.0", &[], None,);
        matched.search = vec!["ibc-go".to_owned()];
        matched.extraction = Extraction::Lines(vec!["\tgithub.com/cosmos/ibc-go/v8 v8.2.1".to_owned()],);

        let mut unmatched = report("osmosis-labs/osmosis", "v25.0.0", &[], None,);
        unmatched.search = vec!["ibc-go".to_owned()];
        unmatched.extraction = Extraction::Lines(Vec::new(),);

        let output = render_report(
            &[matched, unmatched],
            ExtractionPolicy::Lines,
            OutputFormat::Markdown,
            false,
        )
        .expect("excerpts render",);
        assert_eq!(
            output,
            "Contents of go.mod in cosmos/gaia at version v18.1.0 containing any of ['ibc-go']:\n    \tgithub.com/cosmos/ibc-go/v8 v8.2.1\n"
        );
    }

    #[test]
    fn excerpt_header_quotes_every_term()
    {
        let mut matched = report("cosmos/gaia", "v18.1.0", &[], None,);
        matched.search = vec!["ibc-go".to_owned(), "cosmos-sdk".to_owned()];
        matched.extraction = Extraction::Lines(vec!["x".to_owned()],);

        let output = render_excerpts(&[matched],);
        assert!(output.starts_with(
            "Contents of go.mod in cosmos/gaia at version v18.1.0 containing any of ['ibc-go', 'cosmos-sdk']:\n"
        ));
    }

    #[test]
    fn excerpts_print_whole_document_without_terms()
    {
        let mut full = report("cosmos/gaia", "v18.1.0", &[], None,);
        full.extraction = Extraction::Document("module foo\n".to_owned(),);

        let output = render_excerpts(&[full],);
        assert_eq!(output, "Contents of go.mod in cosmos/gaia at version v18.1.0:\nmodule foo\n\n");
    }

    #[test]
    fn json_output_serializes_reports_with_formatted_market_cap()
    {
        let reports = vec![report("cosmos/gaia", "v18.1.0", &[("sdk", "v0.50.6",)], Some(MarketCap::Usd(1234567.8,),),)];
        let json = render_report(&reports, ExtractionPolicy::Token, OutputFormat::Json, true,)
            .expect("json render",);
        let value: serde_json::Value = serde_json::from_str(&json,).expect("valid json",);

        assert_eq!(value[0]["repository"], "cosmos/gaia");
        assert_eq!(value[0]["market_cap"], "$1,234,567.80");
        assert_eq!(value[0]["extraction"]["Tokens"][0]["value"], "v0.50.6");
    }

    #[test]
    fn plain_format_selects_aligned_table()
    {
        let reports = vec![report("a/one", "v1", &[("x", "1",)], None,)];
        let plain = render_report(&reports, ExtractionPolicy::Token, OutputFormat::Plain, false,)
            .expect("plain render",);
        assert!(plain.starts_with("repo - release_version  x\n"));
    }

    proptest! {
        #[test]
        fn separator_length_matches_header_length(
            raw_terms in proptest::collection::vec("[a-zA-Z0-9./é-]{1,24}", 1..6),
        ) {
            let values: Vec<(&str, &str,),> = raw_terms.iter().map(|term| (term.as_str(), "v1",),).collect();
            let reports = vec![report("a/one", "v1", &values, None,)];
            let table = Table::from_reports(&reports, true,);
            let markdown = table.to_markdown();
            let separator = markdown.lines().nth(1).expect("separator row",);
            let dashes: Vec<usize,> = separator
                .split('|',)
                .map(str::trim,)
                .filter(|cell| !cell.is_empty(),)
                .map(|cell| cell.chars().count(),)
                .collect();
            let lengths: Vec<usize,> = table.header().iter().map(|cell| cell.chars().count(),).collect();
            prop_assert_eq!(dashes, lengths);
        }
    }
}
