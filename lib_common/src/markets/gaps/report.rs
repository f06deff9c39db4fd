//! # Report Formatter
//!
//! Renders per-instrument results into the short text posted to Discord:
//!
//! ```text
//! 📊 OPENING GAPS | 08/01/2024 (yahoo)
//! 🪙 Gold : 🟢 2.35 (2.35%)
//! 🛢 Oil : ⚠️ Data unavailable (prior close)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::calculator::GapOutcome;
use super::provider::{AuthError, FetchError};

/// Title shared by the report header and the pre-open note.
pub const REPORT_TITLE: &str = "📊 OPENING GAPS";

/// Outcome of one instrument, ready to be formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentReport {
    /// Display name of the instrument.
    pub label: String,
    /// Symbols that were tried, in order.
    pub symbols: Vec<String>,
    /// Symbol whose prices were used, when a fetch succeeded.
    pub answered_by: Option<String>,
    /// Gap, or why it could not be priced.
    pub result: Result<GapOutcome, FetchError>,
}

/// Header line plus one line per instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// `📊 OPENING GAPS | dd/mm/YYYY (provider)`.
    pub header: String,
    /// One formatted line per instrument.
    pub lines: Vec<String>,
}

impl Report {
    /// Formats every instrument under a header dated `report_date`.
    pub fn new(report_date: NaiveDate, provider: &str, instruments: &[InstrumentReport]) -> Self {
        Self {
            header: header(report_date, provider),
            lines: instruments.iter().map(format_line).collect(),
        }
    }

    /// Body lines joined with newlines.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    /// Full message: header, then the body.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header, self.body())
    }
}

/// Report header for `report_date` and the provider that priced it.
pub fn header(report_date: NaiveDate, provider: &str) -> String {
    format!(
        "{} | {} ({})",
        REPORT_TITLE,
        report_date.format("%d/%m/%Y"),
        provider
    )
}

/// Formats one instrument line. Prices that came from an alias name it
/// at the end of the line.
pub fn format_line(report: &InstrumentReport) -> String {
    let label = &report.label;
    match &report.result {
        Ok(GapOutcome::Available(gap)) => format!(
            "{} : {} {} ({}%){}",
            label,
            gap.direction.glyph(),
            two_decimals(gap.gap),
            two_decimals(gap.pct),
            alias_suffix(report)
        ),
        Ok(GapOutcome::Unavailable(missing)) => format!(
            "{} : ⚠️ Data unavailable ({}){}",
            label,
            missing,
            alias_suffix(report)
        ),
        Err(FetchError::SymbolNotFound(_)) => format!(
            "{} : ⚠️ Symbol not found ({})",
            label,
            report.symbols.join("/")
        ),
        Err(err) => format!(
            "{} : ⚠️ Data unavailable ({}) [{}]",
            label,
            super::calculator::Missing::Both,
            err.short_reason()
        ),
    }
}

/// Message sent instead of a report while the market is still closed.
pub fn pre_open_note(now: DateTime<Utc>, reopens_at: DateTime<Utc>, tz: Tz) -> String {
    let local_reopen = reopens_at.with_timezone(&tz);
    let local_now = now.with_timezone(&tz);
    format!(
        "{}\n⚠️ Markets not open yet.\n⏰ Reopening {} UTC ({} {}).\n(Local time now: {})",
        REPORT_TITLE,
        reopens_at.format("%a %H:%M"),
        local_reopen.format("%H:%M"),
        tz.name(),
        local_now.format("%d/%m/%Y %H:%M")
    )
}

/// Diagnostic posted when the provider session cannot be opened.
pub fn auth_failure_note(provider: &str, err: &AuthError) -> String {
    format!("{}\n⛔ {} authentication failed: {}", REPORT_TITLE, provider, err)
}

fn alias_suffix(report: &InstrumentReport) -> String {
    match &report.answered_by {
        Some(symbol) if report.symbols.first() != Some(symbol) => format!(" via {}", symbol),
        _ => String::new(),
    }
}

/// `{:.2}` without the "-0.00" artefact.
fn two_decimals(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::gaps::calculator::{compute_gap, Direction, Gap, Missing};
    use chrono::TimeZone;

    fn line(label: &str, result: Result<GapOutcome, FetchError>) -> String {
        format_line(&InstrumentReport {
            label: label.to_string(),
            symbols: vec!["GC=F".to_string(), "MGC=F".to_string()],
            answered_by: result.is_ok().then(|| "GC=F".to_string()),
            result,
        })
    }

    #[test]
    fn test_gold_positive_line() {
        let gap = GapOutcome::Available(Gap {
            close: 100.0,
            open: 102.35,
            gap: 2.35,
            pct: 2.35,
            direction: Direction::Up,
        });
        assert_eq!(line("Gold", Ok(gap)), "Gold : 🟢 2.35 (2.35%)");
    }

    #[test]
    fn test_negative_and_flat_lines() {
        assert_eq!(
            line("Oil", Ok(compute_gap(Some(100.0), Some(97.0)))),
            "Oil : 🔴 -3.00 (-3.00%)"
        );
        assert_eq!(
            line("Dow", Ok(compute_gap(Some(100.0), Some(100.0)))),
            "Dow : ⚪ 0.00 (0.00%)"
        );
    }

    #[test]
    fn test_tiny_negative_gap_is_not_minus_zero() {
        assert_eq!(
            line("FX", Ok(compute_gap(Some(1.0), Some(0.999999)))),
            "FX : 🔴 0.00 (0.00%)"
        );
    }

    #[test]
    fn test_unavailable_lines() {
        assert_eq!(
            line("Gold", Ok(GapOutcome::Unavailable(Missing::PriorClose))),
            "Gold : ⚠️ Data unavailable (prior close)"
        );
        assert_eq!(
            line("Gold", Ok(GapOutcome::Unavailable(Missing::Both))),
            "Gold : ⚠️ Data unavailable (prior close & next open)"
        );
        assert_eq!(
            line("Gold", Err(FetchError::Http { status: 404 })),
            "Gold : ⚠️ Data unavailable (prior close & next open) [http 404]"
        );
        assert_eq!(
            line("Gold", Err(FetchError::SymbolNotFound("MGC=F".into()))),
            "Gold : ⚠️ Symbol not found (GC=F/MGC=F)"
        );
    }

    #[test]
    fn test_report_render() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let report = Report::new(
            date,
            "yahoo",
            &[
                InstrumentReport {
                    label: "Gold".into(),
                    symbols: vec!["GC=F".into()],
                    answered_by: Some("GC=F".into()),
                    result: Ok(compute_gap(Some(100.0), Some(103.0))),
                },
                InstrumentReport {
                    label: "Oil".into(),
                    symbols: vec!["CL=F".into()],
                    answered_by: Some("CL=F".into()),
                    result: Ok(compute_gap(None, Some(70.0))),
                },
            ],
        );

        assert_eq!(
            report.render(),
            "📊 OPENING GAPS | 08/01/2024 (yahoo)\nGold : 🟢 3.00 (3.00%)\nOil : ⚠️ Data unavailable (prior close)"
        );
    }

    #[test]
    fn test_alias_that_answered_is_named() {
        let mut report = InstrumentReport {
            label: "Gold".into(),
            symbols: vec!["XAU/USD".into(), "XAUUSD".into()],
            answered_by: Some("XAUUSD".into()),
            result: Ok(compute_gap(Some(100.0), Some(101.0))),
        };
        assert_eq!(format_line(&report), "Gold : 🟢 1.00 (1.00%) via XAUUSD");

        report.result = Ok(GapOutcome::Unavailable(Missing::NextOpen));
        assert_eq!(
            format_line(&report),
            "Gold : ⚠️ Data unavailable (next open) via XAUUSD"
        );

        report.answered_by = Some("XAU/USD".into());
        assert_eq!(format_line(&report), "Gold : ⚠️ Data unavailable (next open)");
    }

    #[test]
    fn test_auth_failure_note() {
        let note = auth_failure_note(
            "ig",
            &AuthError::Rejected {
                status: 401,
                body: "error.security.invalid-details".into(),
            },
        );
        assert!(note.starts_with("📊 OPENING GAPS\n⛔ ig authentication failed: "));
        assert!(note.contains("401"));
    }

    #[test]
    fn test_pre_open_note_mentions_both_clocks() {
        let now = Utc.with_ymd_and_hms(2024, 1, 7, 20, 30, 0).unwrap();
        let reopen = Utc.with_ymd_and_hms(2024, 1, 7, 22, 0, 0).unwrap();
        let note = pre_open_note(now, reopen, chrono_tz::Europe::Paris);

        assert!(note.starts_with(REPORT_TITLE));
        assert!(note.contains("Reopening Sun 22:00 UTC (23:00 Europe/Paris)"));
        assert!(note.contains("07/01/2024 21:30"));
    }
}
