//! Null-safe weekend gap arithmetic.

use std::fmt;

/// Sign of a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The market opened above the prior close.
    Up,
    /// The market opened below the prior close.
    Down,
    /// No price change over the weekend.
    Flat,
}

impl Direction {
    /// Glyph shown in report lines.
    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Up => "🟢",
            Direction::Down => "🔴",
            Direction::Flat => "⚪",
        }
    }
}

/// A computed gap between a closing and an opening price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    /// Prior session close.
    pub close: f64,
    /// Next session open.
    pub open: f64,
    /// `open - close`
    pub gap: f64,
    /// `gap / close * 100`, 0 when `close` is 0.
    pub pct: f64,
    /// Sign of `gap`.
    pub direction: Direction,
}

/// Which reference price(s) could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No close for the prior Friday.
    PriorClose,
    /// No open for the next session.
    NextOpen,
    /// Neither price.
    Both,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::PriorClose => write!(f, "prior close"),
            Missing::NextOpen => write!(f, "next open"),
            Missing::Both => write!(f, "prior close & next open"),
        }
    }
}

/// Result of the gap computation for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapOutcome {
    /// Both prices were present.
    Available(Gap),
    /// At least one price was missing.
    Unavailable(Missing),
}

/// Computes the gap between `close` and `open`.
///
/// Non-finite prices are treated as absent. A zero close yields a 0%
/// change instead of a division by zero.
pub fn compute_gap(close: Option<f64>, open: Option<f64>) -> GapOutcome {
    let close = close.filter(|v| v.is_finite());
    let open = open.filter(|v| v.is_finite());

    match (close, open) {
        (Some(close), Some(open)) => {
            let gap = open - close;
            let pct = if close == 0.0 { 0.0 } else { gap / close * 100.0 };
            let direction = if gap > 0.0 {
                Direction::Up
            } else if gap < 0.0 {
                Direction::Down
            } else {
                Direction::Flat
            };
            GapOutcome::Available(Gap {
                close,
                open,
                gap,
                pct,
                direction,
            })
        }
        (None, Some(_)) => GapOutcome::Unavailable(Missing::PriorClose),
        (Some(_), None) => GapOutcome::Unavailable(Missing::NextOpen),
        (None, None) => GapOutcome::Unavailable(Missing::Both),
    }
}
