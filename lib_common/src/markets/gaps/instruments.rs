//! Instrument definitions and the default watch lists of each provider.

use serde::{Deserialize, Serialize};

use super::session::ReopenRule;

/// A tradable instrument as shown in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Display name, optionally prefixed with an emoji.
    pub label: String,
    /// Provider symbols / EPICs, primary first. Later entries are aliases
    /// tried when the provider does not know the previous one.
    pub symbols: Vec<String>,
    /// Overrides the provider's reopening rule for this instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<ReopenRule>,
}

impl Instrument {
    /// Instrument priced with the provider's own reopening rule.
    pub fn new(label: &str, symbols: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            rule: None,
        }
    }

    /// Sets a reopening rule specific to this instrument.
    pub fn with_rule(mut self, rule: ReopenRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Rule for this instrument, falling back to the provider's.
    pub fn rule_or(&self, fallback: ReopenRule) -> ReopenRule {
        self.rule.unwrap_or(fallback)
    }
}

/// Globex futures on Yahoo daily candles.
pub fn yahoo_defaults() -> Vec<Instrument> {
    vec![
        Instrument::new("🪙 Gold", &["GC=F"]),
        Instrument::new("🛢 Oil", &["CL=F"]),
        Instrument::new("📈 Nasdaq", &["NQ=F"]),
        Instrument::new("🏦 Dow Jones", &["YM=F"]),
        Instrument::new("🇩🇪 GER40", &["^GDAXI"]),
    ]
}

/// Sunday-evening minute windows; micro contracts as aliases.
pub fn yahoo_minute_defaults() -> Vec<Instrument> {
    vec![
        Instrument::new("🪙 Gold", &["GC=F", "MGC=F"]),
        Instrument::new("🛢 Oil", &["CL=F", "MCL=F"]),
        Instrument::new("📈 Nasdaq", &["NQ=F", "MNQ=F"]),
        Instrument::new("🏦 Dow Jones", &["YM=F", "MYM=F"]),
    ]
}

/// Finnhub: OANDA pairs go through the forex endpoint, indices through stock.
pub fn finnhub_defaults() -> Vec<Instrument> {
    vec![
        Instrument::new("🪙 Gold", &["OANDA:XAU_USD"]),
        Instrument::new("🛢 Oil", &["OANDA:WTICO_USD"]),
        Instrument::new("📈 Nasdaq 100", &["^NDX"]),
        Instrument::new("🏦 Dow Jones", &["^DJI"]),
        Instrument::new("🇫🇷 CAC 40", &["^FCHI"]),
        Instrument::new("🇩🇪 GER40", &["^GDAXI"]),
    ]
}

/// IG Markets EPICs.
pub fn ig_defaults() -> Vec<Instrument> {
    vec![
        Instrument::new("🪙 Gold", &["CS.D.CFDGOLD.CFDGC.IP"]),
        Instrument::new("🛢 Oil", &["CC.D.CL.UNC.IP"]),
        Instrument::new("📈 Nasdaq", &["IX.D.NASDAQ.IFD.IP"]),
        Instrument::new("🏦 Dow Jones", &["IX.D.DOW.IFD.IP"]),
        Instrument::new("🇩🇪 GER40", &["IX.D.DAX.IFD.IP"]),
    ]
}
