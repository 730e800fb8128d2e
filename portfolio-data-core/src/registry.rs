//! Ticker registry — the fixed universe of symbols with display names and
//! sector labels.
//!
//! The registry is an ordered table: iteration order is declaration order,
//! and that order canonicalizes correlation pair keys downstream. A TOML
//! file with the same shape can override the compiled-in universe.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One universe entry: symbol plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

/// The ordered ticker universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    pub tickers: Vec<TickerEntry>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("symbol not registered: {0}")]
    NotRegistered(String),

    #[error("duplicate symbol in registry: {0}")]
    DuplicateSymbol(String),

    #[error("registry is empty")]
    Empty,

    #[error("read registry file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse registry TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Registry {
    /// Load a registry from a TOML file (`[[tickers]]` array).
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a registry from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        let registry: Registry = toml::from_str(content)?;
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.tickers.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &self.tickers {
            if !seen.insert(entry.symbol.as_str()) {
                return Err(RegistryError::DuplicateSymbol(entry.symbol.clone()));
            }
        }
        Ok(())
    }

    /// Look up an entry by symbol.
    pub fn get(&self, symbol: &str) -> Result<&TickerEntry, RegistryError> {
        self.tickers
            .iter()
            .find(|e| e.symbol == symbol)
            .ok_or_else(|| RegistryError::NotRegistered(symbol.to_string()))
    }

    /// Symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(|e| e.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Serialize the registry to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The compiled-in default universe: ~60 large-cap US equities across
    /// the major sectors, plus comparison ETFs.
    pub fn default_universe() -> Self {
        fn entry(symbol: &str, name: &str, sector: &str) -> TickerEntry {
            TickerEntry {
                symbol: symbol.into(),
                name: name.into(),
                sector: sector.into(),
            }
        }

        let tickers = vec![
            // Mega-cap tech
            entry("AAPL", "Apple", "Technology"),
            entry("MSFT", "Microsoft", "Technology"),
            entry("GOOGL", "Alphabet", "Technology"),
            entry("AMZN", "Amazon", "Technology"),
            entry("TSLA", "Tesla", "Technology"),
            entry("META", "Meta", "Technology"),
            entry("NVDA", "NVIDIA", "Technology"),
            entry("CRM", "Salesforce", "Technology"),
            entry("AMD", "AMD", "Technology"),
            entry("INTC", "Intel", "Technology"),
            entry("ORCL", "Oracle", "Technology"),
            entry("ADBE", "Adobe", "Technology"),
            // Financials
            entry("JPM", "JPMorgan Chase", "Financials"),
            entry("BAC", "Bank of America", "Financials"),
            entry("GS", "Goldman Sachs", "Financials"),
            entry("V", "Visa", "Financials"),
            entry("MA", "Mastercard", "Financials"),
            entry("BRK-B", "Berkshire Hathaway", "Financials"),
            // Healthcare
            entry("JNJ", "Johnson & Johnson", "Healthcare"),
            entry("PFE", "Pfizer", "Healthcare"),
            entry("UNH", "UnitedHealth", "Healthcare"),
            entry("LLY", "Eli Lilly", "Healthcare"),
            entry("MRK", "Merck", "Healthcare"),
            entry("ABBV", "AbbVie", "Healthcare"),
            // Energy
            entry("XOM", "ExxonMobil", "Energy"),
            entry("CVX", "Chevron", "Energy"),
            entry("COP", "ConocoPhillips", "Energy"),
            // Utilities (defensive)
            entry("DUK", "Duke Energy", "Utilities"),
            entry("NEE", "NextEra Energy", "Utilities"),
            entry("SO", "Southern Co", "Utilities"),
            entry("AEP", "American Electric Power", "Utilities"),
            // Consumer Staples
            entry("KO", "Coca-Cola", "Consumer Staples"),
            entry("PEP", "PepsiCo", "Consumer Staples"),
            entry("PG", "Procter & Gamble", "Consumer Staples"),
            entry("WMT", "Walmart", "Consumer Staples"),
            entry("COST", "Costco", "Consumer Staples"),
            entry("MCD", "McDonald's", "Consumer Discretionary"),
            // Consumer Discretionary
            entry("DIS", "Disney", "Consumer Discretionary"),
            entry("NFLX", "Netflix", "Consumer Discretionary"),
            entry("NKE", "Nike", "Consumer Discretionary"),
            entry("SBUX", "Starbucks", "Consumer Discretionary"),
            entry("HD", "Home Depot", "Consumer Discretionary"),
            entry("LOW", "Lowe's", "Consumer Discretionary"),
            // Industrials
            entry("BA", "Boeing", "Industrials"),
            entry("CAT", "Caterpillar", "Industrials"),
            entry("GE", "GE Aerospace", "Industrials"),
            entry("UPS", "UPS", "Industrials"),
            entry("RTX", "RTX Corp", "Industrials"),
            // Real Estate
            entry("AMT", "American Tower", "Real Estate"),
            entry("PLD", "Prologis", "Real Estate"),
            // Communications
            entry("T", "AT&T", "Communications"),
            entry("VZ", "Verizon", "Communications"),
            entry("TMUS", "T-Mobile", "Communications"),
            // Materials
            entry("LIN", "Linde", "Materials"),
            entry("APD", "Air Products", "Materials"),
            // ETFs (for comparison)
            entry("QQQ", "Nasdaq 100 ETF", "ETF"),
            entry("IWM", "Russell 2000 ETF", "ETF"),
            entry("GLD", "Gold ETF", "ETF"),
            entry("TLT", "20+ Year Treasury ETF", "ETF"),
            entry("BND", "Total Bond ETF", "ETF"),
            entry("VNQ", "Real Estate ETF", "ETF"),
            entry("XLE", "Energy Select ETF", "ETF"),
        ];

        Self { tickers }
    }
}
