//! Market listing types as returned by the CoinGecko markets endpoint.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use time::OffsetDateTime;

/// Quote currency the listing is denominated in (`vs_currency`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Currency {
    /// US dollar.
    #[default]
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
    /// Japanese yen.
    Jpy,
}

impl Currency {
    /// Code sent upstream and shown as the price suffix.
    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Label for the currency selector.
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }
}

/// Listing order. Only market cap ordering is exposed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Largest market cap first.
    #[default]
    #[strum(
        to_string = "market-cap-desc",
        serialize = "market_cap_desc",
        serialize = "desc"
    )]
    MarketCapDesc,
    /// Smallest market cap first.
    #[strum(
        to_string = "market-cap-asc",
        serialize = "market_cap_asc",
        serialize = "asc"
    )]
    MarketCapAsc,
}

impl SortOrder {
    /// Value of the upstream `order` query parameter.
    pub fn api_param(&self) -> &'static str {
        match self {
            SortOrder::MarketCapDesc => "market_cap_desc",
            SortOrder::MarketCapAsc => "market_cap_asc",
        }
    }

    /// Label for the sort selector.
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::MarketCapDesc => "Market cap descending",
            SortOrder::MarketCapAsc => "Market cap ascending",
        }
    }
}

/// Return-on-investment summary since listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    /// Multiplier since listing.
    pub times: f64,
    /// Currency the multiplier is measured in.
    pub currency: String,
    /// Same figure as a percentage.
    pub percentage: f64,
}

/// One asset's point-in-time market snapshot.
///
/// Price-denominated values are in the requested `vs_currency`. Only the
/// displayed price is a `Decimal`; the other figures are `f64` so that one
/// out-of-range valuation cannot fail a whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Unique asset identifier (e.g., "bitcoin").
    pub id: String,
    /// Ticker symbol (e.g., "btc").
    pub symbol: String,
    /// Display name (e.g., "Bitcoin").
    pub name: String,
    /// Icon URL.
    #[serde(default)]
    pub image: String,
    /// Displayed price. Values a `Decimal` cannot hold exactly decode as `None`.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub fully_diluted_valuation: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    /// All-time high price.
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ath_date: Option<OffsetDateTime>,
    /// All-time low price.
    #[serde(default)]
    pub atl: Option<f64>,
    #[serde(default)]
    pub atl_change_percentage: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub atl_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub roi: Option<Roi>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_updated: Option<OffsetDateTime>,
}

/// Decode an optional JSON number as a `Decimal`.
///
/// Numbers outside the `Decimal` range, or too small to keep any significant
/// digit, become `None` instead of failing the record.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<Number>::deserialize(deserializer)?;
    Ok(number.as_ref().and_then(decimal_from_number))
}

fn decimal_from_number(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()?;

    // Underflow rounds to zero; a nonzero price must not read as 0.
    if value.is_zero() && number.as_f64().is_some_and(|f| f != 0.0) {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use strum::IntoEnumIterator;

    const BITCOIN: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
        "current_price": 67234.12,
        "market_cap": 1323456789012,
        "market_cap_rank": 1,
        "fully_diluted_valuation": 1411234567890,
        "total_volume": 28123456789,
        "high_24h": 68000.5,
        "low_24h": 66000.25,
        "price_change_24h": -512.3,
        "price_change_percentage_24h": -0.7563,
        "market_cap_change_24h": -10123456789,
        "market_cap_change_percentage_24h": -0.76,
        "circulating_supply": 19675987.0,
        "total_supply": 21000000.0,
        "max_supply": 21000000.0,
        "ath": 73738,
        "ath_change_percentage": -8.8,
        "ath_date": "2024-03-14T07:10:36.635Z",
        "atl": 67.81,
        "atl_change_percentage": 99000.1,
        "atl_date": "2013-07-06T00:00:00.000Z",
        "roi": null,
        "last_updated": "2024-04-20T12:00:05.123Z"
    }"#;

    #[test]
    fn decodes_full_record() {
        let record: MarketRecord = serde_json::from_str(BITCOIN).unwrap();
        assert_eq!(record.id, "bitcoin");
        assert_eq!(record.current_price, Some(dec!(67234.12)));
        assert_eq!(record.market_cap_rank, Some(1));
        assert_eq!(record.circulating_supply, Some(19_675_987.0));
        assert!(record.roi.is_none());
        assert_eq!(record.ath_date.map(|d| d.year()), Some(2024));
    }

    #[test]
    fn decodes_sparse_record_with_nulls_and_roi() {
        let json = r#"{
            "id": "ethereum",
            "symbol": "eth",
            "name": "Ethereum",
            "image": "https://example.com/eth.png",
            "current_price": 3100.5,
            "market_cap_rank": null,
            "max_supply": null,
            "roi": {"times": 52.1, "currency": "btc", "percentage": 5210.4}
        }"#;
        let record: MarketRecord = serde_json::from_str(json).unwrap();
        assert!(record.market_cap_rank.is_none());
        assert!(record.max_supply.is_none());
        assert!(record.ath_date.is_none());
        let roi = record.roi.unwrap();
        assert_eq!(roi.currency, "btc");
    }

    #[test]
    fn out_of_range_figures_do_not_fail_the_record() {
        let json = r#"{
            "id": "moon",
            "symbol": "moon",
            "name": "Moon",
            "current_price": 0.00042,
            "market_cap": 4.2e29,
            "fully_diluted_valuation": 1e30,
            "total_volume": 3.5e28
        }"#;
        let record: MarketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.current_price, Some(dec!(0.00042)));
        assert_eq!(record.fully_diluted_valuation, Some(1e30));
        assert_eq!(record.market_cap, Some(4.2e29));
    }

    #[test]
    fn unrepresentable_prices_decode_as_missing() {
        let tiny = r#"{"id": "dust", "symbol": "dst", "name": "Dust", "current_price": 1e-30}"#;
        let record: MarketRecord = serde_json::from_str(tiny).unwrap();
        assert_eq!(record.current_price, None);

        let huge = r#"{"id": "big", "symbol": "big", "name": "Big", "current_price": 1e30}"#;
        let record: MarketRecord = serde_json::from_str(huge).unwrap();
        assert_eq!(record.current_price, None);

        let zero = r#"{"id": "nil", "symbol": "nil", "name": "Nil", "current_price": 0}"#;
        let record: MarketRecord = serde_json::from_str(zero).unwrap();
        assert_eq!(record.current_price, Some(Decimal::ZERO));
    }

    #[test]
    fn currency_parses_and_prints_codes() {
        assert_eq!(Currency::from_str("eur").unwrap(), Currency::Eur);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::Eur.code(), "eur");
        assert_eq!(Currency::Usd.to_string(), "usd");
        assert!(Currency::from_str("doge").is_err());
        assert_eq!(Currency::iter().count(), 4);
    }

    #[test]
    fn sort_order_maps_to_api_param() {
        assert_eq!(SortOrder::default(), SortOrder::MarketCapDesc);
        assert_eq!(SortOrder::MarketCapDesc.to_string(), "market-cap-desc");
        assert_eq!(SortOrder::MarketCapAsc.api_param(), "market_cap_asc");
        assert_eq!(SortOrder::from_str("asc").unwrap(), SortOrder::MarketCapAsc);
        assert_eq!(
            SortOrder::from_str("market-cap-desc").unwrap(),
            SortOrder::MarketCapDesc
        );
    }

    #[test]
    fn sort_order_serde_uses_kebab_case() {
        let json = serde_json::to_string(&SortOrder::MarketCapAsc).unwrap();
        assert_eq!(json, "\"market-cap-asc\"");
    }
}
