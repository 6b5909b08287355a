//! Column schema of the market table.
//!
//! Columns are a pure function of the active currency: a currency change
//! recomputes them instead of patching shared column state.

use serde::Serialize;

use crate::market::Currency;

use super::state::TableRow;

/// Icon width in the name column, in pixels.
pub const ICON_WIDTH_PX: u32 = 32;

/// Placeholder for fields the upstream left null.
const MISSING: &str = "n/a";

/// Which record field a column displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Name,
    CurrentPrice,
    CirculatingSupply,
}

/// A rendered table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Icon image beside a text label.
    IconLabel {
        icon_url: String,
        label: String,
        icon_width: u32,
    },
    /// Plain text.
    Text(String),
}

impl Cell {
    /// Cell content as plain text.
    pub fn text(&self) -> &str {
        match self {
            Cell::IconLabel { label, .. } => label,
            Cell::Text(text) => text,
        }
    }
}

/// One column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub title: &'static str,
    pub key: ColumnKey,
    /// Currency used as the price suffix.
    #[serde(skip)]
    currency: Currency,
}

impl Column {
    /// Render this column's cell for a row.
    pub fn render(&self, row: &TableRow) -> Cell {
        let record = &row.record;
        match self.key {
            ColumnKey::Name => Cell::IconLabel {
                icon_url: record.image.clone(),
                label: record.name.clone(),
                icon_width: ICON_WIDTH_PX,
            },
            ColumnKey::CurrentPrice => Cell::Text(match record.current_price {
                Some(price) => format!("{} {}", price, self.currency.code()),
                None => format!("{} {}", MISSING, self.currency.code()),
            }),
            ColumnKey::CirculatingSupply => Cell::Text(match record.circulating_supply {
                Some(supply) => supply.to_string(),
                None => MISSING.to_string(),
            }),
        }
    }
}

/// The fixed three-column schema for a currency.
pub fn columns(currency: Currency) -> [Column; 3] {
    [
        Column {
            title: "Name",
            key: ColumnKey::Name,
            currency,
        },
        Column {
            title: "Current Price",
            key: ColumnKey::CurrentPrice,
            currency,
        },
        Column {
            title: "Circulating Supply",
            key: ColumnKey::CirculatingSupply,
            currency,
        },
    ]
}

/// Render every row with the schema for `currency`.
pub fn render_rows(rows: &[TableRow], currency: Currency) -> Vec<[Cell; 3]> {
    let schema = columns(currency);
    rows.iter()
        .map(|row| [schema[0].render(row), schema[1].render(row), schema[2].render(row)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock_record;
    use rust_decimal_macros::dec;

    fn bitcoin() -> TableRow {
        let mut record = mock_record("bitcoin", dec!(67234.12));
        record.circulating_supply = Some(19_675_987.0);
        TableRow::from(record)
    }

    #[test]
    fn schema_is_fixed() {
        let titles: Vec<&str> = columns(Currency::Usd).iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Name", "Current Price", "Circulating Supply"]);
    }

    #[test]
    fn name_column_shows_icon_and_label() {
        let cell = columns(Currency::Usd)[0].render(&bitcoin());
        assert_eq!(
            cell,
            Cell::IconLabel {
                icon_url: "https://assets.example.com/bitcoin.png".to_string(),
                label: "Bitcoin".to_string(),
                icon_width: 32,
            }
        );
    }

    #[test]
    fn price_suffix_follows_currency() {
        let row = bitcoin();
        assert_eq!(columns(Currency::Usd)[1].render(&row).text(), "67234.12 usd");
        assert_eq!(columns(Currency::Eur)[1].render(&row).text(), "67234.12 eur");
    }

    #[test]
    fn supply_is_raw_number() {
        let cell = columns(Currency::Usd)[2].render(&bitcoin());
        assert_eq!(cell.text(), "19675987");
    }

    #[test]
    fn missing_fields_render_placeholder() {
        let mut record = mock_record("ghost", dec!(1));
        record.current_price = None;
        record.circulating_supply = None;
        let rendered = render_rows(&[TableRow::from(record)], Currency::Eur);
        assert_eq!(rendered[0][1].text(), "n/a eur");
        assert_eq!(rendered[0][2].text(), "n/a");
    }
}
