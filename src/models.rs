//! Domain models that mirror the `toys` table and get passed throughout the
//! TUI. These types stay light-weight data holders so other layers can focus
//! on presentation and persistence logic.

use std::fmt;

/// A single row of the `toys` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Toy {
    /// Primary key assigned by SQLite. Never edited after insert.
    pub id: i64,
    pub name: String,
    /// Stored in the `type` column; renamed because `type` is a keyword.
    pub kind: String,
    pub material: String,
    pub color: String,
    pub price: f64,
}

impl Toy {
    /// Combine a storage-assigned id with the descriptive fields.
    pub fn from_fields(id: i64, fields: ToyFields) -> Self {
        Self {
            id,
            name: fields.name,
            kind: fields.kind,
            material: fields.material,
            color: fields.color,
            price: fields.price,
        }
    }

    /// Copy out the five editable fields.
    pub fn fields(&self) -> ToyFields {
        ToyFields {
            name: self.name.clone(),
            kind: self.kind.clone(),
            material: self.material.clone(),
            color: self.color.clone(),
            price: self.price,
        }
    }

    /// Price rendered the way the grid shows it.
    pub fn price_text(&self) -> String {
        format_price(self.price)
    }

    /// Text of every column in table order (id, name, type, material, color,
    /// price). Both the grid and keyword search read from here, so what the
    /// user sees is exactly what they can search for.
    pub fn column_texts(&self) -> [String; 6] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.kind.clone(),
            self.material.clone(),
            self.color.clone(),
            self.price_text(),
        ]
    }

    /// Whether `keyword` (already lowercased) occurs in any column.
    pub fn matches(&self, keyword_lower: &str) -> bool {
        self.column_texts()
            .iter()
            .any(|text| text.to_lowercase().contains(keyword_lower))
    }
}

impl fmt::Display for Toy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}

/// The descriptive half of a toy: everything except the identifier. Insert
/// and update always carry all five fields together.
#[derive(Debug, Clone, PartialEq)]
pub struct ToyFields {
    pub name: String,
    pub kind: String,
    pub material: String,
    pub color: String,
    pub price: f64,
}

impl ToyFields {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        material: impl Into<String>,
        color: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            material: material.into(),
            color: color.into(),
            price,
        }
    }
}

/// Shortest round-trip decimal with at least one fractional digit, so `5.0`
/// stays `5.0` instead of collapsing to `5`. Magnitudes of `1e16` and above,
/// or below `1e-4`, use exponent form with a signed two-digit exponent
/// (`1e+20`, `2.5e-05`).
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if price.is_finite() && price != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent_form(price);
    }
    let text = price.to_string();
    if price.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

fn exponent_form(price: f64) -> String {
    let text = format!("{price:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Columns a listing can be ordered by.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Type,
    Material,
    Color,
    Price,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Id,
        SortField::Name,
        SortField::Type,
        SortField::Material,
        SortField::Color,
        SortField::Price,
    ];

    /// Column name interpolated into `ORDER BY`. This is the only place sort
    /// input turns into SQL text, and it only yields fixed identifiers.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Type => "type",
            SortField::Material => "material",
            SortField::Color => "color",
            SortField::Price => "price",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Type => "type",
            SortField::Material => "material",
            SortField::Color => "color",
            SortField::Price => "price",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// A complete sort criterion as picked in the sort selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Every field in both directions, ascending first, in selector order.
    pub fn all() -> Vec<SortOrder> {
        SortField::ALL
            .iter()
            .flat_map(|&field| {
                [
                    SortOrder::new(field, SortDirection::Ascending),
                    SortOrder::new(field, SortDirection::Descending),
                ]
            })
            .collect()
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortField::Id, SortDirection::Ascending)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By {} ({})", self.field.label(), self.direction.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Toy {
        Toy::from_fields(
            12,
            ToyFields::new("Кубики", "Игрушка", "Дерево", "Желтый", 12.99),
        )
    }

    #[test]
    fn price_text_keeps_a_fractional_digit() {
        assert_eq!(format_price(10.99), "10.99");
        assert_eq!(format_price(5.0), "5.0");
        assert_eq!(format_price(0.0), "0.0");
        assert_eq!(format_price(69.99), "69.99");
    }

    #[test]
    fn extreme_prices_use_exponent_form() {
        assert_eq!(format_price(1e20), "1e+20");
        assert_eq!(format_price(1.5e16), "1.5e+16");
        assert_eq!(format_price(0.00005), "5e-05");
        assert_eq!(format_price(1e-123), "1e-123");
        assert_eq!(format_price(123_456_789.0), "123456789.0");
        assert_eq!(format_price(0.0001), "0.0001");
    }

    #[test]
    fn matches_is_case_insensitive_for_cyrillic() {
        let toy = sample();
        assert!(toy.matches(&"КУБ".to_lowercase()));
        assert!(toy.matches("дерев"));
        assert!(!toy.matches("металл"));
    }

    #[test]
    fn matches_numeric_columns_as_text() {
        let toy = sample();
        assert!(toy.matches("12"));
        assert!(toy.matches(".99"));
        assert!(toy.matches(""));
    }

    #[test]
    fn sort_orders_cover_every_field_both_ways() {
        let orders = SortOrder::all();
        assert_eq!(orders.len(), 12);
        assert_eq!(orders[0].to_string(), "By id (asc)");
        assert_eq!(orders[11].to_string(), "By price (desc)");
    }

    #[test]
    fn fields_round_trip_through_toy() {
        let toy = sample();
        assert_eq!(Toy::from_fields(toy.id, toy.fields()), toy);
    }
}
