use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

use crate::models::{format_price, Toy, ToyFields};

/// Reasons a toy form cannot be submitted. Shown to the user verbatim.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum FormError {
    #[error("{0} is required.")]
    Missing(&'static str),
    #[error("Price must be a number, got `{0}`.")]
    InvalidPrice(String),
    #[error("Price cannot be negative.")]
    NegativePrice,
}

/// Fields of the add/edit toy form, in tab order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum ToyField {
    #[default]
    Name,
    Type,
    Material,
    Color,
    Price,
}

impl ToyField {
    pub(crate) const ALL: [ToyField; 5] = [
        ToyField::Name,
        ToyField::Type,
        ToyField::Material,
        ToyField::Color,
        ToyField::Price,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ToyField::Name => "Name",
            ToyField::Type => "Type",
            ToyField::Material => "Material",
            ToyField::Color => "Color",
            ToyField::Price => "Price",
        }
    }

    fn next(self) -> Self {
        match self {
            ToyField::Name => ToyField::Type,
            ToyField::Type => ToyField::Material,
            ToyField::Material => ToyField::Color,
            ToyField::Color => ToyField::Price,
            ToyField::Price => ToyField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            ToyField::Name => ToyField::Price,
            ToyField::Type => ToyField::Name,
            ToyField::Material => ToyField::Type,
            ToyField::Color => ToyField::Material,
            ToyField::Price => ToyField::Color,
        }
    }

    /// Row of this field inside the form body.
    pub(crate) fn row(self) -> u16 {
        match self {
            ToyField::Name => 0,
            ToyField::Type => 1,
            ToyField::Material => 2,
            ToyField::Color => 3,
            ToyField::Price => 4,
        }
    }
}

/// Raw text typed into the add/edit form. Everything stays a string until
/// submit, where `parse_inputs` turns it into typed fields.
#[derive(Default, Clone, Debug)]
pub(crate) struct ToyForm {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) material: String,
    pub(crate) color: String,
    pub(crate) price: String,
    pub(crate) active: ToyField,
    pub(crate) error: Option<String>,
}

impl ToyForm {
    /// Populate the form from an existing toy when editing.
    pub(crate) fn from_toy(toy: &Toy) -> Self {
        Self {
            name: toy.name.clone(),
            kind: toy.kind.clone(),
            material: toy.material.clone(),
            color: toy.color.clone(),
            price: format_price(toy.price),
            active: ToyField::Name,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn value(&self, field: ToyField) -> &String {
        match field {
            ToyField::Name => &self.name,
            ToyField::Type => &self.kind,
            ToyField::Material => &self.material,
            ToyField::Color => &self.color,
            ToyField::Price => &self.price,
        }
    }

    fn value_mut(&mut self, field: ToyField) -> &mut String {
        match field {
            ToyField::Name => &mut self.name,
            ToyField::Type => &mut self.kind,
            ToyField::Material => &mut self.material,
            ToyField::Color => &mut self.color,
            ToyField::Price => &mut self.price,
        }
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate the inputs and return typed values ready for persistence.
    /// Text fields are stored exactly as typed; blank-only input counts as
    /// missing.
    pub(crate) fn parse_inputs(&self) -> Result<ToyFields, FormError> {
        let mut text = Vec::with_capacity(4);
        for field in [
            ToyField::Name,
            ToyField::Type,
            ToyField::Material,
            ToyField::Color,
        ] {
            let value = self.value(field);
            if value.trim().is_empty() {
                return Err(FormError::Missing(field.label()));
            }
            text.push(value.clone());
        }

        let price_raw = self.price.trim();
        if price_raw.is_empty() {
            return Err(FormError::Missing(ToyField::Price.label()));
        }
        let price = price_raw
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| FormError::InvalidPrice(price_raw.to_string()))?;
        if price < 0.0 {
            return Err(FormError::NegativePrice);
        }

        let mut text = text.into_iter();
        Ok(ToyFields {
            name: text.next().unwrap_or_default(),
            kind: text.next().unwrap_or_default(),
            material: text.next().unwrap_or_default(),
            color: text.next().unwrap_or_default(),
            price,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: ToyField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(field_prefix(field)),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: ToyField) -> usize {
        self.value(field).chars().count()
    }
}

/// Label plus padding so every value column lines up.
pub(crate) fn field_prefix(field: ToyField) -> String {
    format!("{:<10}", format!("{}:", field.label()))
}

/// State for confirming permanent toy deletion.
pub(crate) struct ConfirmToyDelete {
    pub(crate) toy: Toy,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ToyForm {
        ToyForm {
            name: " Test ".into(),
            kind: "Toy".into(),
            material: "Plastic".into(),
            color: "Red".into(),
            price: "9.99".into(),
            ..ToyForm::default()
        }
    }

    #[test]
    fn parses_a_complete_form() {
        let fields = filled().parse_inputs().unwrap();
        assert_eq!(
            fields,
            ToyFields::new(" Test ", "Toy", "Plastic", "Red", 9.99)
        );
    }

    #[test]
    fn rejects_non_numeric_price() {
        let mut form = filled();
        form.price = "abc".into();
        assert_eq!(
            form.parse_inputs(),
            Err(FormError::InvalidPrice("abc".into()))
        );
        form.price = "NaN".into();
        assert!(matches!(form.parse_inputs(), Err(FormError::InvalidPrice(_))));
    }

    #[test]
    fn rejects_negative_price() {
        let mut form = filled();
        form.price = "-1".into();
        assert_eq!(form.parse_inputs(), Err(FormError::NegativePrice));
    }

    #[test]
    fn reports_the_first_missing_field() {
        let mut form = filled();
        form.material = "   ".into();
        assert_eq!(form.parse_inputs(), Err(FormError::Missing("Material")));
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Material is required."
        );
    }

    #[test]
    fn edits_go_to_the_active_field() {
        let mut form = ToyForm::default();
        form.push_char('a');
        form.next_field();
        form.push_char('b');
        form.previous_field();
        form.previous_field();
        assert_eq!(form.active, ToyField::Price);
        form.push_char('1');
        form.push_char('\n');
        form.backspace();
        assert_eq!(form.name, "a");
        assert_eq!(form.kind, "b");
        assert!(form.price.is_empty());
    }

    #[test]
    fn edit_form_starts_from_the_stored_toy() {
        let toy = Toy::from_fields(3, ToyFields::new("Кукла", "Фигура", "Ткань", "Розовый", 5.0));
        let form = ToyForm::from_toy(&toy);
        assert_eq!(form.price, "5.0");
        assert_eq!(form.parse_inputs().unwrap(), toy.fields());
    }

    #[test]
    fn surrounding_spaces_survive_an_edit() {
        let toy = Toy::from_fields(7, ToyFields::new(" Мяч ", "Спорт ", " Резина", "Красный", 3.5));
        let form = ToyForm::from_toy(&toy);
        assert_eq!(form.parse_inputs().unwrap(), toy.fields());
    }
}
