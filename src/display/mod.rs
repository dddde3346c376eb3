//! Terminal rendering of tensors.

use std::fmt::{self, Display};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;

use crate::math::Scalar;
use crate::tensor::{Tensor, Tensor1, Tensor2};

fn value_cell<F: Scalar>(value: F) -> Cell {
    Cell::new(format!("{:.4}", value.to_f64().unwrap_or(f64::NAN)))
        .set_alignment(CellAlignment::Right)
}

impl<K, F> Tensor1<K, F>
where
    K: Ord + Clone + fmt::Debug + Display,
    F: Scalar,
{
    /// Render as a key/value table; the final row carries the default.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("key").set_alignment(CellAlignment::Center),
                Cell::new("value").set_alignment(CellAlignment::Center),
            ]);

        for key in self.domain().iter() {
            table.add_row(vec![
                Cell::new(key.to_string()),
                value_cell(self.value_unchecked(key)),
            ]);
        }
        table.add_row(vec![
            Cell::new("(default)"),
            value_cell(self.default_value()),
        ]);

        table.to_string()
    }
}

impl<K, F> Display for Tensor1<K, F>
where
    K: Ord + Clone + fmt::Debug + Display,
    F: Scalar,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl<R, C, F> Tensor2<R, C, F>
where
    R: Ord + Clone + fmt::Debug + Display,
    C: Ord + Clone + fmt::Debug + Display,
    F: Scalar,
{
    /// Render as a row × column grid, views included.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![Cell::new("")];
        header.extend(
            self.cols()
                .iter()
                .map(|col| Cell::new(col.to_string()).set_alignment(CellAlignment::Center)),
        );
        table.set_header(header);

        for row in self.rows().iter() {
            let mut cells = vec![Cell::new(row.to_string())];
            cells.extend(
                self.cols()
                    .iter()
                    .map(|col| value_cell(self.value_unchecked(&(row.clone(), col.clone())))),
            );
            table.add_row(cells);
        }

        table.to_string()
    }
}

impl<R, C, F> Display for Tensor2<R, C, F>
where
    R: Ord + Clone + fmt::Debug + Display,
    C: Ord + Clone + fmt::Debug + Display,
    F: Scalar,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
