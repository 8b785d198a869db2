/// Document rendering seam
///
/// The aggregation engine hands a title and an ordered list of consolidated
/// items to a [`DocumentRenderer`]; layout and encoding are the renderer's
/// problem. [`ChecklistRenderer`] is the built-in plain-text implementation;
/// a PDF renderer slots in behind the same trait.

use super::aggregate::ShoppingItem;

/// Turns a consolidated shopping list into a downloadable document
///
/// Implementations must accept an empty `rows` slice and still produce a
/// valid document.
pub trait DocumentRenderer: Send + Sync {
    /// File name suggested for the download, e.g. "shopping_list.txt"
    fn file_name(&self) -> &str;

    /// MIME type of the rendered document
    fn content_type(&self) -> &str;

    /// Renders the document
    fn render(&self, title: &str, rows: &[ShoppingItem]) -> Vec<u8>;
}

/// Plain-text checklist renderer
///
/// Each row gets a ballot box, the label, and the quantity in an aligned
/// column padded with underscores to write on:
///
/// ```text
/// Anna's shopping cart
/// --------------------
/// ☐ egg (pcs):______2
/// ☐ flour (g):____300
/// ```
#[derive(Debug, Clone)]
pub struct ChecklistRenderer {
    /// Minimum gap between the longest label and its quantity
    min_gap: usize,
}

impl ChecklistRenderer {
    pub fn new() -> Self {
        Self { min_gap: 3 }
    }
}

impl Default for ChecklistRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for ChecklistRenderer {
    fn file_name(&self) -> &str {
        "shopping_list.txt"
    }

    fn content_type(&self) -> &str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, title: &str, rows: &[ShoppingItem]) -> Vec<u8> {
        let mut doc = String::new();

        doc.push_str(title);
        doc.push('\n');
        doc.push_str(&"-".repeat(title.chars().count().max(1)));
        doc.push('\n');

        // Quantities line up on the right edge of the longest row.
        let column_width = rows
            .iter()
            .map(|row| row.label.chars().count() + row.quantity.to_string().len())
            .max()
            .unwrap_or(0)
            + self.min_gap;

        for row in rows {
            let quantity = row.quantity.to_string();
            let padding = column_width - row.label.chars().count() - quantity.len();
            doc.push('\u{2610}');
            doc.push(' ');
            doc.push_str(&row.label);
            doc.push(':');
            doc.push_str(&"_".repeat(padding));
            doc.push_str(&quantity);
            doc.push('\n');
        }

        doc.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, quantity: i64) -> ShoppingItem {
        ShoppingItem { label: label.to_string(), quantity }
    }

    #[test]
    fn test_empty_rows_still_renders_a_valid_document() {
        let renderer = ChecklistRenderer::new();
        let doc = renderer.render("Empty cart", &[]);

        let text = String::from_utf8(doc).unwrap();
        assert!(text.starts_with("Empty cart\n"));
        assert!(text.contains("----------"));
    }

    #[test]
    fn test_rows_are_rendered_in_given_order_with_checkboxes() {
        let renderer = ChecklistRenderer::new();
        let doc = renderer.render("List", &[item("egg (pcs)", 2), item("flour (g)", 300)]);

        let text = String::from_utf8(doc).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "List");
        assert!(lines[2].starts_with("\u{2610} egg (pcs):"));
        assert!(lines[3].starts_with("\u{2610} flour (g):"));
        assert!(lines[2].ends_with('2'));
        assert!(lines[3].ends_with("300"));
    }

    #[test]
    fn test_quantities_align_on_the_right_edge() {
        let renderer = ChecklistRenderer::new();
        let doc = renderer.render("List", &[item("a", 1), item("longer label", 12345)]);

        let text = String::from_utf8(doc).unwrap();
        let row_lengths: Vec<usize> = text
            .lines()
            .skip(2)
            .map(|line| line.chars().count())
            .collect();

        assert_eq!(row_lengths[0], row_lengths[1]);
    }

    #[test]
    fn test_minimum_gap_for_the_longest_row() {
        let renderer = ChecklistRenderer::new();
        let doc = renderer.render("List", &[item("flour (g)", 300)]);

        let text = String::from_utf8(doc).unwrap();
        // Longest (only) row still gets at least three underscores.
        assert!(text.contains("flour (g):___300"));
    }
}
