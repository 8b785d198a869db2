/// Shopping-list aggregation
///
/// Merges the ingredient lines of every recipe in a cart into a single
/// deduplicated list. Merge identity is the ingredient's display label
/// (`name (unit)`), not its row ID — two catalog rows describing the same
/// substance fold into one entry, as do duplicate lines within a single
/// recipe. A pure function of its input: no storage access, no side
/// effects, safe to call repeatedly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw ingredient line drawn from a cart recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingLine {
    /// Ingredient name
    pub name: String,

    /// Ingredient measurement unit
    pub measurement_unit: String,

    /// Amount called for by this line
    pub amount: i32,
}

impl ShoppingLine {
    /// The display label this line merges under
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.measurement_unit)
    }
}

/// One consolidated entry of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Ingredient display label
    pub label: String,

    /// Total amount across every matching line
    pub quantity: i64,
}

/// Merges raw lines into a consolidated list
///
/// Amounts with a matching label are summed (into i64, so a cart full of
/// maximum-amount lines cannot overflow); the result is sorted
/// lexicographically ascending by label and contains no duplicate labels.
/// Empty input yields an empty list.
pub fn consolidate(lines: impl IntoIterator<Item = ShoppingLine>) -> Vec<ShoppingItem> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();

    for line in lines {
        *totals.entry(line.label()).or_insert(0) += i64::from(line.amount);
    }

    totals
        .into_iter()
        .map(|(label, quantity)| ShoppingItem { label, quantity })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> ShoppingLine {
        ShoppingLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_empty_cart_yields_empty_list() {
        assert!(consolidate([]).is_empty());
    }

    #[test]
    fn test_duplicate_lines_within_one_recipe_are_summed() {
        let items = consolidate([line("a", "g", 2), line("a", "g", 3), line("b", "g", 1)]);

        assert_eq!(
            items,
            vec![
                ShoppingItem { label: "a (g)".to_string(), quantity: 5 },
                ShoppingItem { label: "b (g)".to_string(), quantity: 1 },
            ]
        );
    }

    #[test]
    fn test_merge_across_recipes_sorted_by_label() {
        // recipe1: flour 200g, egg 2; recipe2: flour 100g, sugar 50g
        let items = consolidate([
            line("flour", "g", 200),
            line("egg", "pcs", 2),
            line("flour", "g", 100),
            line("sugar", "g", 50),
        ]);

        assert_eq!(
            items,
            vec![
                ShoppingItem { label: "egg (pcs)".to_string(), quantity: 2 },
                ShoppingItem { label: "flour (g)".to_string(), quantity: 300 },
                ShoppingItem { label: "sugar (g)".to_string(), quantity: 50 },
            ]
        );
    }

    #[test]
    fn test_same_name_different_unit_stays_separate() {
        let items = consolidate([line("milk", "ml", 200), line("milk", "tbsp", 2)]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "milk (ml)");
        assert_eq!(items[1].label, "milk (tbsp)");
    }

    #[test]
    fn test_no_two_entries_share_a_label() {
        let items = consolidate([
            line("salt", "g", 1),
            line("salt", "g", 1),
            line("salt", "g", 1),
        ]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_result_is_sorted() {
        let items = consolidate([
            line("zucchini", "pcs", 1),
            line("apple", "pcs", 2),
            line("mango", "pcs", 3),
        ]);

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let lines = std::iter::repeat(line("flour", "g", 10_000)).take(500_000);
        let items = consolidate(lines);

        assert_eq!(items[0].quantity, 5_000_000_000i64);
    }
}
