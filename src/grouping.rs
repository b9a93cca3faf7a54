//! Order grouping and per-group reduction
//!
//! A flat item list becomes a two-level structure: order id, then sub-item
//! index, each level keeping the first-seen order of the input. Records
//! sharing `(order_external_id, index_item)` are variants of one logical
//! sub-item (front/back prints) and merge into a single report row.

use crate::record::ItemRecord;
use std::collections::HashMap;

/// Sort key for sub-item indexes within an order.
///
/// An index that is a non-empty run of ASCII digits compares as a number;
/// anything else compares as text. All numeric keys order before all text
/// keys, so an order mixing the two kinds still sorts the same way on
/// every run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Numeric(u64),
    Text(String),
}

impl SortKey {
    pub fn from_raw(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // Digit runs too long for u64 stay textual.
            if let Ok(n) = raw.parse::<u64>() {
                return SortKey::Numeric(n);
            }
        }
        SortKey::Text(raw.to_string())
    }
}

/// One rendered report row: a sub-item with its merged variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub order_id: String,
    /// Number of merged records, the film count of this sub-item.
    pub item_count: u32,
    /// Distinct trimmed labels, sorted and joined with `/`.
    pub labels: String,
    pub shirt_type: String,
    pub color: String,
    pub size: String,
}

/// Running totals across all emitted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// One per emitted row, however many variants the row merged.
    pub shirts: u32,
    /// Sum of merged variant counts across rows.
    pub films: u32,
}

/// All records sharing one `(order, index_item)` pair, in input order.
#[derive(Debug)]
struct SubItemGroup<'a> {
    index: String,
    items: Vec<&'a ItemRecord>,
}

impl SubItemGroup<'_> {
    /// Reduce the group to one row. Representative product fields always
    /// come from the first record in input order; differing values on
    /// later variants are ignored.
    fn reduce(&self, order_id: &str) -> ReportRow {
        let mut labels: Vec<String> = Vec::new();
        for item in &self.items {
            let raw = item.field("label");
            let label = raw.trim();
            if !label.is_empty() && !labels.iter().any(|seen| seen == label) {
                labels.push(label.to_string());
            }
        }
        labels.sort();

        let first = self.items[0];
        ReportRow {
            order_id: order_id.to_string(),
            item_count: self.items.len() as u32,
            labels: labels.join("/"),
            shirt_type: first.field("product_name").to_uppercase(),
            color: first.field("product_color").trim().to_string(),
            size: first.field("product_size").trim().to_string(),
        }
    }
}

#[derive(Debug)]
struct OrderGroup<'a> {
    id: String,
    sub_items: Vec<SubItemGroup<'a>>,
    by_index: HashMap<String, usize>,
}

/// The grouped view of one input list.
#[derive(Debug)]
pub struct OrderGroups<'a> {
    orders: Vec<OrderGroup<'a>>,
}

impl OrderGroups<'_> {
    /// Emit one row per sub-item group and the grand totals.
    ///
    /// Orders keep first-seen input order; within an order, sub-items are
    /// sorted by [`SortKey`].
    pub fn into_rows(mut self) -> (Vec<ReportRow>, Totals) {
        let mut rows = Vec::new();
        let mut totals = Totals::default();
        for order in &mut self.orders {
            order
                .sub_items
                .sort_by_cached_key(|group| SortKey::from_raw(&group.index));
            for group in &order.sub_items {
                let row = group.reduce(&order.id);
                totals.shirts += 1;
                totals.films += row.item_count;
                rows.push(row);
            }
        }
        (rows, totals)
    }
}

/// Group items by order id, then by sub-item index, preserving first-seen
/// order at both levels. Missing keys default to the empty string, so
/// records without an order id all land in the `""` order.
pub fn group_items(items: &[ItemRecord]) -> OrderGroups<'_> {
    let mut orders: Vec<OrderGroup<'_>> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for item in items {
        let order_id = item.field("order_external_id");
        let index = item.field("index_item");

        let order_pos = match by_id.get(&order_id) {
            Some(&pos) => pos,
            None => {
                orders.push(OrderGroup {
                    id: order_id.clone(),
                    sub_items: Vec::new(),
                    by_index: HashMap::new(),
                });
                by_id.insert(order_id, orders.len() - 1);
                orders.len() - 1
            }
        };

        let order = &mut orders[order_pos];
        let group_pos = match order.by_index.get(&index) {
            Some(&pos) => pos,
            None => {
                order.sub_items.push(SubItemGroup {
                    index: index.clone(),
                    items: Vec::new(),
                });
                order.by_index.insert(index, order.sub_items.len() - 1);
                order.sub_items.len() - 1
            }
        };
        order.sub_items[group_pos].items.push(item);
    }

    OrderGroups { orders }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    /// Strategy generating small item lists with colliding keys so groups
    /// of more than one record actually occur.
    fn arbitrary_items() -> impl Strategy<Value = Vec<ItemRecord>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["O1", "O2", "O3", ""]),
                prop::sample::select(vec!["1", "2", "10", "x", ""]),
                prop::option::of(prop::sample::select(vec!["Front", "Back", "Sleeve", " "])),
            ),
            0..20,
        )
        .prop_map(|triples| {
            triples
                .into_iter()
                .map(|(order, index, label)| {
                    let mut value = json!({
                        "order_external_id": order,
                        "index_item": index,
                        "product_name": "Tee"
                    });
                    if let Some(label) = label {
                        value["label"] = Value::String(label.to_string());
                    }
                    match value {
                        Value::Object(fields) => ItemRecord::new(fields),
                        _ => unreachable!(),
                    }
                })
                .collect()
        })
    }

    /// Items whose label mirrors their index, so row labels expose the
    /// per-group key. Indexes avoid whitespace for that reason.
    fn arbitrary_labeled_items() -> impl Strategy<Value = Vec<ItemRecord>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["O1", "O2", "O3"]),
                prop::sample::select(vec!["1", "2", "10", "30", "x", "extra"]),
            ),
            0..20,
        )
        .prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(order, index)| {
                    let value = json!({
                        "order_external_id": order,
                        "index_item": index,
                        "label": index
                    });
                    match value {
                        Value::Object(fields) => ItemRecord::new(fields),
                        _ => unreachable!(),
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn films_count_every_input_item_exactly_once(items in arbitrary_items()) {
            let (rows, totals) = group_items(&items).into_rows();
            let row_sum: u32 = rows.iter().map(|r| r.item_count).sum();
            prop_assert_eq!(totals.films, row_sum);
            prop_assert_eq!(totals.films as usize, items.len());
        }

        #[test]
        fn shirts_count_distinct_key_pairs(items in arbitrary_items()) {
            let pairs: HashSet<(String, String)> = items
                .iter()
                .map(|i| (i.field("order_external_id"), i.field("index_item")))
                .collect();
            let (rows, totals) = group_items(&items).into_rows();
            prop_assert_eq!(totals.shirts as usize, pairs.len());
            prop_assert_eq!(rows.len(), pairs.len());
        }

        #[test]
        fn totals_and_label_sets_survive_input_reversal(items in arbitrary_items()) {
            let (rows, totals) = group_items(&items).into_rows();
            let reversed: Vec<ItemRecord> = items.iter().rev().cloned().collect();
            let (rev_rows, rev_totals) = group_items(&reversed).into_rows();

            prop_assert_eq!(totals, rev_totals);

            // Label aggregation is a set reduction, so each group's joined
            // labels are independent of input order.
            let mut keyed: Vec<(String, u32, String)> = rows
                .into_iter()
                .map(|r| (r.order_id, r.item_count, r.labels))
                .collect();
            let mut rev_keyed: Vec<(String, u32, String)> = rev_rows
                .into_iter()
                .map(|r| (r.order_id, r.item_count, r.labels))
                .collect();
            keyed.sort();
            rev_keyed.sort();
            prop_assert_eq!(keyed, rev_keyed);
        }

        #[test]
        fn building_twice_is_idempotent(items in arbitrary_items()) {
            let (first_rows, first_totals) = group_items(&items).into_rows();
            let (second_rows, second_totals) = group_items(&items).into_rows();
            prop_assert_eq!(first_rows, second_rows);
            prop_assert_eq!(first_totals, second_totals);
        }

        #[test]
        fn sub_items_emit_in_sort_key_order(items in arbitrary_labeled_items()) {
            // These items carry their index as the label, so each emitted
            // row reveals its own sort key through the labels column.
            let (rows, _) = group_items(&items).into_rows();
            let mut pos = 0;
            while pos < rows.len() {
                let order_id = rows[pos].order_id.clone();
                let run: Vec<SortKey> = rows[pos..]
                    .iter()
                    .take_while(|r| r.order_id == order_id)
                    .map(|r| SortKey::from_raw(&r.labels))
                    .collect();
                prop_assert!(run.windows(2).all(|w| w[0] <= w[1]));
                pos += run.len();
            }
        }
    }
}
