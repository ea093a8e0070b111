//! Display order management for record collections.
//!
//! Orders are 1-based. Items without an order count as `0`; ties are
//! broken by creation time.

use crate::record::Orderable;
use crate::types::EntityId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Next free order: one past the current maximum, `1` for an empty list.
pub fn next_display_order<T: Orderable>(items: &[T]) -> i64 {
    items.iter().map(Orderable::order).max().map_or(1, |max| max.max(0) + 1)
}

/// Suggested order for a new item.
///
/// Featured items take the position of the first featured item so they
/// surface early; everything else goes to the end.
pub fn suggested_display_order<T: Orderable>(items: &[T], featured: bool) -> i64 {
    if items.is_empty() {
        return 1;
    }
    if !featured {
        return next_display_order(items);
    }
    items
        .iter()
        .filter(|item| item.featured())
        .map(Orderable::order)
        .min()
        .map_or(1, |min| min.max(1))
}

/// Sorts items the way they are displayed, without renumbering.
pub fn sort_for_display<T: Orderable>(items: &mut [T]) {
    items.sort_by_key(|item| (item.order(), item.created_at()));
}

/// Sorts by current order and renumbers sequentially from 1.
pub fn reorder<T: Orderable>(mut items: Vec<T>) -> Vec<T> {
    sort_for_display(&mut items);
    for (i, item) in items.iter_mut().enumerate() {
        item.set_order(i as i64 + 1);
    }
    items
}

/// Inserts `item` at a 1-based position, shifting later items down.
pub fn insert_at_position<T: Orderable>(mut items: Vec<T>, mut item: T, position: i64) -> Vec<T> {
    for existing in items.iter_mut() {
        if existing.order() >= position {
            existing.set_order(existing.order() + 1);
        }
    }
    item.set_order(position);
    items.push(item);
    reorder(items)
}

/// Moves the item with `id` to a 1-based position and renumbers.
///
/// Unknown ids leave the list untouched.
pub fn move_to_position<T: Orderable>(mut items: Vec<T>, id: &EntityId, position: i64) -> Vec<T> {
    let Some(index) = items.iter().position(|item| item.id() == id) else {
        return items;
    };
    let moved = items.remove(index);
    let target = usize::try_from(position.saturating_sub(1))
        .unwrap_or(0)
        .min(items.len());
    items.insert(target, moved);
    for (i, item) in items.iter_mut().enumerate() {
        item.set_order(i as i64 + 1);
    }
    items
}

/// Summary of a collection's display orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total: usize,
    pub min_order: i64,
    pub max_order: i64,
    /// True when some order between min and max is unused
    pub has_gaps: bool,
    /// Orders used by more than one item, ascending
    pub duplicates: Vec<i64>,
}

/// Computes gaps and duplicates in the display orders.
pub fn order_statistics<T: Orderable>(items: &[T]) -> OrderStatistics {
    if items.is_empty() {
        return OrderStatistics::default();
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.order()).or_default() += 1;
    }

    let min_order = counts.keys().next().copied().unwrap_or_default();
    let max_order = counts.keys().next_back().copied().unwrap_or_default();
    let span = usize::try_from(max_order - min_order + 1).unwrap_or(usize::MAX);

    OrderStatistics {
        total: items.len(),
        min_order,
        max_order,
        has_gaps: counts.len() < span,
        duplicates: counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(order, _)| order)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Course;

    fn course(id: &str, order: i64, featured: bool, created_at: i64) -> Course {
        Course {
            id: id.into(),
            order,
            featured,
            created_at,
            ..Default::default()
        }
    }

    fn ids(items: &[Course]) -> Vec<&str> {
        items.iter().map(|c| c.id.as_str()).collect()
    }

    fn orders(items: &[Course]) -> Vec<i64> {
        items.iter().map(|c| c.order).collect()
    }

    #[test]
    fn test_next_display_order() {
        assert_eq!(next_display_order::<Course>(&[]), 1);
        let items = vec![course("a", 3, false, 0), course("b", 7, false, 0)];
        assert_eq!(next_display_order(&items), 8);
        assert_eq!(next_display_order(&[course("a", 0, false, 0)]), 1);
    }

    #[test]
    fn test_suggested_display_order() {
        let items = vec![
            course("a", 1, false, 0),
            course("b", 4, true, 0),
            course("c", 6, true, 0),
        ];
        assert_eq!(suggested_display_order(&items, true), 4);
        assert_eq!(suggested_display_order(&items, false), 7);

        let plain = vec![course("a", 5, false, 0)];
        assert_eq!(suggested_display_order(&plain, true), 1);
        assert_eq!(suggested_display_order::<Course>(&[], false), 1);
    }

    #[test]
    fn test_reorder_breaks_ties_by_creation() {
        let items = vec![
            course("late", 2, false, 20),
            course("first", 1, false, 99),
            course("early", 2, false, 10),
        ];
        let items = reorder(items);
        assert_eq!(ids(&items), vec!["first", "early", "late"]);
        assert_eq!(orders(&items), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_at_position() {
        let items = vec![course("a", 1, false, 0), course("b", 2, false, 0)];
        let items = insert_at_position(items, course("new", 0, false, 0), 2);
        assert_eq!(ids(&items), vec!["a", "new", "b"]);
        assert_eq!(orders(&items), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_to_position() {
        let items = vec![
            course("a", 1, false, 0),
            course("b", 2, false, 0),
            course("c", 3, false, 0),
        ];
        let moved = move_to_position(items.clone(), &"c".into(), 1);
        assert_eq!(ids(&moved), vec!["c", "a", "b"]);
        assert_eq!(orders(&moved), vec![1, 2, 3]);

        let clamped = move_to_position(items.clone(), &"a".into(), 99);
        assert_eq!(ids(&clamped), vec!["b", "c", "a"]);

        let unknown = move_to_position(items.clone(), &"zzz".into(), 1);
        assert_eq!(unknown, items);
    }

    #[test]
    fn test_order_statistics() {
        let items = vec![
            course("a", 1, false, 0),
            course("b", 3, false, 0),
            course("c", 3, false, 0),
        ];
        let stats = order_statistics(&items);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.min_order, 1);
        assert_eq!(stats.max_order, 3);
        assert!(stats.has_gaps);
        assert_eq!(stats.duplicates, vec![3]);

        assert_eq!(order_statistics::<Course>(&[]), OrderStatistics::default());
        let tidy = reorder(items);
        assert!(!order_statistics(&tidy).has_gaps);
    }
}
