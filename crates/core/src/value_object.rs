//! Value object trait: equality by value, not identity.
//!
//! Every evidence record in the pipeline (snippets, parsed prices, gaps,
//! citations) is a value object: it is created once by the stage that owns it
//! and is never edited afterwards.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two citations
/// pointing at the same URL with the same title and timestamp are the same
/// citation, wherever they were produced.
///
/// The trait requires:
/// - **Clone**: records are handed from stage to stage by value
/// - **PartialEq**: deduplication compares attribute values
/// - **Debug**: records appear in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Append `item` unless an equal value is already present.
///
/// Keeps first-seen order, which is what makes merged collections stable with
/// respect to input order.
pub fn push_unique<T: ValueObject>(items: &mut Vec<T>, item: T) -> bool {
    if items.contains(&item) {
        return false;
    }
    items.push(item);
    true
}
