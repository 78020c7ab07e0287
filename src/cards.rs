//! Splitting multi-valued logbook fields and expanding them into cards.
//!
//! A logbook cell may describe several sub-observations separated by `;`
//! (`1h;2h;3h`). Every item is parsed independently, and the resulting list
//! is written as a primary card holding the first value followed, when
//! there is more than one value, by numbered cards `PREFIX1..PREFIXN`
//! holding every value in order. The first value therefore appears twice
//! for multi-valued fields and is always available under the plain key.

use crate::error::Result;
use crate::models::{CardSet, CardValue};

/// Item separator inside a raw logbook field
pub const ITEM_SEPARATOR: char = ';';

/// Split `raw` on `;` and parse every item in order
///
/// Items are handed to the parser untrimmed. An empty field produces a
/// single empty item, so whether an empty cell is acceptable is decided by
/// the item parser (see [`or_unknown`]).
pub fn split_and_parse<T, F>(raw: &str, item_parser: F) -> Result<Vec<T>>
where
    F: Fn(&str) -> Result<T>,
{
    raw.split(ITEM_SEPARATOR).map(item_parser).collect()
}

/// Wrap an item parser so blank items yield `sentinel` instead of an error
pub fn or_unknown<T, F>(item_parser: F, sentinel: T) -> impl Fn(&str) -> Result<T>
where
    T: Clone,
    F: Fn(&str) -> Result<T>,
{
    move |item: &str| {
        if item.trim().is_empty() {
            Ok(sentinel.clone())
        } else {
            item_parser(item)
        }
    }
}

/// Expand parsed values into a primary card and, for several values, numbered cards
pub fn expand_cards<T>(values: &[T], primary_key: &str, suffix_key_prefix: &str) -> CardSet
where
    T: Clone + Into<CardValue>,
{
    let mut cards = CardSet::new();
    let Some(first) = values.first() else {
        return cards;
    };

    cards.insert(primary_key, first.clone());
    if values.len() > 1 {
        for (index, value) in values.iter().enumerate() {
            cards.insert(format!("{}{}", suffix_key_prefix, index + 1), value.clone());
        }
    }
    cards
}
