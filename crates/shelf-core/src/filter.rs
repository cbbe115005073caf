//! Case-insensitive substring filter over accumulated items.

use crate::item::FieldSelector;

/// Lower-cased search needle. An empty needle matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Needle(String);

impl Needle {
    pub fn new(term: &str) -> Self {
        Self(term.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if any of `fields` contains the needle, ignoring case.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        if self.is_empty() {
            return true;
        }
        fields
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.0))
    }
}

/// Stable filter: keeps the input order, never re-sorts.
pub fn filter_items<I: Clone>(
    items: &[I],
    selector: &dyn FieldSelector<I>,
    needle: &Needle,
) -> Vec<I> {
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| needle.matches(selector.fields(item)))
        .cloned()
        .collect()
}
