//! Filter predicates and lazy filtered views.

use super::collection::Entity;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Todo status selector. Ignored for entities without a completion flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    fn accepts(self, completion: Option<bool>) -> bool {
        match (self, completion) {
            (Self::All, _) | (_, None) => true,
            (Self::Active, Some(completed)) => !completed,
            (Self::Completed, Some(completed)) => completed,
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "invalid status filter `{other}`; expected all|active|completed"
            )),
        }
    }
}

/// Predicate set combined with logical AND.
///
/// Empty `search` and empty `category` disable their predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFilter {
    pub search: String,
    pub category: String,
    pub status: StatusFilter,
}

impl EntityFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_empty() && self.status == StatusFilter::All
    }
}

/// Restartable read-only projection of a collection.
///
/// Holds only borrows; every call to [`FilteredView::iter`] re-evaluates the
/// predicates against the current slice.
#[derive(Debug, Clone)]
pub struct FilteredView<'a, T> {
    items: &'a [T],
    filter: &'a EntityFilter,
    needle: String,
}

impl<'a, T: Entity> FilteredView<'a, T> {
    pub(crate) fn new(items: &'a [T], filter: &'a EntityFilter) -> Self {
        Self {
            items,
            filter,
            needle: filter.search.to_lowercase(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().filter(move |item| self.matches(item))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn matches(&self, item: &T) -> bool {
        let text_ok = self.needle.is_empty() || item.matches_text(&self.needle);
        let category_ok = self.filter.category.is_empty() || item.category() == self.filter.category;
        text_ok && category_ok && self.filter.status.accepts(item.completion())
    }
}
