//! Group-by-key rollups with optional date windows, and ranking.
//!
//! A [`Rollup`] says how to read a key, a display name, an amount and a date
//! off an item. [`aggregate`] folds a slice into [`AggregateGroup`]s in one
//! pass, keeping a lifetime total plus one total per [`Window`]. [`rank`]
//! orders groups without touching them, so several rankings can be taken
//! from the same aggregation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use woo_storefront_core::DateRange;

/// How items are grouped and measured.
pub trait Rollup<T> {
    /// Grouping key. Items with equal keys land in the same group.
    fn key_of(&self, item: &T) -> String;

    /// Human-readable label for the group, taken from its first item.
    fn display_name_of(&self, item: &T) -> String;

    /// Amount contributed by the item. `None` counts as zero.
    fn amount_of(&self, item: &T) -> Option<Decimal>;

    /// When the item happened. Undated items only count toward
    /// [`Window::AllTime`].
    fn date_of(&self, item: &T) -> Option<DateTime<Utc>>;
}

/// Date filter for a windowed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    AllTime,
    Range(DateRange),
}

impl Window {
    /// Whether an item dated `date` falls inside the window.
    #[must_use]
    pub fn admits(&self, date: Option<DateTime<Utc>>) -> bool {
        match self {
            Self::AllTime => true,
            Self::Range(range) => date.is_some_and(|d| range.contains(d)),
        }
    }
}

impl From<Option<DateRange>> for Window {
    fn from(range: Option<DateRange>) -> Self {
        range.map_or(Self::AllTime, Self::Range)
    }
}

/// Items sharing a key, with their totals.
#[derive(Debug)]
pub struct AggregateGroup<'a, T> {
    pub key: String,
    pub display_name: String,
    /// Sum of every member's amount
    pub lifetime_total: Decimal,
    /// Per-window sums, indexed like the `windows` passed to [`aggregate`]
    pub windowed_totals: Vec<Decimal>,
    /// Per-window member counts
    pub windowed_counts: Vec<usize>,
    pub occurrence_count: usize,
    /// Members in input order
    pub members: Vec<&'a T>,
}

impl<T> Clone for AggregateGroup<'_, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            display_name: self.display_name.clone(),
            lifetime_total: self.lifetime_total,
            windowed_totals: self.windowed_totals.clone(),
            windowed_counts: self.windowed_counts.clone(),
            occurrence_count: self.occurrence_count,
            members: self.members.clone(),
        }
    }
}

impl<T> AggregateGroup<'_, T> {
    /// Total for window `index`, zero if there is no such window.
    #[must_use]
    pub fn windowed_total(&self, index: usize) -> Decimal {
        self.windowed_totals.get(index).copied().unwrap_or_default()
    }

    /// Number of members inside window `index`.
    #[must_use]
    pub fn windowed_count(&self, index: usize) -> usize {
        self.windowed_counts.get(index).copied().unwrap_or_default()
    }
}

/// Group `items` by key in first-occurrence order, totalling each group over
/// its lifetime and over every window.
pub fn aggregate<'a, T, R>(items: &'a [T], rollup: &R, windows: &[Window]) -> Vec<AggregateGroup<'a, T>>
where
    R: Rollup<T> + ?Sized,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<AggregateGroup<'a, T>> = Vec::new();

    for item in items {
        let key = rollup.key_of(item);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(AggregateGroup {
                key,
                display_name: rollup.display_name_of(item),
                lifetime_total: Decimal::ZERO,
                windowed_totals: vec![Decimal::ZERO; windows.len()],
                windowed_counts: vec![0; windows.len()],
                occurrence_count: 0,
                members: Vec::new(),
            });
            groups.len() - 1
        });

        let Some(group) = groups.get_mut(slot) else {
            continue;
        };
        let amount = rollup.amount_of(item).unwrap_or_default();
        let date = rollup.date_of(item);

        group.lifetime_total += amount;
        group.occurrence_count += 1;
        group.members.push(item);
        let slots = group
            .windowed_totals
            .iter_mut()
            .zip(group.windowed_counts.iter_mut());
        for (window, (total, count)) in windows.iter().zip(slots) {
            if window.admits(date) {
                *total += amount;
                *count += 1;
            }
        }
    }

    groups
}

/// Single-window form of [`aggregate`]; `None` means all time.
pub fn aggregate_windowed<'a, T, R>(
    items: &'a [T],
    rollup: &R,
    window: Option<DateRange>,
) -> Vec<AggregateGroup<'a, T>>
where
    R: Rollup<T> + ?Sized,
{
    aggregate(items, rollup, &[Window::from(window)])
}

/// Ranking criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Lifetime,
    /// Windowed total at this index
    Window(usize),
}

impl RankBy {
    fn total<T>(self, group: &AggregateGroup<'_, T>) -> Decimal {
        match self {
            Self::Lifetime => group.lifetime_total,
            Self::Window(index) => group.windowed_total(index),
        }
    }
}

/// The `top_n` groups by descending total. Ties keep input order.
///
/// Takes any iterator of group references, so callers can filter groups
/// without cloning them.
#[must_use]
pub fn rank<'g, 'a: 'g, T: 'g>(
    groups: impl IntoIterator<Item = &'g AggregateGroup<'a, T>>,
    by: RankBy,
    top_n: usize,
) -> Vec<&'g AggregateGroup<'a, T>> {
    let mut ranked: Vec<&AggregateGroup<'a, T>> = groups.into_iter().collect();
    ranked.sort_by(|a, b| by.total(b).cmp(&by.total(a)));
    ranked.truncate(top_n);
    ranked
}
