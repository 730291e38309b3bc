use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::{auth::repo_types::UserId, waste::category::WasteCategory};

pub type EntryId = i64;

/// One recorded waste observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasteEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub category: WasteCategory,
    pub timestamp: PrimitiveDateTime,
}

#[derive(Debug, FromRow)]
pub struct WasteEntryRow {
    pub id: EntryId,
    pub user_id: UserId,
    pub category: String,
    pub timestamp: PrimitiveDateTime,
}

impl TryFrom<WasteEntryRow> for WasteEntry {
    type Error = anyhow::Error;

    fn try_from(r: WasteEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            category: r.category.parse()?,
            timestamp: r.timestamp,
        })
    }
}

/// Inclusive `[start, end]` range. Only exists when both bounds are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl DateRange {
    /// A single bound yields no range at all rather than a half-open one.
    pub fn from_bounds(
        start: Option<PrimitiveDateTime>,
        end: Option<PrimitiveDateTime>,
    ) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self { start, end }),
            _ => None,
        }
    }

    pub fn contains(&self, ts: PrimitiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Conjunctive filters applied on top of the owner match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub range: Option<DateRange>,
    pub category: Option<WasteCategory>,
}

impl HistoryFilter {
    pub fn new(
        start: Option<PrimitiveDateTime>,
        end: Option<PrimitiveDateTime>,
        category: Option<WasteCategory>,
    ) -> Self {
        Self {
            range: DateRange::from_bounds(start, end),
            category,
        }
    }

    pub fn matches(&self, entry: &WasteEntry) -> bool {
        self.range.map_or(true, |r| r.contains(entry.timestamp))
            && self.category.map_or(true, |c| c == entry.category)
    }
}
