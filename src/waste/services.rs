use time::PrimitiveDateTime;
use tracing::{info, warn};

use crate::{
    auth::repo_types::UserId,
    completion::{CompletionClient, ImagePayload},
    error::ApiError,
    waste::{
        category::WasteCategory,
        dto::{HistoryQuery, RecordEntryRequest},
        repo::WasteStore,
        repo_types::{EntryId, HistoryFilter, WasteEntry},
        timestamp::parse_timestamp,
    },
};

const CLASSIFY_PROMPT: &str = "Classify the waste image into one of the following categories: \
     recyclable, compostable, general waste. Answer with the category only.";
const CLASSIFY_MAX_TOKENS: u32 = 10;

/// Asks the completion service to label the image and accepts only the three known labels.
pub async fn classify(
    completion: &dyn CompletionClient,
    image: &ImagePayload,
) -> Result<WasteCategory, ApiError> {
    let answer = completion
        .complete(CLASSIFY_PROMPT, CLASSIFY_MAX_TOKENS, Some(image))
        .await?;
    WasteCategory::from_completion(&answer).ok_or_else(|| {
        warn!(answer = %answer.trim(), "model returned an unknown waste category");
        ApiError::InvalidCategory
    })
}

/// A validated "record entry" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEntry {
    pub user_id: UserId,
    pub category: WasteCategory,
    pub timestamp: PrimitiveDateTime,
}

impl TryFrom<RecordEntryRequest> for NewEntry {
    type Error = ApiError;

    fn try_from(req: RecordEntryRequest) -> Result<Self, Self::Error> {
        let user_id = req
            .user_id
            .ok_or_else(|| ApiError::invalid("user_id is required"))?;
        let category = parse_category(req.category.as_deref())?
            .ok_or_else(|| ApiError::invalid("category is required"))?;
        let raw_ts = non_empty(req.timestamp.as_deref())
            .ok_or_else(|| ApiError::invalid("timestamp is required"))?;
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| ApiError::invalid(format!("Invalid timestamp: {raw_ts}")))?;
        Ok(Self {
            user_id,
            category,
            timestamp,
        })
    }
}

pub async fn record(waste: &dyn WasteStore, entry: NewEntry) -> Result<EntryId, ApiError> {
    let id = waste
        .record(entry.user_id, entry.category, entry.timestamp)
        .await?;
    info!(entry_id = id, user_id = entry.user_id, category = %entry.category, "waste entry recorded");
    Ok(id)
}

/// Splits a history query into the owner and its filter.
pub fn history_filter(query: &HistoryQuery) -> Result<(UserId, HistoryFilter), ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::invalid("user_id is required"))?;
    let start = parse_bound(query.start_date.as_deref(), "start_date")?;
    let end = parse_bound(query.end_date.as_deref(), "end_date")?;
    let category = parse_category(query.category.as_deref())?;
    Ok((user_id, HistoryFilter::new(start, end, category)))
}

pub async fn history(
    waste: &dyn WasteStore,
    user_id: UserId,
    filter: &HistoryFilter,
) -> Result<Vec<WasteEntry>, ApiError> {
    Ok(waste.history(user_id, filter).await?)
}

/// Empty strings count as "not supplied".
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_category(value: Option<&str>) -> Result<Option<WasteCategory>, ApiError> {
    non_empty(value)
        .map(|raw| raw.parse::<WasteCategory>().map_err(|e| ApiError::invalid(format!("{e}"))))
        .transpose()
}

fn parse_bound(value: Option<&str>, field: &str) -> Result<Option<PrimitiveDateTime>, ApiError> {
    non_empty(value)
        .map(|raw| {
            parse_timestamp(raw).ok_or_else(|| ApiError::invalid(format!("Invalid {field}: {raw}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::{
        auth::repo::UserStore,
        completion::testing::ScriptedCompletion,
        db::MemoryStore,
    };

    fn image() -> ImagePayload {
        ImagePayload {
            media_type: "image/png".into(),
            data: "aGk=".into(),
        }
    }

    fn query(user_id: Option<UserId>, start: Option<&str>, end: Option<&str>, category: Option<&str>) -> HistoryQuery {
        HistoryQuery {
            user_id,
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    async fn store_with_users(names: &[&str]) -> MemoryStore {
        let store = MemoryStore::default();
        for name in names {
            store.create(name, "hash").await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn classify_normalises_model_answer() {
        let completion = ScriptedCompletion::replying("  Recyclable \n");
        let category = classify(&completion, &image()).await.unwrap();
        assert_eq!(category, WasteCategory::Recyclable);

        let seen = completion.last().unwrap();
        assert_eq!(seen.max_tokens, CLASSIFY_MAX_TOKENS);
        assert_eq!(seen.image, Some(image()));
        assert!(seen.prompt.contains("general waste"));
    }

    #[tokio::test]
    async fn classify_rejects_free_text() {
        let completion = ScriptedCompletion::replying("plastic bottle");
        let err = classify(&completion, &image()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCategory));
    }

    #[tokio::test]
    async fn classify_surfaces_gateway_failure() {
        let completion = ScriptedCompletion::failing();
        let err = classify(&completion, &image()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }

    #[test]
    fn record_request_requires_every_field() {
        let full = || RecordEntryRequest {
            user_id: Some(1),
            category: Some("recyclable".into()),
            timestamp: Some("2024-01-05T00:00".into()),
        };
        assert_eq!(
            NewEntry::try_from(full()).unwrap(),
            NewEntry {
                user_id: 1,
                category: WasteCategory::Recyclable,
                timestamp: datetime!(2024-01-05 00:00),
            }
        );

        let mut missing_user = full();
        missing_user.user_id = None;
        let mut missing_category = full();
        missing_category.category = Some(String::new());
        let mut bad_category = full();
        bad_category.category = Some("Recyclable".into());
        let mut bad_timestamp = full();
        bad_timestamp.timestamp = Some("last tuesday".into());
        let mut missing_timestamp = full();
        missing_timestamp.timestamp = None;

        for req in [missing_user, missing_category, bad_category, bad_timestamp, missing_timestamp] {
            assert!(matches!(NewEntry::try_from(req), Err(ApiError::InvalidInput(_))));
        }
    }

    #[test]
    fn history_query_single_bound_disables_date_filter() {
        let (user_id, filter) = history_filter(&query(Some(3), Some("2024-01-01"), None, None)).unwrap();
        assert_eq!(user_id, 3);
        assert_eq!(filter.range, None);

        let (_, filter) = history_filter(&query(Some(3), Some("2024-01-01"), Some(""), None)).unwrap();
        assert_eq!(filter.range, None);

        let (_, filter) =
            history_filter(&query(Some(3), Some("2024-01-01"), Some("2024-01-31"), Some("compostable"))).unwrap();
        assert!(filter.range.is_some());
        assert_eq!(filter.category, Some(WasteCategory::Compostable));
    }

    #[test]
    fn history_query_rejects_bad_values() {
        assert!(history_filter(&query(None, None, None, None)).is_err());
        assert!(history_filter(&query(Some(1), Some("soon"), Some("2024-01-01"), None)).is_err());
        assert!(history_filter(&query(Some(1), None, None, Some("plastic"))).is_err());
    }

    #[tokio::test]
    async fn record_for_unknown_user_is_invalid_input() {
        let store = store_with_users(&[]).await;
        let err = record(
            &store,
            NewEntry {
                user_id: 42,
                category: WasteCategory::Recyclable,
                timestamp: datetime!(2024-01-05 00:00),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn history_only_returns_owned_entries_in_time_order() {
        let store = store_with_users(&["alice", "bob"]).await;
        let rows = [
            (1, WasteCategory::Compostable, datetime!(2024-02-05 00:00)),
            (2, WasteCategory::Recyclable, datetime!(2024-01-10 00:00)),
            (1, WasteCategory::Recyclable, datetime!(2024-01-05 00:00)),
            (1, WasteCategory::GeneralWaste, datetime!(2024-01-31 00:00)),
        ];
        for (user_id, category, timestamp) in rows {
            record(&store, NewEntry { user_id, category, timestamp }).await.unwrap();
        }

        let all = history(&store, 1, &HistoryFilter::default()).await.unwrap();
        let stamps: Vec<_> = all.iter().map(|e| e.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                datetime!(2024-01-05 00:00),
                datetime!(2024-01-31 00:00),
                datetime!(2024-02-05 00:00)
            ]
        );
        assert!(all.iter().all(|e| e.user_id == 1));

        let (_, january) = history_filter(&query(Some(1), Some("2024-01-01"), Some("2024-01-31"), None)).unwrap();
        let found = history(&store, 1, &january).await.unwrap();
        assert_eq!(found.len(), 2);

        let (_, recyclable_january) =
            history_filter(&query(Some(1), Some("2024-01-01"), Some("2024-01-31"), Some("recyclable"))).unwrap();
        let found = history(&store, 1, &recyclable_january).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp, datetime!(2024-01-05 00:00));

        let (_, start_only) = history_filter(&query(Some(1), Some("2024-02-01"), None, None)).unwrap();
        assert_eq!(history(&store, 1, &start_only).await.unwrap().len(), 3);

        assert!(history(&store, 99, &HistoryFilter::default()).await.unwrap().is_empty());
    }
}
