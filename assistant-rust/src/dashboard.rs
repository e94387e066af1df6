use crate::{
    prompt::HistoryKind,
    store::{HistoryEntry, HistoryStore, KeyValueStore, StoreError},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_chats: usize,
    pub content_generated: usize,
    pub code_analyzed: usize,
    pub favorites: usize,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn stats(&self) -> Result<DashboardStats, StoreError> {
        Ok(DashboardStats {
            total_chats: self.history(HistoryKind::Chat)?.len(),
            content_generated: self.history(HistoryKind::Content)?.len(),
            code_analyzed: self.history(HistoryKind::Code)?.len(),
            favorites: self.favorites()?.len(),
        })
    }

    /// Entries from all three lists, newest first, at most `limit` of them.
    pub fn recent_history(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut all = Vec::new();
        for kind in HistoryKind::ALL {
            all.extend(self.history(kind)?);
        }
        // stable, so equal timestamps keep list order
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all.truncate(limit);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        prompt::{CodeTask, ContentTask, TaskType},
        store::{HistoryEntry, HistoryStore, MemoryStore},
    };
    use chrono::{Duration, TimeZone, Utc};

    fn entry_at(task: TaskType, minutes: i64) -> HistoryEntry {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        HistoryEntry {
            timestamp: base + Duration::minutes(minutes),
            ..HistoryEntry::new(task, format!("in {minutes}"), format!("out {minutes}"))
        }
    }

    #[test]
    fn stats_count_each_list() {
        let history = HistoryStore::new(MemoryStore::new());
        history.record(TaskType::Chat, entry_at(TaskType::Chat, 0)).unwrap();
        history.record(TaskType::Chat, entry_at(TaskType::Chat, 1)).unwrap();
        let tweet = TaskType::Content(ContentTask::Tweet);
        history.record(tweet, entry_at(tweet, 2)).unwrap();
        history.add_favorite("tweet", "saved").unwrap();

        let stats = history.stats().unwrap();
        assert_eq!(stats.total_chats, 2);
        assert_eq!(stats.content_generated, 1);
        assert_eq!(stats.code_analyzed, 0);
        assert_eq!(stats.favorites, 1);
    }

    #[test]
    fn recent_history_merges_sorts_and_limits() {
        let history = HistoryStore::new(MemoryStore::new());
        let debug = TaskType::Code(CodeTask::Debug);
        let blog = TaskType::Content(ContentTask::Blog);
        history.record(TaskType::Chat, entry_at(TaskType::Chat, 5)).unwrap();
        history.record(debug, entry_at(debug, 30)).unwrap();
        history.record(blog, entry_at(blog, 10)).unwrap();
        history.record(TaskType::Chat, entry_at(TaskType::Chat, 20)).unwrap();

        let recent = history.recent_history(3).unwrap();
        let inputs: Vec<&str> = recent.iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, ["in 30", "in 20", "in 10"]);
        assert_eq!(recent[0].entry_type, "debug");
    }

    #[test]
    fn empty_store_has_zero_stats() {
        let history = HistoryStore::new(MemoryStore::new());
        assert_eq!(history.stats().unwrap(), super::DashboardStats::default());
        assert!(history.recent_history(super::DEFAULT_RECENT_LIMIT).unwrap().is_empty());
    }
}
