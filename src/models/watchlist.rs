use serde::{Deserialize, Serialize};

/// Watch status of a single watchlist entry. Never stored independently of
/// progress: it is recomputed from progress and the anime's episode count on
/// every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Planned,
    Watching,
    Completed,
}

impl WatchStatus {
    /// Derives the status from episodes watched vs. total episode count.
    ///
    /// progress = 0 is always planned, even when the anime has zero episodes
    /// on record; otherwise progress >= episodes means completed.
    #[must_use]
    pub const fn derive(progress: i32, episodes: i32) -> Self {
        if progress <= 0 {
            Self::Planned
        } else if progress < episodes {
            Self::Watching
        } else {
            Self::Completed
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Watching => "watching",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single watchlist row, owned by exactly one user.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistEntry {
    pub id: i32,
    pub user_id: i32,
    pub anime_id: i32,
    pub progress: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::entities::watchlist_entries::Model> for WatchlistEntry {
    fn from(model: crate::entities::watchlist_entries::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            anime_id: model.anime_id,
            progress: model.progress,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_progress_is_planned() {
        assert_eq!(WatchStatus::derive(0, 12), WatchStatus::Planned);
        assert_eq!(WatchStatus::derive(0, 0), WatchStatus::Planned);
    }

    #[test]
    fn partial_progress_is_watching() {
        assert_eq!(WatchStatus::derive(1, 12), WatchStatus::Watching);
        assert_eq!(WatchStatus::derive(11, 12), WatchStatus::Watching);
    }

    #[test]
    fn full_or_excess_progress_is_completed() {
        assert_eq!(WatchStatus::derive(12, 12), WatchStatus::Completed);
        assert_eq!(WatchStatus::derive(13, 12), WatchStatus::Completed);
    }

    #[test]
    fn unknown_episode_count_completes_on_any_progress() {
        // Jikan reports ongoing shows with episodes = 0; any progress beyond
        // zero counts as completed, matching the derivation rule p >= e.
        assert_eq!(WatchStatus::derive(1, 0), WatchStatus::Completed);
    }

    #[test]
    fn status_depends_only_on_progress_and_episodes() {
        for episodes in 0..50 {
            for progress in 0..60 {
                let status = WatchStatus::derive(progress, episodes);
                let expected = if progress == 0 {
                    WatchStatus::Planned
                } else if progress < episodes {
                    WatchStatus::Watching
                } else {
                    WatchStatus::Completed
                };
                assert_eq!(status, expected, "p={progress} e={episodes}");
            }
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&WatchStatus::Watching).unwrap(),
            "\"watching\""
        );
    }
}
