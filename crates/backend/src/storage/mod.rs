use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use ruuturetki_shared::models::{sort_scoreboard, DailyChallenge, DailyScore, ScoreRecord};
use std::path::Path;
use std::sync::Arc;

/// Challenges keyed by their `YYYY-MM-DD` date.
const CHALLENGES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("daily_challenges");

/// Scores keyed by `date/uuid`, so one date's scores form a contiguous range.
const SCORES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("daily_scores");

pub struct Storage {
    db: Database,
}

fn score_key(date: &str, id: &uuid::Uuid) -> String {
    format!("{}/{}", date, id)
}

impl Storage {
    pub fn open(path: &Path) -> Result<Arc<Self>, String> {
        let db = Database::create(path)
            .map_err(|e| format!("Failed to open database at {}: {}", path.display(), e))?;

        // Ensure tables exist so readers never see a missing table
        let write_txn = db.begin_write().map_err(|e| e.to_string())?;
        {
            write_txn.open_table(CHALLENGES_TABLE).map_err(|e| e.to_string())?;
            write_txn.open_table(SCORES_TABLE).map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;

        Ok(Arc::new(Storage { db }))
    }

    /// Store a new challenge. A date can only have one challenge.
    pub fn save_challenge(&self, challenge: &DailyChallenge) -> Result<(), String> {
        let json = serde_json::to_vec(challenge).map_err(|e| e.to_string())?;

        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        {
            let mut table = write_txn.open_table(CHALLENGES_TABLE).map_err(|e| e.to_string())?;
            if table
                .get(challenge.date.as_str())
                .map_err(|e| e.to_string())?
                .is_some()
            {
                return Err(format!("A challenge for {} already exists", challenge.date));
            }
            table
                .insert(challenge.date.as_str(), json.as_slice())
                .map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn get_challenge(&self, date: &str) -> Result<Option<DailyChallenge>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(CHALLENGES_TABLE).map_err(|e| e.to_string())?;

        match table.get(date).map_err(|e| e.to_string())? {
            Some(value) => serde_json::from_slice(value.value())
                .map(Some)
                .map_err(|e| e.to_string()),
            None => Ok(None),
        }
    }

    /// All challenges, oldest date first.
    pub fn list_challenges(&self) -> Result<Vec<DailyChallenge>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(CHALLENGES_TABLE).map_err(|e| e.to_string())?;

        let mut challenges = Vec::new();
        for entry in table.iter().map_err(|e| e.to_string())? {
            let (_, value) = entry.map_err(|e| e.to_string())?;
            challenges.push(serde_json::from_slice(value.value()).map_err(|e| e.to_string())?);
        }
        Ok(challenges)
    }

    pub fn count_challenges(&self) -> Result<u64, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(CHALLENGES_TABLE).map_err(|e| e.to_string())?;
        table.len().map_err(|e| e.to_string())
    }

    pub fn delete_challenge(&self, date: &str) -> Result<bool, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        let removed = {
            let mut table = write_txn.open_table(CHALLENGES_TABLE).map_err(|e| e.to_string())?;
            let result = table.remove(date).map_err(|e| e.to_string())?;
            result.is_some()
        };
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(removed)
    }

    pub fn save_score(&self, record: &ScoreRecord) -> Result<(), String> {
        let json = serde_json::to_vec(record).map_err(|e| e.to_string())?;
        let key = score_key(&record.score.date, &record.id);

        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        {
            let mut table = write_txn.open_table(SCORES_TABLE).map_err(|e| e.to_string())?;
            table
                .insert(key.as_str(), json.as_slice())
                .map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Scoreboard for one date, best score first.
    pub fn scores_for_date(&self, date: &str) -> Result<Vec<DailyScore>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(SCORES_TABLE).map_err(|e| e.to_string())?;

        // '0' sorts right after '/'
        let start = format!("{}/", date);
        let end = format!("{}0", date);
        let mut records: Vec<ScoreRecord> = Vec::new();
        for entry in table
            .range(start.as_str()..end.as_str())
            .map_err(|e| e.to_string())?
        {
            let (_, value) = entry.map_err(|e| e.to_string())?;
            records.push(serde_json::from_slice(value.value()).map_err(|e| e.to_string())?);
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut scores: Vec<DailyScore> = records.into_iter().map(|r| r.score).collect();
        sort_scoreboard(&mut scores);
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruuturetki_shared::geo::LatLng;
    use ruuturetki_shared::layers::MapLayer;
    use ruuturetki_shared::models::ChallengeRound;

    fn temp_storage() -> (tempfile::TempDir, Arc<Storage>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&dir.path().join("test.redb")).unwrap();
        (dir, storage)
    }

    fn challenge(date: &str) -> DailyChallenge {
        DailyChallenge {
            date: date.to_string(),
            daily_challenge: (0..5)
                .map(|id| ChallengeRound {
                    id,
                    latlng: LatLng::new(60.2, 24.9 + id as f64 * 0.01),
                    zoom: 16,
                })
                .collect(),
            maplayer: MapLayer::Helsinki1943,
            moving: true,
            timed: None,
        }
    }

    fn record(date: &str, name: &str, score: u32, created_at: &str) -> ScoreRecord {
        ScoreRecord {
            id: uuid::Uuid::new_v4(),
            score: DailyScore::with_default_name(date, name, score),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_save_and_get_challenge() {
        let (_dir, storage) = temp_storage();
        let c = challenge("2026-02-11");
        storage.save_challenge(&c).unwrap();
        assert_eq!(storage.get_challenge("2026-02-11").unwrap(), Some(c));
        assert_eq!(storage.get_challenge("2026-02-12").unwrap(), None);
    }

    #[test]
    fn test_coordinates_survive_storage_exactly() {
        let (_dir, storage) = temp_storage();
        let mut c = challenge("2026-02-12");
        c.daily_challenge[2].latlng = LatLng::new(60.170_678_123_456_78, 24.919_999_999_999_998);
        c.daily_challenge[4].latlng = LatLng::new(60.2 + 0.1, 24.9 + 0.03);
        storage.save_challenge(&c).unwrap();
        let stored = storage.get_challenge("2026-02-12").unwrap().unwrap();
        for (saved, read) in c.daily_challenge.iter().zip(&stored.daily_challenge) {
            assert_eq!(saved.latlng.lat.to_bits(), read.latlng.lat.to_bits());
            assert_eq!(saved.latlng.lng.to_bits(), read.latlng.lng.to_bits());
        }
        assert_eq!(storage.list_challenges().unwrap(), vec![c]);
    }

    #[test]
    fn test_duplicate_date_is_rejected() {
        let (_dir, storage) = temp_storage();
        storage.save_challenge(&challenge("2026-02-11")).unwrap();
        let mut other = challenge("2026-02-11");
        other.moving = false;
        let err = storage.save_challenge(&other).unwrap_err();
        assert!(err.contains("already exists"));
        assert!(storage.get_challenge("2026-02-11").unwrap().unwrap().moving);
        assert_eq!(storage.count_challenges().unwrap(), 1);
    }

    #[test]
    fn test_list_challenges_in_date_order() {
        let (_dir, storage) = temp_storage();
        for date in ["2026-03-01", "2026-01-15", "2026-02-11"] {
            storage.save_challenge(&challenge(date)).unwrap();
        }
        let dates: Vec<String> = storage
            .list_challenges()
            .unwrap()
            .into_iter()
            .map(|c| c.date)
            .collect();
        assert_eq!(dates, vec!["2026-01-15", "2026-02-11", "2026-03-01"]);
    }

    #[test]
    fn test_delete_challenge() {
        let (_dir, storage) = temp_storage();
        storage.save_challenge(&challenge("2026-02-11")).unwrap();
        assert!(storage.delete_challenge("2026-02-11").unwrap());
        assert!(!storage.delete_challenge("2026-02-11").unwrap());
        assert_eq!(storage.count_challenges().unwrap(), 0);
    }

    #[test]
    fn test_scores_are_scoped_to_date_and_sorted() {
        let (_dir, storage) = temp_storage();
        storage
            .save_score(&record("2026-02-02", "test1", 35_020, "2026-02-02T10:00:00Z"))
            .unwrap();
        storage
            .save_score(&record("2026-02-02", "test2", 46_020, "2026-02-02T11:00:00Z"))
            .unwrap();
        storage
            .save_score(&record("2026-02-03", "other", 50_000, "2026-02-03T09:00:00Z"))
            .unwrap();
        storage
            .save_score(&record("2026-02-020", "prefix", 1, "2026-02-02T12:00:00Z"))
            .unwrap();

        let scores = storage.scores_for_date("2026-02-02").unwrap();
        let names: Vec<&str> = scores.iter().map(|s| s.player_name.as_str()).collect();
        assert_eq!(names, vec!["test2", "test1"]);
        assert!(storage.scores_for_date("2026-02-04").unwrap().is_empty());
    }

    #[test]
    fn test_equal_scores_keep_submission_order() {
        let (_dir, storage) = temp_storage();
        storage
            .save_score(&record("2026-02-02", "late", 20_000, "2026-02-02T12:00:00Z"))
            .unwrap();
        storage
            .save_score(&record("2026-02-02", "early", 20_000, "2026-02-02T08:00:00Z"))
            .unwrap();
        let scores = storage.scores_for_date("2026-02-02").unwrap();
        assert_eq!(scores[0].player_name, "early");
        assert_eq!(scores[1].player_name, "late");
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.redb");
        {
            let storage = Storage::open(&path).unwrap();
            storage.save_challenge(&challenge("2026-02-11")).unwrap();
        }
        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.count_challenges().unwrap(), 1);
    }
}
