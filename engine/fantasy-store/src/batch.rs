use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collections of the fantasy document database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Events,
    Fighters,
    Fights,
    Leagues,
    Salaries,
    Teams,
    Users,
    Rankings,
    FantasyLeagues,
    FantasyEntries,
    FantasyScores,
    FantasyConfig,
}

impl Collection {
    pub const ALL: [Collection; 12] = [
        Collection::Events,
        Collection::Fighters,
        Collection::Fights,
        Collection::Leagues,
        Collection::Salaries,
        Collection::Teams,
        Collection::Users,
        Collection::Rankings,
        Collection::FantasyLeagues,
        Collection::FantasyEntries,
        Collection::FantasyScores,
        Collection::FantasyConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Fighters => "fighters",
            Collection::Fights => "fights",
            Collection::Leagues => "leagues",
            Collection::Salaries => "salaries",
            Collection::Teams => "teams",
            Collection::Users => "users",
            Collection::Rankings => "rankings",
            Collection::FantasyLeagues => "fantasy_leagues",
            Collection::FantasyEntries => "fantasy_entries",
            Collection::FantasyScores => "fantasy_scores",
            Collection::FantasyConfig => "fantasy_config",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single write inside a batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or fully overwrite a document
    Set { collection: Collection, id: String, doc: Value },
    Delete { collection: Collection, id: String },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Set { collection, .. } | WriteOp::Delete { collection, .. } => *collection,
        }
    }
}

/// Ordered group of writes committed all-or-nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        collection: Collection,
        id: impl Into<String>,
        doc: &T,
    ) -> Result<&mut Self> {
        let doc = serde_json::to_value(doc)?;
        self.ops.push(WriteOp::Set { collection, id: id.into(), doc });
        Ok(self)
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { collection, id: id.into() });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Distinct collections touched by this batch
    pub fn collections(&self) -> Vec<Collection> {
        let mut collections: Vec<Collection> = self.ops.iter().map(WriteOp::collection).collect();
        collections.sort();
        collections.dedup();
        collections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names_are_stable() {
        assert_eq!(Collection::FantasyEntries.as_str(), "fantasy_entries");
        assert_eq!(
            serde_json::to_value(Collection::FantasyConfig).unwrap(),
            serde_json::json!("fantasy_config")
        );
        for collection in Collection::ALL {
            assert_eq!(collection.to_string(), collection.as_str());
        }
    }

    #[test]
    fn test_batch_tracks_touched_collections() {
        let mut batch = WriteBatch::new();
        batch.set(Collection::Salaries, "ev1_f1", &serde_json::json!({"salary": 2600})).unwrap();
        batch.set(Collection::Events, "ev1", &serde_json::json!({})).unwrap();
        batch.delete(Collection::Salaries, "ev1_f2");

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.collections(), vec![Collection::Events, Collection::Salaries]);
    }
}
