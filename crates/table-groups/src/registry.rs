//! In-memory table group registry.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::token::AddedToken;
use crate::{DEFAULT_GROUP, palette};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
}

/// A named group of tables rendered as one box in the visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableGroupData {
    pub name: String,
    pub tables: Vec<Table>,
    pub color: String,
    pub shard_count: u32,
}

impl TableGroupData {
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t.name == table)
    }
}

/// What a batch of tokens changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub groups_created: usize,
    pub tables_added: usize,
    pub dropped: usize,
}

impl ApplyReport {
    pub fn changed(&self) -> bool {
        self.groups_created > 0 || self.tables_added > 0
    }
}

/// Ordered set of table groups, keyed by name.
pub struct TableGroupRegistry {
    groups: Vec<TableGroupData>,
    rng: Box<dyn RngCore + Send>,
}

impl Default for TableGroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TableGroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableGroupRegistry")
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl TableGroupRegistry {
    /// Registry with only the default group, colours from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic colours for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            groups: vec![default_group()],
            rng: Box::new(rng),
        }
    }

    pub fn groups(&self) -> &[TableGroupData] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&TableGroupData> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Owned copy for broadcasting.
    pub fn snapshot(&self) -> Vec<TableGroupData> {
        self.groups.clone()
    }

    /// Drop every group except a fresh default one.
    pub fn reset(&mut self) {
        self.groups = vec![default_group()];
    }

    /// Create a group unless it exists. Returns whether it was created.
    ///
    /// `default` always gets zero shards; other groups get at least one.
    pub fn add_table_group(&mut self, name: &str, shard_count: Option<u32>, color: Option<&str>) -> bool {
        if self.get(name).is_some() {
            return false;
        }

        let shard_count = if name == DEFAULT_GROUP {
            0
        } else {
            shard_count.filter(|n| *n > 0).unwrap_or(1)
        };
        let color = match color {
            Some(c) => c.to_string(),
            None => palette::pick(&mut self.rng).to_string(),
        };

        tracing::debug!(group = name, shard_count, %color, "Table group created");
        self.groups.push(TableGroupData {
            name: name.to_string(),
            tables: Vec::new(),
            color,
            shard_count,
        });
        true
    }

    /// Append a table to an existing group. Returns whether it was added.
    pub fn add_table_to_group(&mut self, group: &str, table: &str) -> bool {
        let Some(entry) = self.groups.iter_mut().find(|g| g.name == group) else {
            return false;
        };
        if entry.has_table(table) {
            return false;
        }
        entry.tables.push(Table {
            name: table.to_string(),
        });
        tracing::debug!(group, table, "Table added to group");
        true
    }

    /// Apply one decoded token.
    pub fn apply(&mut self, token: &AddedToken, report: &mut ApplyReport) {
        match token {
            AddedToken::Table { group, table } => {
                if self.add_table_group(group, None, None) {
                    report.groups_created += 1;
                }
                if self.add_table_to_group(group, table) {
                    report.tables_added += 1;
                }
            }
            AddedToken::Shards { group, count } => {
                if self.add_table_group(group, Some(*count), None) {
                    report.groups_created += 1;
                }
            }
            AddedToken::Group { group } => {
                if self.add_table_group(group, None, None) {
                    report.groups_created += 1;
                }
            }
        }
    }

    /// Decode and apply a row's `added` tokens. Malformed tokens are skipped.
    pub fn process_added_items<S: AsRef<str>>(&mut self, items: &[S]) -> ApplyReport {
        let mut report = ApplyReport::default();
        for item in items {
            match item.as_ref().parse::<AddedToken>() {
                Ok(token) => self.apply(&token, &mut report),
                Err(e) => {
                    tracing::debug!("Ignoring added token: {e}");
                    report.dropped += 1;
                }
            }
        }
        report
    }
}

fn default_group() -> TableGroupData {
    TableGroupData {
        name: DEFAULT_GROUP.to_string(),
        tables: Vec::new(),
        color: palette::DEFAULT_COLOR.to_string(),
        shard_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TableGroupRegistry {
        TableGroupRegistry::with_seed(7)
    }

    #[test]
    fn starts_with_default_group_only() {
        let reg = registry();
        assert_eq!(reg.groups().len(), 1);
        let default = reg.get(DEFAULT_GROUP).unwrap();
        assert_eq!(default.shard_count, 0);
        assert_eq!(default.color, "#4a9eff");
        assert!(default.tables.is_empty());
    }

    #[test]
    fn table_and_shard_tokens() {
        let mut reg = registry();
        let report = reg.process_added_items(&["orders.users", "billing:3"]);

        let orders = reg.get("orders").unwrap();
        assert_eq!(orders.shard_count, 1);
        assert_eq!(orders.tables, vec![Table { name: "users".into() }]);

        let billing = reg.get("billing").unwrap();
        assert_eq!(billing.shard_count, 3);
        assert!(billing.tables.is_empty());

        assert_eq!(
            report,
            ApplyReport {
                groups_created: 2,
                tables_added: 1,
                dropped: 0
            }
        );
    }

    #[test]
    fn malformed_token_leaves_registry_unchanged() {
        let mut reg = registry();
        let before = reg.snapshot();
        let report = reg.process_added_items(&["foo:bar"]);
        assert_eq!(reg.snapshot(), before);
        assert!(reg.get("foo").is_none());
        assert_eq!(report.dropped, 1);
        assert!(!report.changed());
    }

    #[test]
    fn processing_twice_is_idempotent() {
        let tokens = [
            "orders.users",
            "orders.items",
            "billing:3",
            "inventory",
            "default.accounts",
            "orders.users",
            "bad:0",
        ];
        let mut once = registry();
        once.process_added_items(&tokens);

        let mut twice = registry();
        twice.process_added_items(&tokens);
        let second = twice.process_added_items(&tokens);

        assert_eq!(once.groups(), twice.groups());
        assert!(!second.changed());
    }

    #[test]
    fn default_group_never_gets_shards() {
        let mut reg = registry();
        reg.process_added_items(&["default:4", "default.accounts"]);
        let default = reg.get(DEFAULT_GROUP).unwrap();
        assert_eq!(default.shard_count, 0);
        assert!(default.has_table("accounts"));
        assert_eq!(reg.groups().len(), 1);

        reg.reset();
        assert!(!reg.add_table_group(DEFAULT_GROUP, Some(5), None));
        assert_eq!(reg.get(DEFAULT_GROUP).unwrap().shard_count, 0);
    }

    #[test]
    fn first_creation_wins_for_shard_count() {
        let mut reg = registry();
        reg.process_added_items(&["orders.users", "orders:4"]);
        assert_eq!(reg.get("orders").unwrap().shard_count, 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut reg = registry();
        reg.process_added_items(&["zeta", "alpha.t1", "alpha.t0", "mid:2"]);
        let names: Vec<_> = reg.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["default", "zeta", "alpha", "mid"]);
        let tables: Vec<_> = reg.get("alpha").unwrap().tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tables, ["t1", "t0"]);
    }

    #[test]
    fn add_table_to_missing_group_is_noop() {
        let mut reg = registry();
        assert!(!reg.add_table_to_group("ghost", "t"));
        assert!(reg.get("ghost").is_none());
    }

    #[test]
    fn explicit_color_is_kept() {
        let mut reg = registry();
        reg.add_table_group("custom", Some(2), Some("#123456"));
        let g = reg.get("custom").unwrap();
        assert_eq!(g.color, "#123456");
        assert_eq!(g.shard_count, 2);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut reg = registry();
        reg.process_added_items(&["billing:3"]);
        let value = serde_json::to_value(reg.snapshot()).unwrap();
        assert_eq!(value[1]["name"], "billing");
        assert_eq!(value[1]["shardCount"], 3);
    }
}
