//! `added` token grammar.

use std::str::FromStr;

/// One instruction decoded from an `added` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddedToken {
    /// `GROUP.TABLE`: ensure the group, then add the table.
    Table { group: String, table: String },
    /// `GROUP:N`: ensure the group with `N` shards.
    Shards { group: String, count: u32 },
    /// `GROUP`: ensure the group with one shard.
    Group { group: String },
}

/// Why a token was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,
    #[error("missing group name in {0:?}")]
    MissingGroup(String),
    #[error("missing table name in {0:?}")]
    MissingTable(String),
    #[error("shard count must be a positive integer in {0:?}")]
    InvalidShardCount(String),
}

impl FromStr for AddedToken {
    type Err = TokenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let item = raw.trim();
        if item.is_empty() {
            return Err(TokenError::Empty);
        }

        // `.` wins over `:`, so "a.b:2" names table "b:2" in group "a".
        if item.contains('.') {
            let mut parts = item.split('.');
            let group = parts.next().unwrap_or_default().trim();
            let table = parts.next().unwrap_or_default().trim();
            if group.is_empty() {
                return Err(TokenError::MissingGroup(item.to_string()));
            }
            if table.is_empty() {
                return Err(TokenError::MissingTable(item.to_string()));
            }
            return Ok(Self::Table {
                group: group.to_string(),
                table: table.to_string(),
            });
        }

        if item.contains(':') {
            let mut parts = item.split(':');
            let group = parts.next().unwrap_or_default().trim();
            let count = parts.next().unwrap_or_default().trim();
            if group.is_empty() {
                return Err(TokenError::MissingGroup(item.to_string()));
            }
            return match count.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Self::Shards {
                    group: group.to_string(),
                    count: n,
                }),
                _ => Err(TokenError::InvalidShardCount(item.to_string())),
            };
        }

        Ok(Self::Group {
            group: item.to_string(),
        })
    }
}

impl AddedToken {
    pub fn group(&self) -> &str {
        match self {
            Self::Table { group, .. } | Self::Shards { group, .. } | Self::Group { group } => group,
        }
    }
}
