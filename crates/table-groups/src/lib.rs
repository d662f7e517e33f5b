//! Table group registry for the live sharding visualization.
//!
//! Groups are created and extended from compact `added` tokens:
//! `GROUP.TABLE`, `GROUP:SHARDCOUNT`, or a bare `GROUP`.

pub mod palette;
pub mod registry;
pub mod token;

pub use registry::{ApplyReport, Table, TableGroupData, TableGroupRegistry};
pub use token::{AddedToken, TokenError};

/// Name of the group that exists from the start and never carries shards.
pub const DEFAULT_GROUP: &str = "default";
