//! Identifier types for task orchestration records.
//!
//! Every identifier is a database-assigned `BIGSERIAL`, so ordering by id is
//! the same as ordering by insertion.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw row identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a task row.
    TaskId
);
row_id!(
    /// Identifier of a task run row.
    TaskRunId
);
row_id!(
    /// Identifier of a task check run row.
    TaskCheckRunId
);
row_id!(
    /// Identifier of the principal that created or last updated a row.
    PrincipalId
);
row_id!(
    /// Identifier of the pipeline a task belongs to.
    PipelineId
);
row_id!(
    /// Identifier of the pipeline stage a task belongs to.
    StageId
);
row_id!(
    /// Identifier of the database instance a task targets.
    InstanceId
);
row_id!(
    /// Identifier of the database a task targets, when it targets one.
    DatabaseId
);
