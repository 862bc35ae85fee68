use serde::{Deserialize, Serialize};

use crate::ids::PublisherId;

/// A publisher; names are globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub pkid: PublisherId,
    pub name: String,
}
