//! Genre types

use serde::{Deserialize, Serialize};

pub type GenreId = i64;

/// A music genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}
