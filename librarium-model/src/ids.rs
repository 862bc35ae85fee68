use serde::{Deserialize, Serialize};

macro_rules! surrogate_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn as_i64(self) -> i64 {
                self.0
            }

            /// Store-assigned keys are positive serials; zero and negatives
            /// never identify a persisted row.
            pub const fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

surrogate_id! {
    /// Strongly typed surrogate key for books
    BookId
}

surrogate_id! {
    /// Strongly typed surrogate key for authors (and translators, which share
    /// the author table)
    AuthorId
}

surrogate_id! {
    /// Strongly typed surrogate key for publishers
    PublisherId
}

surrogate_id! {
    /// Strongly typed surrogate key for registry users
    UserId
}
