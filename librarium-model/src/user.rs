use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "unknown" => Ok(Gender::Unknown),
            other => Err(format!("unrecognized gender: {other}")),
        }
    }
}

/// A registry user. Entirely unrelated to the catalog entities: no
/// relations, no delete guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub pkid: UserId,
    pub name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub height: f64,
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_round_trips_through_str() {
        for gender in [Gender::Male, Gender::Female, Gender::Unknown] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
    }
}
