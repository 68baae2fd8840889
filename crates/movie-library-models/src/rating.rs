use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("rating {0} is outside the 1-10 scale")]
    RatingOutOfRange(u8),
}

/// A user's own score for a watched movie (1-10 integer)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct UserRating(u8);

impl UserRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, ModelError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::RatingOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for UserRating {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserRating> for u8 {
    fn from(rating: UserRating) -> Self {
        rating.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(UserRating::new(1).is_ok());
        assert!(UserRating::new(10).is_ok());
        assert_eq!(UserRating::new(0), Err(ModelError::RatingOutOfRange(0)));
        assert_eq!(UserRating::new(11), Err(ModelError::RatingOutOfRange(11)));
    }

    #[test]
    fn test_out_of_range_rejected_on_decode() {
        assert!(serde_json::from_str::<UserRating>("8").is_ok());
        assert!(serde_json::from_str::<UserRating>("42").is_err());
    }
}
