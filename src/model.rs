use std::fmt;

use nanoid::nanoid;
use serde::{Deserialize, Serialize};

pub const MIN_ADDRESSES: usize = 1;
pub const MAX_ADDRESSES: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn generate() -> Self {
        Self(nanoid!(
            7,
            &[
                '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
                'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V',
                'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l',
                'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
            ]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    /// Identity code: 5 letters, 4 digits, 1 letter.
    pub pan: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    /// Between one and ten entries, in the order they were added.
    pub addresses: Vec<Address>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub postcode: String,
    // city and state are derived from the postcode lookup, never typed.
    // They are set together or not at all.
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl Address {
    pub fn has_locality(&self) -> bool {
        !self.city.is_empty() && !self.state.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = CustomerId::generate();
        let b = CustomerId::generate();
        assert_eq!(a.as_str().len(), 7);
        assert_ne!(a, b);
    }

    #[test]
    fn customer_json_round_trip() {
        let customer = Customer {
            id: CustomerId::generate(),
            pan: "ABCDE1234F".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            mobile: "9876543210".to_string(),
            addresses: vec![Address {
                line1: "1 Marine Drive".to_string(),
                line2: None,
                postcode: "400001".to_string(),
                city: "Mumbai".to_string(),
                state: "Maharashtra".to_string(),
            }],
        };

        let json = serde_json::to_string(&customer).unwrap();
        let parsed: Customer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, customer);
    }

    #[test]
    fn locality_is_all_or_nothing() {
        let mut address = Address::default();
        assert!(!address.has_locality());

        address.city = "Mumbai".to_string();
        address.state = "Maharashtra".to_string();
        assert!(address.has_locality());
    }
}
