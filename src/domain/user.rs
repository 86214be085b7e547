use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;

/// The regional office a participant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Office {
    YopCanaris,
    CocodyInsacc,
    Annani,
    Attingier,
}

impl Office {
    pub const ALL: [Office; 4] = [
        Office::YopCanaris,
        Office::CocodyInsacc,
        Office::Annani,
        Office::Attingier,
    ];

    /// Get the office token used in the store and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Office::YopCanaris => "yop-canaris",
            Office::CocodyInsacc => "cocody-insacc",
            Office::Annani => "annani",
            Office::Attingier => "attingier",
        }
    }

    /// Parse an office token, returning None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        Office::ALL.into_iter().find(|o| o.as_str() == s)
    }

    /// Human-readable office name
    pub fn label(&self) -> &'static str {
        match self {
            Office::YopCanaris => "Bureau Yop Canaris",
            Office::CocodyInsacc => "Bureau Cocody Insacc",
            Office::Annani => "Bureau Annani",
            Office::Attingier => "Bureau Attingier",
        }
    }
}

impl std::fmt::Display for Office {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered contest participant or administrator.
///
/// `current_level` is the level whose active challenge the user may act on;
/// it only moves forward, through the level-advancement operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    /// Distributor code the participant registered with
    pub longrich_code: String,
    pub office: Office,
    pub role: Role,
    pub current_level: u32,
    pub terms_accepted: bool,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_tokens() {
        for office in Office::ALL {
            assert_eq!(Office::parse(office.as_str()), Some(office));
        }
        assert_eq!(Office::parse("abidjan"), None);
    }

    #[test]
    fn test_office_serde_uses_kebab_tokens() {
        let json = serde_json::to_string(&Office::YopCanaris).unwrap();
        assert_eq!(json, "\"yop-canaris\"");
        let back: Office = serde_json::from_str("\"cocody-insacc\"").unwrap();
        assert_eq!(back, Office::CocodyInsacc);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("root"), None);
    }
}
