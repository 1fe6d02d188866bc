use serde::{Deserialize, Serialize};

/// Employee role — the sole authorization axis of the dashboard.
///
/// The set is fixed by the platform; anything else coming off the wire or
/// out of persisted state is treated as "no role", never passed through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Distributer,
    Publisher,
    Deliverer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Distributer,
        Role::Publisher,
        Role::Deliverer,
    ];

    /// Strictly parse a raw role value.
    ///
    /// Exact match against the wire spelling; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ADMIN" => Some(Role::Admin),
            "DISTRIBUTER" => Some(Role::Distributer),
            "PUBLISHER" => Some(Role::Publisher),
            "DELIVERER" => Some(Role::Deliverer),
            _ => None,
        }
    }

    /// The wire spelling of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Distributer => "DISTRIBUTER",
            Role::Publisher => "PUBLISHER",
            Role::Deliverer => "DELIVERER",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_role() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(Role::parse("SUPERADMIN"), None);
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("ADMIN "), None);
    }

    #[test]
    fn serde_uses_wire_spelling() {
        assert_eq!(serde_json::to_string(&Role::Deliverer).unwrap(), "\"DELIVERER\"");
        let role: Role = serde_json::from_str("\"PUBLISHER\"").unwrap();
        assert_eq!(role, Role::Publisher);
        assert!(serde_json::from_str::<Role>("\"SUPERADMIN\"").is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: parse accepts exactly the four canonical spellings.
            #[test]
            fn parse_accepts_only_canonical_spellings(raw in "\\PC*") {
                let parsed = Role::parse(&raw);
                let canonical = Role::ALL.iter().any(|r| r.as_str() == raw);
                prop_assert_eq!(parsed.is_some(), canonical);
            }
        }
    }
}
