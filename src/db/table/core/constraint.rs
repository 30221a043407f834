use std::fmt;

use crate::db::table::core::condition::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    Restrict,
}

impl ReferentialAction {
    pub fn code(&self) -> u8 {
        match self {
            ReferentialAction::NoAction => 0,
            ReferentialAction::Cascade => 1,
            ReferentialAction::SetNull => 2,
            ReferentialAction::Restrict => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ReferentialAction::NoAction),
            1 => Some(ReferentialAction::Cascade),
            2 => Some(ReferentialAction::SetNull),
            3 => Some(ReferentialAction::Restrict),
            _ => None,
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
        };
        write!(f, "{}", name)
    }
}

/// Declared only: referential actions are stored and reported, not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
            self.name,
            self.columns.join(", "),
            self.referenced_table,
            self.referenced_columns.join(", "),
            self.on_delete,
            self.on_update
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckConstraint {
    pub name: String,
    pub condition: Condition,
}

impl CheckConstraint {
    /// Expression text as persisted; parses back to the same condition.
    pub fn expression(&self) -> String {
        self.condition.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referential_action_codes_round_trip() {
        for action in [
            ReferentialAction::NoAction,
            ReferentialAction::Cascade,
            ReferentialAction::SetNull,
            ReferentialAction::Restrict,
        ] {
            assert_eq!(ReferentialAction::from_code(action.code()), Some(action));
        }
        assert_eq!(ReferentialAction::from_code(4), None);
    }

    #[test]
    fn foreign_key_renders_its_mapping() {
        let foreign_key = ForeignKey {
            name: "fk_orders_user".to_string(),
            columns: vec!["user_id".to_string()],
            referenced_table: "users".to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
        };
        assert_eq!(
            foreign_key.to_string(),
            "fk_orders_user (user_id) REFERENCES users (id) ON DELETE CASCADE ON UPDATE NO ACTION"
        );
    }
}
