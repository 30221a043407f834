/// Index metadata. No lookup structure is built; indexes are reported by
/// SHOW INDEXES and EXPLAIN, and unique ones are enforced as constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn belongs_to(&self, table: &str) -> bool {
        self.table.eq_ignore_ascii_case(table)
    }

    pub fn covers(&self, column: &str) -> bool {
        self.columns
            .iter()
            .any(|indexed| indexed.eq_ignore_ascii_case(column))
    }

    pub fn rename_column(&mut self, old_name: &str, new_name: &str) {
        for column in self.columns.iter_mut() {
            if column.eq_ignore_ascii_case(old_name) {
                *column = new_name.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_columns_match_case_insensitively() {
        let mut index = Index {
            name: "idx_users_name".to_string(),
            table: "users".to_string(),
            columns: vec!["name".to_string(), "age".to_string()],
            unique: false,
        };
        assert!(index.matches_name("IDX_USERS_NAME"));
        assert!(index.belongs_to("Users"));
        assert!(index.covers("AGE"));
        index.rename_column("Age", "years");
        assert_eq!(index.columns, vec!["name".to_string(), "years".to_string()]);
    }
}
