//! ID prefix constants.
//!
//! Every id is `{prefix}-{8 hex chars}`, generated by the database
//! (`randomblob(4)`), e.g. `req-a3f8b2c1`.

pub const PREFIX_REQUEST: &str = "req";
pub const PREFIX_ASSIGNMENT: &str = "asg";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_TEAM: &str = "tem";
pub const PREFIX_EQUIPMENT: &str = "eqp";
pub const PREFIX_AUDIT: &str = "aud";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique_and_three_chars() {
        let all = [
            PREFIX_REQUEST,
            PREFIX_ASSIGNMENT,
            PREFIX_USER,
            PREFIX_TEAM,
            PREFIX_EQUIPMENT,
            PREFIX_AUDIT,
        ];
        let mut seen = std::collections::HashSet::new();
        for prefix in all {
            assert_eq!(prefix.len(), 3, "{prefix}");
            assert!(seen.insert(prefix), "duplicate prefix {prefix}");
        }
    }
}
