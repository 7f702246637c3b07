//! Role resolution: which column serves as quantity, sales, product, gender
//! and date.
//!
//! Every role is resolved by a [`CandidateSelection`], an ordered candidate
//! list (columns whose keyword flag is set, in table order) paired with a
//! [`SelectionPolicy`]. The first acceptable candidate wins; there is no
//! scoring, so two columns sharing a role's keywords always resolve to the
//! leftmost one.

use std::{collections::BTreeMap, fmt};

use log::{info, warn};
use serde::Serialize;

use crate::{
    coerce,
    data::Table,
    error::{AnalyticsError, Result},
    features::ColumnFeature,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Quantity,
    Sales,
    Product,
    Gender,
    Date,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Quantity,
        Role::Sales,
        Role::Product,
        Role::Gender,
        Role::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Quantity => "quantity",
            Role::Sales => "sales",
            Role::Product => "product",
            Role::Gender => "gender",
            Role::Date => "date",
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        match self {
            Role::Date => SelectionPolicy::FirstParseableDate,
            _ => SelectionPolicy::FirstFlagged,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Take the first candidate.
    FirstFlagged,
    /// Take the first candidate holding at least one parseable date.
    FirstParseableDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSelection {
    pub role: Role,
    pub candidates: Vec<String>,
    pub policy: SelectionPolicy,
}

impl CandidateSelection {
    pub fn from_features(role: Role, features: &[ColumnFeature]) -> Self {
        let candidates = features
            .iter()
            .filter(|feature| feature.keyword_flags.get(role))
            .map(|feature| feature.name.clone())
            .collect();
        Self {
            role,
            candidates,
            policy: role.policy(),
        }
    }

    pub fn select(&self, table: &Table) -> Option<String> {
        match self.policy {
            SelectionPolicy::FirstFlagged => self.candidates.first().cloned(),
            SelectionPolicy::FirstParseableDate => coerce::first_parseable_date_column(
                table,
                self.candidates.iter().map(String::as_str),
            ),
        }
    }
}

/// Resolved role to column mapping. Roles absent from the map are unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct RoleMap {
    resolved: BTreeMap<Role, String>,
}

impl RoleMap {
    pub fn get(&self, role: Role) -> Option<&str> {
        self.resolved.get(&role).map(String::as_str)
    }

    pub fn require(&self, role: Role) -> Result<&str> {
        self.get(role).ok_or(AnalyticsError::RoleNotFound(role))
    }

    pub fn insert(&mut self, role: Role, column: impl Into<String>) {
        self.resolved.insert(role, column.into());
    }

    pub fn unresolved(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| !self.resolved.contains_key(role))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, Option<&str>)> + '_ {
        Role::ALL.into_iter().map(|role| (role, self.get(role)))
    }
}

pub fn resolve_roles(table: &Table, features: &[ColumnFeature]) -> RoleMap {
    let mut roles = RoleMap::default();
    for role in Role::ALL {
        let selection = CandidateSelection::from_features(role, features);
        match selection.select(table) {
            Some(column) => {
                info!("Resolved {role} role to column '{column}'");
                roles.insert(role, column);
            }
            None if selection.candidates.is_empty() => {
                warn!("No column name matches the {role} keywords");
            }
            None => {
                warn!(
                    "None of the {role} candidates {:?} could be used",
                    selection.candidates
                );
            }
        }
    }
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AnalyticsConfig,
        data::{Column, Value},
        features::extract_features,
    };

    fn resolve(table: &Table) -> RoleMap {
        let features = extract_features(table, &AnalyticsConfig::default());
        resolve_roles(table, &features)
    }

    #[test]
    fn first_flagged_policy_takes_leftmost_candidate() {
        let selection = CandidateSelection {
            role: Role::Sales,
            candidates: vec!["total_amount".to_string(), "sale_value".to_string()],
            policy: SelectionPolicy::FirstFlagged,
        };
        assert_eq!(
            selection.select(&Table::default()).as_deref(),
            Some("total_amount")
        );
    }

    #[test]
    fn empty_candidate_list_is_unresolved() {
        let selection = CandidateSelection {
            role: Role::Gender,
            candidates: Vec::new(),
            policy: SelectionPolicy::FirstFlagged,
        };
        assert_eq!(selection.select(&Table::default()), None);
    }

    #[test]
    fn date_role_skips_unparseable_candidates() {
        let table = Table::new(vec![
            Column::new("Order ID", vec![Value::from("ORD-1")]),
            Column::new("Order Date", vec![Value::from("2023-05-01")]),
        ])
        .unwrap();
        let roles = resolve(&table);
        assert_eq!(roles.get(Role::Date), Some("Order Date"));
    }

    #[test]
    fn date_role_unresolved_when_nothing_parses() {
        let table = Table::new(vec![Column::new("Order ID", vec![Value::from("ORD-1")])]).unwrap();
        let roles = resolve(&table);
        assert_eq!(roles.get(Role::Date), None);
        assert_eq!(
            roles.require(Role::Date),
            Err(AnalyticsError::RoleNotFound(Role::Date))
        );
    }

    #[test]
    fn unresolved_lists_missing_roles_in_order() {
        let table = Table::new(vec![Column::new("Quantity", vec![Value::from(1.0)])]).unwrap();
        let roles = resolve(&table);
        assert_eq!(
            roles.unresolved(),
            vec![Role::Sales, Role::Product, Role::Gender, Role::Date]
        );
    }
}
