// 👥 Account Analysis - search, risk filter and sorting over the ranked account list

use crate::models::{Account, RiskFilter};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Keep the snapshot order (already risk-ranked upstream)
    #[default]
    Rank,
    AccountId,
    RiskScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// The accounts table controls: search box, risk selector, sortable columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountQuery {
    pub search: String,
    pub risk: RiskFilter,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl AccountQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn with_risk(mut self, risk: RiskFilter) -> Self {
        self.risk = risk;
        self
    }

    /// Clicking the same column flips direction; a new column starts with
    /// its natural direction (ids ascending, scores descending).
    pub fn sort_by(&mut self, key: SortKey) {
        if self.sort == key {
            self.direction = self.direction.flip();
        } else {
            self.sort = key;
            self.direction = match key {
                SortKey::RiskScore => SortDirection::Descending,
                SortKey::Rank | SortKey::AccountId => SortDirection::Ascending,
            };
        }
    }

    pub fn clear(&mut self) {
        *self = AccountQuery::default();
    }

    /// Case-insensitive id substring AND risk filter
    pub fn matches(&self, account: &Account) -> bool {
        let needle = self.search.to_lowercase();
        account.id.to_lowercase().contains(&needle) && self.risk.matches(account.risk_level)
    }

    pub fn apply<'a>(&self, accounts: &'a [Account]) -> Vec<&'a Account> {
        let mut rows: Vec<&Account> = accounts.iter().filter(|a| self.matches(a)).collect();

        let compare = |a: &&Account, b: &&Account| -> Ordering {
            match self.sort {
                SortKey::Rank => Ordering::Equal,
                SortKey::AccountId => a.id.cmp(&b.id),
                SortKey::RiskScore => a.risk_score.total_cmp(&b.risk_score),
            }
        };

        match self.direction {
            SortDirection::Ascending => rows.sort_by(compare),
            SortDirection::Descending => rows.sort_by(|a, b| compare(b, a)),
        }
        rows
    }
}

/// Highest-risk accounts first, ties keep snapshot order
pub fn top_risk(accounts: &[Account], limit: usize) -> Vec<&Account> {
    let mut ranked: Vec<&Account> = accounts.iter().collect();
    ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleData;

    fn accounts() -> Vec<Account> {
        SampleData::snapshot().unwrap().accounts
    }

    fn ids(rows: &[&Account]) -> Vec<String> {
        rows.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_default_query_keeps_snapshot_order() {
        let accounts = accounts();
        let rows = AccountQuery::new().apply(&accounts);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].id, "ACC-7821");
        assert_eq!(rows[5].id, "ACC-8901");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let accounts = accounts();
        let rows = AccountQuery::new().with_search("acc-78").apply(&accounts);
        assert_eq!(ids(&rows), vec!["ACC-7821"]);

        let rows = AccountQuery::new().with_search("zzz").apply(&accounts);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_search_and_risk_combine() {
        let accounts = accounts();
        let rows = AccountQuery::new().with_risk(RiskFilter::Medium).apply(&accounts);
        assert_eq!(ids(&rows), vec!["ACC-9012", "ACC-5678"]);

        let rows = AccountQuery::new()
            .with_risk(RiskFilter::Medium)
            .with_search("56")
            .apply(&accounts);
        assert_eq!(ids(&rows), vec!["ACC-5678"]);
    }

    #[test]
    fn test_sort_toggles() {
        let accounts = accounts();
        let mut query = AccountQuery::new();

        query.sort_by(SortKey::RiskScore);
        assert_eq!(query.direction, SortDirection::Descending);
        assert_eq!(query.apply(&accounts)[0].id, "ACC-7821");

        query.sort_by(SortKey::RiskScore);
        assert_eq!(query.direction, SortDirection::Ascending);
        assert_eq!(query.apply(&accounts)[0].id, "ACC-8901");

        query.sort_by(SortKey::AccountId);
        assert_eq!(query.direction, SortDirection::Ascending);
        assert_eq!(
            ids(&query.apply(&accounts)),
            vec!["ACC-2345", "ACC-3456", "ACC-5678", "ACC-7821", "ACC-8901", "ACC-9012"]
        );

        query.clear();
        assert_eq!(query, AccountQuery::default());
    }

    #[test]
    fn test_top_risk() {
        let accounts = accounts();
        let top = top_risk(&accounts, 5);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].risk_score >= w[1].risk_score));
        assert!(top.iter().all(|a| a.id != "ACC-8901"));
        assert_eq!(top_risk(&accounts, 100).len(), 6);
    }
}
