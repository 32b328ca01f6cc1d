// 📄 Investigation Reports - type and date-range filtering
//
// Export, download and report authoring are handled elsewhere; this module
// only decides which reports are listed.

use crate::models::{Report, ReportType};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ReportType),
}

impl TypeFilter {
    /// Unknown values show every type
    pub fn parse(value: &str) -> Self {
        match ReportType::parse(value) {
            Some(kind) => TypeFilter::Only(kind),
            None => TypeFilter::All,
        }
    }

    pub fn matches(&self, kind: ReportType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => *wanted == kind,
        }
    }

    pub fn next(&self) -> Self {
        let order = ReportType::ALL;
        match self {
            TypeFilter::All => TypeFilter::Only(order[0]),
            TypeFilter::Only(kind) => match order.iter().position(|k| k == kind) {
                Some(i) if i + 1 < order.len() => TypeFilter::Only(order[i + 1]),
                _ => TypeFilter::All,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "All Types",
            TypeFilter::Only(kind) => kind.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    Last7Days,
    Last30Days,
    Last90Days,
    AllTime,
}

impl DateRange {
    pub fn days(&self) -> Option<i64> {
        match self {
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::Last90Days => Some(90),
            DateRange::AllTime => None,
        }
    }

    /// Accepts "7d", "30d", "90d" or "all"; anything else is the default window
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "30d" => DateRange::Last30Days,
            "90d" => DateRange::Last90Days,
            "all" => DateRange::AllTime,
            _ => DateRange::Last7Days,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "Last 7 days",
            DateRange::Last30Days => "Last 30 days",
            DateRange::Last90Days => "Last 90 days",
            DateRange::AllTime => "All time",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            DateRange::Last7Days => DateRange::Last30Days,
            DateRange::Last30Days => DateRange::Last90Days,
            DateRange::Last90Days => DateRange::AllTime,
            DateRange::AllTime => DateRange::Last7Days,
        }
    }

    /// Window is [reference - days, reference], both ends inclusive.
    /// A start before the earliest representable date leaves the window open below.
    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        let Some(days) = self.days() else {
            return true;
        };
        match reference.checked_sub_signed(Duration::days(days)) {
            Some(start) => date >= start && date <= reference,
            None => date <= reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub type_filter: TypeFilter,
    pub range: DateRange,
    pub reference: NaiveDate,
}

impl ReportQuery {
    pub fn new(reference: NaiveDate) -> Self {
        ReportQuery {
            type_filter: TypeFilter::All,
            range: DateRange::default(),
            reference,
        }
    }

    /// Anchor on the configured date, else on the newest report
    pub fn for_reports(reports: &[Report], configured: Option<NaiveDate>) -> Self {
        let reference = configured
            .or_else(|| latest_created(reports))
            .unwrap_or_default();
        ReportQuery::new(reference)
    }

    pub fn matches(&self, report: &Report) -> bool {
        self.type_filter.matches(report.report_type) && self.range.contains(report.created_at, self.reference)
    }

    pub fn apply<'a>(&self, reports: &'a [Report]) -> Vec<&'a Report> {
        reports.iter().filter(|r| self.matches(r)).collect()
    }
}

pub fn latest_created(reports: &[Report]) -> Option<NaiveDate> {
    reports.iter().map(|r| r.created_at).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleData;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reports() -> Vec<Report> {
        SampleData::snapshot().unwrap().reports
    }

    #[test]
    fn test_default_query_lists_sample_reports() {
        let reports = reports();
        let query = ReportQuery::for_reports(&reports, None);
        assert_eq!(query.reference, date(2024, 1, 15));
        assert_eq!(query.apply(&reports).len(), 4);
    }

    #[test]
    fn test_type_filter() {
        let reports = reports();
        let mut query = ReportQuery::for_reports(&reports, None);

        query.type_filter = TypeFilter::parse("investigation");
        let ids: Vec<&str> = query.apply(&reports).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["RPT-001", "RPT-004"]);

        query.type_filter = TypeFilter::parse("str");
        assert_eq!(query.apply(&reports).len(), 1);

        query.type_filter = TypeFilter::parse("audit");
        assert!(query.apply(&reports).is_empty());

        query.type_filter = TypeFilter::parse("memo");
        assert_eq!(query.type_filter, TypeFilter::All);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let reference = date(2024, 1, 15);
        assert!(DateRange::Last7Days.contains(date(2024, 1, 8), reference));
        assert!(DateRange::Last7Days.contains(reference, reference));
        assert!(!DateRange::Last7Days.contains(date(2024, 1, 7), reference));
        assert!(!DateRange::Last7Days.contains(date(2024, 1, 16), reference));
        assert!(DateRange::Last30Days.contains(date(2023, 12, 16), reference));
        assert!(DateRange::AllTime.contains(date(1999, 1, 1), reference));
    }

    #[test]
    fn test_date_range_at_earliest_date() {
        let reference = NaiveDate::MIN;
        assert!(DateRange::Last7Days.contains(reference, reference));
        assert!(DateRange::Last90Days.contains(reference, reference));

        let reports = reports();
        let query = ReportQuery::for_reports(&reports, Some(reference));
        assert!(query.apply(&reports).is_empty());
    }

    #[test]
    fn test_configured_reference_narrows_window() {
        let reports = reports();
        let query = ReportQuery::for_reports(&reports, Some(date(2024, 1, 25)));
        // 7-day window is 01-18..=01-25, newest report is 01-15
        assert!(query.apply(&reports).is_empty());

        let query = ReportQuery {
            range: DateRange::Last30Days,
            ..query
        };
        assert_eq!(query.apply(&reports).len(), 4);
    }

    #[test]
    fn test_cycles() {
        let mut filter = TypeFilter::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            filter = filter.next();
            seen.push(filter.label());
        }
        assert_eq!(seen, vec!["Investigation", "STR", "Summary", "Audit", "All Types"]);

        assert_eq!(DateRange::AllTime.next(), DateRange::Last7Days);
        assert_eq!(DateRange::parse("90D"), DateRange::Last90Days);
        assert_eq!(DateRange::parse("fortnight"), DateRange::Last7Days);
    }

    #[test]
    fn test_latest_created_on_empty() {
        assert_eq!(latest_created(&[]), None);
        let query = ReportQuery::for_reports(&[], None);
        assert!(query.apply(&[]).is_empty());
    }
}
