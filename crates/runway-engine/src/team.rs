//! Team composition and headcount cost
//!
//! Only active members count toward headcount and salary cost.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::params::ParameterUpdate;

/// Employment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Active => write!(f, "active"),
            MemberStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            other => Err(format!("unknown status '{}' (expected active or inactive)", other)),
        }
    }
}

/// Team member fields, without the identifier assigned on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamMember {
    pub name: String,
    pub role: String,
    pub department: String,
    /// Monthly salary
    pub salary: f64,
    pub start_date: NaiveDate,
    /// Equity percentage
    pub equity: f64,
    pub status: MemberStatus,
}

/// A member of the team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewTeamMember,
}

impl TeamMember {
    pub fn new(id: impl Into<String>, fields: NewTeamMember) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn is_active(&self) -> bool {
        self.fields.status == MemberStatus::Active
    }
}

/// Headcount totals over active members
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub active_members: u32,
    pub total_salary_cost: f64,
    /// Rounded to the whole currency unit; 0 for an empty team
    pub average_salary: f64,
    pub total_equity: f64,
}

impl TeamSummary {
    /// Parameter update carrying headcount and average salary
    pub fn parameter_update(&self) -> ParameterUpdate {
        ParameterUpdate {
            team_size: Some(self.active_members),
            average_salary: Some(self.average_salary),
            ..Default::default()
        }
    }
}

/// Summarize the active team
pub fn summarize(members: &[TeamMember]) -> TeamSummary {
    let active: Vec<&TeamMember> = members.iter().filter(|m| m.is_active()).collect();
    let active_members = active.len() as u32;
    let total_salary_cost: f64 = active.iter().map(|m| m.fields.salary).sum();

    TeamSummary {
        active_members,
        total_salary_cost,
        average_salary: if active_members > 0 {
            (total_salary_cost / f64::from(active_members)).round()
        } else {
            0.0
        },
        total_equity: active.iter().map(|m| m.fields.equity).sum(),
    }
}

/// Headcount and salary cost per department
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department: String,
    pub count: u32,
    pub total_salary: f64,
}

/// Active members grouped by department, highest salary cost first
pub fn department_stats(members: &[TeamMember]) -> Vec<DepartmentStats> {
    let mut totals: HashMap<&str, (u32, f64)> = HashMap::new();

    for member in members.iter().filter(|m| m.is_active()) {
        let entry = totals.entry(member.fields.department.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += member.fields.salary;
    }

    let mut result: Vec<_> = totals
        .into_iter()
        .map(|(department, (count, total_salary))| DepartmentStats {
            department: department.to_string(),
            count,
            total_salary,
        })
        .collect();
    result.sort_by(|a, b| {
        b.total_salary
            .total_cmp(&a.total_salary)
            .then_with(|| a.department.cmp(&b.department))
    });
    result
}

/// Members seeded for first-time users
pub fn default_members() -> Vec<NewTeamMember> {
    let member = |name: &str, role: &str, department: &str, salary: f64, start: (i32, u32), equity: f64| {
        NewTeamMember {
            name: name.to_string(),
            role: role.to_string(),
            department: department.to_string(),
            salary,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, 1).unwrap_or_default(),
            equity,
            status: MemberStatus::Active,
        }
    };

    vec![
        member("John Doe", "CEO", "Leadership", 12_000.0, (2023, 1), 25.0),
        member("Jane Smith", "CTO", "Technology", 10_000.0, (2023, 2), 15.0),
        member("Mike Johnson", "Lead Developer", "Technology", 8_500.0, (2023, 3), 2.0),
        member("Sarah Wilson", "Marketing Manager", "Marketing", 7_000.0, (2023, 4), 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Vec<TeamMember> {
        default_members()
            .into_iter()
            .enumerate()
            .map(|(i, m)| TeamMember::new(format!("m{}", i), m))
            .collect()
    }

    #[test]
    fn test_summary_of_default_team() {
        let summary = summarize(&seeded());
        assert_eq!(summary.active_members, 4);
        assert_eq!(summary.total_salary_cost, 37_500.0);
        assert_eq!(summary.average_salary, 9_375.0);
        assert_eq!(summary.total_equity, 43.0);
    }

    #[test]
    fn test_inactive_members_are_excluded() {
        let mut members = seeded();
        members[0].fields.status = MemberStatus::Inactive;
        let summary = summarize(&members);
        assert_eq!(summary.active_members, 3);
        assert_eq!(summary.total_salary_cost, 25_500.0);
        assert_eq!(summary.average_salary, 8_500.0);
    }

    #[test]
    fn test_empty_team() {
        let summary = summarize(&[]);
        assert_eq!(summary.active_members, 0);
        assert_eq!(summary.average_salary, 0.0);

        let update = summary.parameter_update();
        assert_eq!(update.team_size, Some(0));
        assert_eq!(update.average_salary, Some(0.0));
        assert_eq!(update.monthly_revenue, None);
    }

    #[test]
    fn test_average_salary_is_rounded() {
        let mut members = seeded();
        members.truncate(3);
        // (12000 + 10000 + 8500) / 3 = 10166.67
        assert_eq!(summarize(&members).average_salary, 10_167.0);
    }

    #[test]
    fn test_department_stats_sorted_by_cost() {
        let stats = department_stats(&seeded());
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].department, "Technology");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].total_salary, 18_500.0);
        assert_eq!(stats[2].department, "Marketing");
    }

    #[test]
    fn test_member_json_shape() {
        let member = seeded().remove(0);
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["startDate"], "2023-01-01");
        assert_eq!(json["status"], "active");
        let back: TeamMember = serde_json::from_value(json).unwrap();
        assert_eq!(back, member);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Inactive".parse::<MemberStatus>(), Ok(MemberStatus::Inactive));
        assert_eq!("active".parse::<MemberStatus>(), Ok(MemberStatus::Active));
        assert!("retired".parse::<MemberStatus>().is_err());
    }
}
