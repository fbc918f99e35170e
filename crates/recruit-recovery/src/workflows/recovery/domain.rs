use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The unit of assignment: the same candidate id may exist once per city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CandidateKey {
    pub candidate_id: CandidateId,
    pub city_id: CityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Recruiter,
    Developer,
    Other,
}

impl EmployeeRole {
    /// Roles that take part in distribution, in phase order.
    pub const fn distributed() -> [Self; 2] {
        [Self::Recruiter, Self::Developer]
    }

    /// Maps a CRM role label onto a role. The CRM stores Russian labels;
    /// English labels are accepted as well.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "recruiter" | "рекрутер" => Self::Recruiter,
            "developer" | "разработчик" => Self::Developer,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Recruiter => "Recruiter",
            Self::Developer => "Developer",
            Self::Other => "Other",
        }
    }

    /// Base name of the tabular report emitted for this role.
    pub const fn report_name(self) -> &'static str {
        match self {
            Self::Recruiter => "recruiter_report",
            Self::Developer => "developer_report",
            Self::Other => "other_report",
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    pub city_id: CityId,
    pub tested_at: Option<NaiveDateTime>,
}

impl Candidate {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            candidate_id: self.id,
            city_id: self.city_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: EmployeeRole,
    pub efficiency: i64,
    pub attached_candidates_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub candidate_id: CandidateId,
    pub city_id: CityId,
    pub employee_id: EmployeeId,
    pub created_at: Option<NaiveDateTime>,
}

impl Assignment {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            candidate_id: self.candidate_id,
            city_id: self.city_id,
        }
    }

    pub fn created_before(&self, cutoff: NaiveDateTime) -> bool {
        self.created_at.is_some_and(|created| created < cutoff)
    }

    pub fn created_since(&self, cutoff: NaiveDateTime) -> bool {
        self.created_at.is_some_and(|created| created >= cutoff)
    }
}
