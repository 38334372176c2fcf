//! Composite identifiers
//!
//! Several resources have no single-field primary key on the backend, so
//! the client derives one by joining the components of the natural key
//! with `/`. Each shape gets its own type: the component count and order
//! differ per resource, and a generic codec would lose that.
//!
//! Encoding escapes the separator inside component values (`%2F`, with
//! `%25` for a literal `%`), so round-tripping holds even when a branch
//! or role name contains a slash.

use crate::error::{ApiError, Result};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '/';

fn escape(field: &str) -> String {
    field.replace('%', "%25").replace(SEPARATOR, "%2F")
}

fn unescape(field: &str) -> String {
    field.replace("%2F", "/").replace("%25", "%")
}

fn encode(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join("/")
}

/// Split an encoded identifier into exactly `expected` components.
///
/// Arity is checked on the escaped form, so a separator embedded in a
/// component value cannot change the part count.
fn decode(id: &str, expected: usize, kind: &str) -> Result<Vec<String>> {
    let parts: Vec<&str> = id.split(SEPARATOR).collect();
    if parts.len() != expected {
        return Err(ApiError::MalformedIdentifier(format!(
            "{kind} identifier {id:?} must have {expected} '/'-separated parts, got {}",
            parts.len()
        )));
    }
    Ok(parts.into_iter().map(unescape).collect())
}

/// Key of a role: `{project}/{branch}/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleId {
    pub project_id: String,
    pub branch_id: String,
    pub name: String,
}

impl RoleId {
    pub fn new(
        project_id: impl Into<String>,
        branch_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            branch_id: branch_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(&[&self.project_id, &self.branch_id, &self.name]))
    }
}

impl FromStr for RoleId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = decode(s, 3, "role")?.into_iter();
        Ok(Self {
            project_id: parts.next().unwrap_or_default(),
            branch_id: parts.next().unwrap_or_default(),
            name: parts.next().unwrap_or_default(),
        })
    }
}

/// Key of a database: `{project}/{branch}/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseId {
    pub project_id: String,
    pub branch_id: String,
    pub name: String,
}

impl DatabaseId {
    pub fn new(
        project_id: impl Into<String>,
        branch_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            branch_id: branch_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(&[&self.project_id, &self.branch_id, &self.name]))
    }
}

impl FromStr for DatabaseId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = decode(s, 3, "database")?.into_iter();
        Ok(Self {
            project_id: parts.next().unwrap_or_default(),
            branch_id: parts.next().unwrap_or_default(),
            name: parts.next().unwrap_or_default(),
        })
    }
}

/// Key of a project permission grant: `{project}/{permission}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPermissionId {
    pub project_id: String,
    pub permission_id: String,
}

impl ProjectPermissionId {
    pub fn new(project_id: impl Into<String>, permission_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            permission_id: permission_id.into(),
        }
    }
}

impl fmt::Display for ProjectPermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(&[&self.project_id, &self.permission_id]))
    }
}

impl FromStr for ProjectPermissionId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = decode(s, 2, "project permission")?.into_iter();
        Ok(Self {
            project_id: parts.next().unwrap_or_default(),
            permission_id: parts.next().unwrap_or_default(),
        })
    }
}

/// Key of an org-level VPC endpoint assignment: `{org}/{region}/{endpoint}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgVpcEndpointId {
    pub org_id: String,
    pub region_id: String,
    pub vpc_endpoint_id: String,
}

impl OrgVpcEndpointId {
    pub fn new(
        org_id: impl Into<String>,
        region_id: impl Into<String>,
        vpc_endpoint_id: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.into(),
            region_id: region_id.into(),
            vpc_endpoint_id: vpc_endpoint_id.into(),
        }
    }
}

impl fmt::Display for OrgVpcEndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            encode(&[&self.org_id, &self.region_id, &self.vpc_endpoint_id])
        )
    }
}

impl FromStr for OrgVpcEndpointId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = decode(s, 3, "org VPC endpoint")?.into_iter();
        Ok(Self {
            org_id: parts.next().unwrap_or_default(),
            region_id: parts.next().unwrap_or_default(),
            vpc_endpoint_id: parts.next().unwrap_or_default(),
        })
    }
}

/// Key of a project-level VPC endpoint restriction: `{endpoint}/{project}`
///
/// Note the component order is the reverse of [`OrgVpcEndpointId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVpcEndpointId {
    pub vpc_endpoint_id: String,
    pub project_id: String,
}

impl ProjectVpcEndpointId {
    pub fn new(vpc_endpoint_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            vpc_endpoint_id: vpc_endpoint_id.into(),
            project_id: project_id.into(),
        }
    }
}

impl fmt::Display for ProjectVpcEndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(&[&self.vpc_endpoint_id, &self.project_id]))
    }
}

impl FromStr for ProjectVpcEndpointId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = decode(s, 2, "project VPC endpoint")?.into_iter();
        Ok(Self {
            vpc_endpoint_id: parts.next().unwrap_or_default(),
            project_id: parts.next().unwrap_or_default(),
        })
    }
}
