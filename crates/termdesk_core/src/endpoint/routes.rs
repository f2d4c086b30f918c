//! Path and method routing for the contract term resource.

use crate::endpoint::policy::ResourceAction;
use crate::model::contract_term::ContractTermId;
use http::Method;

/// Default mount point of the resource.
pub const RESOURCE_PATH: &str = "/contract_terms";

/// Resolved resource route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Create,
    Update(ContractTermId),
    Destroy(ContractTermId),
}

impl Route {
    pub fn action(self) -> ResourceAction {
        match self {
            Self::Index => ResourceAction::Index,
            Self::Create => ResourceAction::Create,
            Self::Update(_) => ResourceAction::Update,
            Self::Destroy(_) => ResourceAction::Destroy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    NotFound,
    MethodNotAllowed,
}

/// Resolves `method path` relative to `mount`.
///
/// Accepts an optional `.json` suffix on both collection and member paths.
pub fn resolve(mount: &str, method: &Method, path: &str) -> Result<Route, RouteError> {
    let mount = mount.trim_end_matches('/');
    let rest = path.strip_prefix(mount).ok_or(RouteError::NotFound)?;
    let rest = rest.strip_suffix(".json").unwrap_or(rest);

    match rest {
        "" | "/" => match *method {
            Method::GET => Ok(Route::Index),
            Method::POST => Ok(Route::Create),
            _ => Err(RouteError::MethodNotAllowed),
        },
        member => {
            let id = parse_member_id(member)?;
            match *method {
                Method::PUT | Method::PATCH => Ok(Route::Update(id)),
                Method::DELETE => Ok(Route::Destroy(id)),
                _ => Err(RouteError::MethodNotAllowed),
            }
        }
    }
}

/// Member path for one record, e.g. `/contract_terms/7`.
pub fn member_path(mount: &str, id: ContractTermId) -> String {
    format!("{}/{id}", mount.trim_end_matches('/'))
}

fn parse_member_id(member: &str) -> Result<ContractTermId, RouteError> {
    let segment = member.strip_prefix('/').ok_or(RouteError::NotFound)?;
    if segment.is_empty() || segment.contains('/') {
        return Err(RouteError::NotFound);
    }
    segment.parse().map_err(|_| RouteError::NotFound)
}
