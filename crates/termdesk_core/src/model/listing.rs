//! List query parameters shared by the HTTP transport and the endpoint.
//!
//! # Invariants
//! - Only whitelisted sort columns reach SQL; anything else falls back to
//!   the default column.
//! - `per_page` is clamped to `1..=PER_PAGE_MAX`; `page` is 1-based.

use url::form_urlencoded;

pub const PER_PAGE_DEFAULT: u32 = 25;
pub const PER_PAGE_MAX: u32 = 100;

/// Sortable columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Label,
}

impl SortColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "label" => Some(Self::Label),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Raw, optional list parameters as they appear on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Normalized list query consumed by repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: SortColumn,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListParams::default().normalize()
    }
}

impl ListQuery {
    /// Row offset for the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

impl ListParams {
    /// Parses a raw query string such as `sort=label&direction=desc&page=2`.
    ///
    /// Unparseable numbers are ignored rather than rejected.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "sort" => params.sort = Some(value.into_owned()),
                "direction" => params.direction = Some(value.into_owned()),
                "page" => params.page = value.trim().parse().ok(),
                "per_page" => params.per_page = value.trim().parse().ok(),
                _ => {}
            }
        }
        params
    }

    /// Key/value pairs for the parameters that are set.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(direction) = &self.direction {
            pairs.push(("direction", direction.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }

    /// Encodes the set parameters as a query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Applies defaults, the sort whitelist and pagination bounds.
    pub fn normalize(&self) -> ListQuery {
        let sort = self
            .sort
            .as_deref()
            .and_then(SortColumn::parse)
            .unwrap_or_default();
        let direction = self
            .direction
            .as_deref()
            .and_then(SortDirection::parse)
            .unwrap_or_default();
        let page = match self.page {
            Some(0) | None => 1,
            Some(page) => page,
        };
        let per_page = match self.per_page {
            Some(0) | None => PER_PAGE_DEFAULT,
            Some(value) if value > PER_PAGE_MAX => PER_PAGE_MAX,
            Some(value) => value,
        };
        ListQuery {
            sort,
            direction,
            page,
            per_page,
        }
    }
}
