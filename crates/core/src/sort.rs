//! Sort specifications for the video listing.
//!
//! Only whitelisted fields can be sorted on. Each field maps to a fixed SQL
//! column so the order clause never contains caller-supplied text.

/// A sortable video field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Views,
    Duration,
}

impl SortField {
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "updatedAt" | "updated_at" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            "views" => Ok(Self::Views),
            "duration" => Ok(Self::Duration),
            other => Err(crate::Error::InvalidSort(format!(
                "unsupported sortBy field: {other}"
            ))),
        }
    }

    /// Column to order by. Creation order is the insertion sequence; titles
    /// sort on their stored lowercase key so every backend orders them alike.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "seq",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title_key",
            Self::Views => "views",
            Self::Duration => "duration",
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "1" => Ok(Self::Asc),
            "desc" | "-1" => Ok(Self::Desc),
            other => Err(crate::Error::InvalidSort(format!(
                "unsupported sortType: {other}"
            ))),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A complete sort specification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl VideoSort {
    /// Parse optional `sortBy` / `sortType` values. Missing or empty values
    /// fall back to `createdAt` ascending.
    pub fn parse(sort_by: Option<&str>, sort_type: Option<&str>) -> crate::Result<Self> {
        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => SortField::parse(s)?,
            None => SortField::default(),
        };
        let direction = match sort_type.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => SortDirection::parse(s)?,
            None => SortDirection::default(),
        };
        Ok(Self { field, direction })
    }

    /// Render the ORDER BY body. Ties on the chosen field fall back to
    /// insertion order.
    pub fn order_by(&self) -> String {
        let dir = self.direction.as_sql();
        match self.field {
            SortField::CreatedAt => format!("seq {dir}"),
            field => format!("{} {dir}, seq ASC", field.column()),
        }
    }
}
