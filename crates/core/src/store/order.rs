use std::str::FromStr;

use keeper_types::OrderDirection;

use crate::KeeperError;

/// Columns folder and file listings may be sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FolderOrderColumn {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

impl FolderOrderColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            FolderOrderColumn::Name => "name",
            FolderOrderColumn::CreatedAt => "created_at",
            FolderOrderColumn::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for FolderOrderColumn {
    type Err = KeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(FolderOrderColumn::Name),
            "created_at" => Ok(FolderOrderColumn::CreatedAt),
            "updated_at" => Ok(FolderOrderColumn::UpdatedAt),
            other => Err(KeeperError::NotValid(format!(
                "unsupported order column: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FolderOrder {
    pub column: FolderOrderColumn,
    pub direction: OrderDirection,
}

impl FolderOrder {
    /// Build an ordering from raw query-string values.
    ///
    /// An unknown column is rejected. An unknown direction falls back to ascending.
    pub fn from_query(column: Option<&str>, direction: Option<&str>) -> Result<Self, KeeperError> {
        let column = column
            .filter(|c| !c.trim().is_empty())
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            column,
            direction: OrderDirection::from_query_lenient(direction),
        })
    }

    pub(crate) fn to_sql(self) -> String {
        format!("{} {}", self.column.as_sql(), self.direction.as_sql())
    }
}

/// Columns alias listings may be sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AliasOrderColumn {
    #[default]
    Key,
    Value,
    Color,
    CreatedAt,
    UpdatedAt,
}

impl AliasOrderColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            AliasOrderColumn::Key => "\"key\"",
            AliasOrderColumn::Value => "\"value\"",
            AliasOrderColumn::Color => "color",
            AliasOrderColumn::CreatedAt => "created_at",
            AliasOrderColumn::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for AliasOrderColumn {
    type Err = KeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "key" => Ok(AliasOrderColumn::Key),
            "value" => Ok(AliasOrderColumn::Value),
            "color" => Ok(AliasOrderColumn::Color),
            "created_at" => Ok(AliasOrderColumn::CreatedAt),
            "updated_at" => Ok(AliasOrderColumn::UpdatedAt),
            other => Err(KeeperError::NotValid(format!(
                "unsupported order column: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AliasOrder {
    pub column: AliasOrderColumn,
    pub direction: OrderDirection,
}

impl AliasOrder {
    pub fn from_query(column: Option<&str>, direction: Option<&str>) -> Result<Self, KeeperError> {
        let column = column
            .filter(|c| !c.trim().is_empty())
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            column,
            direction: OrderDirection::from_query_lenient(direction),
        })
    }

    pub(crate) fn to_sql(self) -> String {
        format!("{} {}", self.column.as_sql(), self.direction.as_sql())
    }
}
