use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of content a target accepts
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum BackupType {
    /// One file per backup
    #[serde(rename = "single")]
    Single,
    /// Packaged directories (uploaded as `.tar.gz`)
    #[serde(rename = "multi", alias = "folder")]
    Folder,
}

/// Which dimension triggers recycling
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackupRecycleCriteria {
    None,
    Count,
    /// Age in days
    Age,
}

/// What happens to a backup once the recycle threshold is exceeded
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum BackupRecycleAction {
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "recycle")]
    RecycleBin,
}

impl BackupType {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Folder => "multi",
        }
    }
}

impl BackupRecycleCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Count => "count",
            Self::Age => "age",
        }
    }
}

impl BackupRecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::RecycleBin => "recycle",
        }
    }
}

impl FromStr for BackupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" | "folder" => Ok(Self::Folder),
            other => Err(format!("unknown backup type '{}' (expected single or folder)", other)),
        }
    }
}

impl FromStr for BackupRecycleCriteria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "count" => Ok(Self::Count),
            "age" => Ok(Self::Age),
            other => Err(format!(
                "unknown recycle criteria '{}' (expected none, count or age)",
                other
            )),
        }
    }
}

impl FromStr for BackupRecycleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "recycle" | "recycle_bin" | "recycle-bin" => Ok(Self::RecycleBin),
            other => Err(format!(
                "unknown recycle action '{}' (expected delete or recycle)",
                other
            )),
        }
    }
}

impl fmt::Display for BackupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BackupRecycleCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BackupRecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured backup destination with its retention policy
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackupTarget {
    pub id: String,
    pub name: String,
    pub backup_type: BackupType,
    pub recycle_criteria: BackupRecycleCriteria,
    pub recycle_value: i64,
    pub recycle_action: BackupRecycleAction,
    pub location: String,
    pub name_template: String,
    pub deduplicate: bool,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Payload for creating a target
///
/// Every field is required except `alias`. The server assigns the id.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewTarget {
    pub name: String,
    pub backup_type: BackupType,
    pub recycle_criteria: BackupRecycleCriteria,
    pub recycle_value: i64,
    pub recycle_action: BackupRecycleAction,
    pub location: String,
    pub name_template: String,
    pub deduplicate: bool,
    pub alias: Option<String>,
}

/// Full replacement of a target's mutable fields
///
/// There is no `backup_type` here: the type of a target cannot change after
/// creation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetEdit {
    pub name: String,
    pub recycle_criteria: BackupRecycleCriteria,
    pub recycle_value: i64,
    pub recycle_action: BackupRecycleAction,
    pub location: String,
    pub name_template: String,
    pub deduplicate: bool,
    pub alias: Option<String>,
}

impl BackupTarget {
    /// Whether this target accepts packaged directories
    pub fn accepts_folders(&self) -> bool {
        self.backup_type == BackupType::Folder
    }

    /// The fields of this target as a `TargetEdit`, ready to be modified
    pub fn to_edit(&self) -> TargetEdit {
        TargetEdit {
            name: self.name.clone(),
            recycle_criteria: self.recycle_criteria,
            recycle_value: self.recycle_value,
            recycle_action: self.recycle_action,
            location: self.location.clone(),
            name_template: self.name_template.clone(),
            deduplicate: self.deduplicate,
            alias: self.alias.clone(),
        }
    }
}
