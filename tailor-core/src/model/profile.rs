//! Profile documents: imports, selections and modifications

use serde::{Deserialize, Serialize};

use super::{Href, Part};

/// Root unit of resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Ordered imports; output catalogs follow this order
    #[serde(default)]
    pub imports: Vec<Import>,

    /// Absent modify sections deserialize as empty
    #[serde(default)]
    pub modify: Modify,
}

/// Reference to another profile or catalog plus the controls to pull from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Import {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<Href>,

    #[serde(default)]
    pub include: Include,
}

impl Import {
    pub fn new(href: impl Into<Href>) -> Self {
        Self {
            href: Some(href.into()),
            include: Include::default(),
        }
    }

    pub fn with_calls(href: impl Into<Href>, calls: Vec<Call>) -> Self {
        Self {
            href: Some(href.into()),
            include: Include {
                id_selectors: calls,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Include {
    #[serde(default)]
    pub id_selectors: Vec<Call>,
}

/// Selector naming a control or a subcontrol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Call {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub control_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subcontrol_id: String,
}

impl Call {
    pub fn control(id: impl Into<String>) -> Self {
        Self {
            control_id: id.into(),
            subcontrol_id: String::new(),
        }
    }

    pub fn subcontrol(id: impl Into<String>) -> Self {
        Self {
            control_id: String::new(),
            subcontrol_id: id.into(),
        }
    }

    /// A call without a control id selects a subcontrol
    pub fn selects_subcontrol(&self) -> bool {
        self.control_id.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Modify {
    #[serde(default)]
    pub alterations: Vec<Alter>,

    #[serde(default, alias = "param-settings")]
    pub set_params: Vec<SetParam>,
}

/// Modification targeting one control or one subcontrol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Alter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub control_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subcontrol_id: String,

    #[serde(default)]
    pub additions: Vec<Add>,
}

impl Alter {
    pub fn control(id: impl Into<String>, additions: Vec<Add>) -> Self {
        Self {
            control_id: id.into(),
            subcontrol_id: String::new(),
            additions,
        }
    }

    pub fn subcontrol(id: impl Into<String>, additions: Vec<Add>) -> Self {
        Self {
            control_id: String::new(),
            subcontrol_id: id.into(),
            additions,
        }
    }
}

/// Parts (and an optional title) merged into the altered target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Add {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Add {
    pub fn parts(parts: Vec<Part>) -> Self {
        Self { title: None, parts }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetParam {
    pub id: String,

    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl SetParam {
    /// Value substituted into prose, taken from the first constraint
    pub fn value(&self) -> Option<&str> {
        self.constraints.first().map(|c| c.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub value: String,
}
