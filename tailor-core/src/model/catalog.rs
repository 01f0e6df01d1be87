//! Catalog documents: groups of controls, subcontrols and their parts

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Catalog {
    pub fn new(title: impl Into<String>, groups: Vec<Group>) -> Self {
        Self {
            id: None,
            title: title.into(),
            groups,
        }
    }

    /// Empty catalog carrying this catalog's identity
    pub fn header(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Group {
    pub fn new(title: impl Into<String>, controls: Vec<Control>) -> Self {
        Self {
            id: None,
            class: None,
            title: title.into(),
            controls,
        }
    }

    /// Empty group carrying this group's identity
    pub fn header(&self) -> Self {
        Self {
            id: self.id.clone(),
            class: self.class.clone(),
            title: self.title.clone(),
            controls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcontrols: Vec<Subcontrol>,
}

impl Control {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Copy of this control with the given subcontrols in place of its own
    pub fn with_subcontrols(&self, subcontrols: Vec<Subcontrol>) -> Self {
        Self {
            id: self.id.clone(),
            class: self.class.clone(),
            title: self.title.clone(),
            params: self.params.clone(),
            parts: self.parts.clone(),
            subcontrols,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subcontrol {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

impl Subcontrol {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Classed fragment of control content. Prose may reference parameters
/// through placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prose: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

impl Part {
    pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            ..Default::default()
        }
    }

    pub fn with_prose(mut self, prose: impl Into<String>) -> Self {
        self.prose = Some(prose.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_drops_children() {
        let group = Group {
            id: Some("ac".to_string()),
            class: Some("family".to_string()),
            title: "Access Control".to_string(),
            controls: vec![Control::new("ac-1")],
        };
        let header = group.header();
        assert_eq!(header.id.as_deref(), Some("ac"));
        assert!(header.controls.is_empty());
    }

    #[test]
    fn test_parse_catalog_json() {
        let json = r#"{
            "title": "NIST SP800-53",
            "groups": [{
                "controls": [{
                    "id": "at-1",
                    "class": "SP800-53",
                    "title": "Security Awareness and Training Policy and Procedures",
                    "params": [
                        {"id": "at-1_prm_1", "label": "organization-defined personnel or roles"},
                        {"id": "at-1_prm_2", "label": "organization-defined frequency"}
                    ]
                }]
            }]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.title, "NIST SP800-53");
        assert_eq!(catalog.groups[0].controls[0].params.len(), 2);
    }
}
