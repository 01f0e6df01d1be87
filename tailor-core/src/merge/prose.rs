//! Parameter placeholder substitution in part prose
//!
//! Recognised placeholder spellings for a parameter `ac-1_prm_1`:
//!
//! ```text
//! <param ac-1_prm_1>
//! <insert param-id="ac-1_prm_1">     (optionally self-closing)
//! {{ insert: param, ac-1_prm_1 }}
//! ```

use regex::Regex;

use crate::model::Part;

/// Compiled matcher for every placeholder spelling of one parameter
#[derive(Debug, Clone)]
pub struct ParamPlaceholder {
    pattern: Regex,
}

impl ParamPlaceholder {
    pub fn new(param_id: &str) -> Result<Self, regex::Error> {
        let id = regex::escape(param_id);
        let pattern = Regex::new(&format!(
            r#"<param\s+{id}\s*/?>|<insert\s+param-id="{id}"\s*/?>|\{{\{{\s*insert:\s*param,\s*{id}\s*\}}\}}"#
        ))?;
        Ok(Self { pattern })
    }

    /// Replace every placeholder in `prose` with `value`, taken literally
    pub fn substitute(&self, prose: &str, value: &str) -> String {
        self.pattern
            .replace_all(prose, regex::NoExpand(value))
            .into_owned()
    }
}

impl Part {
    /// Substitute `value` for the placeholder in this part's prose and in
    /// the prose of its nested parts
    pub fn modify_prose(&mut self, placeholder: &ParamPlaceholder, value: &str) {
        if let Some(prose) = &self.prose {
            self.prose = Some(placeholder.substitute(prose, value));
        }
        for part in &mut self.parts {
            part.modify_prose(placeholder, value);
        }
    }
}
