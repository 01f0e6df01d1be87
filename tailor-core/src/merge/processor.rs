//! Applies alterations and parameter settings to a fetched catalog and
//! selects the controls an import asks for

use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::prose::ParamPlaceholder;
use super::ControlIdMapper;
use crate::error::{ResolveError, Result};
use crate::model::{Add, Alter, Call, Catalog, Control, Group, Import, Part, SetParam, Subcontrol};

/// Merge processor bound to one fetched catalog
pub struct Processor {
    catalog: Catalog,
    mapper: Arc<dyn ControlIdMapper>,
}

impl Processor {
    pub fn new(catalog: Catalog, mapper: Arc<dyn ControlIdMapper>) -> Self {
        Self { catalog, mapper }
    }

    /// Merge the additions of every alteration into its target control or
    /// subcontrol, wherever it sits in the catalog
    pub fn process_alterations(&mut self, alterations: &[Alter]) -> &Catalog {
        for alt in alterations {
            for group in &mut self.catalog.groups {
                Self::process_addition(alt, &mut group.controls);
            }
        }
        &self.catalog
    }

    /// Merge one alteration into matching controls and subcontrols.
    /// Targets are matched by exact id.
    pub fn process_addition(alt: &Alter, controls: &mut [Control]) {
        for control in controls.iter_mut() {
            if !alt.control_id.is_empty() && control.id == alt.control_id {
                trace!("Merging additions into control {}", control.id);
                merge_additions(&mut control.parts, &alt.additions);
            }

            if alt.subcontrol_id.is_empty() {
                continue;
            }
            for subcontrol in &mut control.subcontrols {
                if subcontrol.id == alt.subcontrol_id {
                    trace!("Merging additions into subcontrol {}", subcontrol.id);
                    merge_additions(&mut subcontrol.parts, &alt.additions);
                }
            }
        }
    }

    /// Renumber every part that shares `incoming`'s class.
    ///
    /// Each such part at position `i` is emitted twice, as `<id>_<i+1>` and
    /// `<id>_<i+2>`. Parts of other classes are kept as they are.
    pub fn modify_parts(incoming: &Part, parts: &[Part]) -> Vec<Part> {
        let mut modified = Vec::with_capacity(parts.len() + 1);
        for (i, part) in parts.iter().enumerate() {
            if part.class != incoming.class {
                modified.push(part.clone());
                continue;
            }
            for n in [i + 1, i + 2] {
                let mut renumbered = part.clone();
                renumbered.id = format!("{}_{}", part.id, n);
                modified.push(renumbered);
            }
        }
        modified
    }

    /// Substitute each parameter's first constraint value into the prose
    /// of the parts of the control owning that parameter
    pub fn process_set_params(&mut self, set_params: &[SetParam]) -> &Catalog {
        for sp in set_params {
            let Some(value) = sp.value() else {
                trace!("Parameter {} has no constraint value", sp.id);
                continue;
            };
            let placeholder = match ParamPlaceholder::new(&sp.id) {
                Ok(placeholder) => placeholder,
                Err(e) => {
                    warn!("Skipping parameter '{}': {}", sp.id, e);
                    continue;
                }
            };
            let control_id = self.mapper.map_to_control_id(&sp.id);

            for group in &mut self.catalog.groups {
                for control in group.controls.iter_mut().filter(|c| c.id == control_id) {
                    for part in &mut control.parts {
                        part.modify_prose(&placeholder, value);
                    }
                }
            }
        }
        &self.catalog
    }

    /// Build a catalog holding only the groups, controls and subcontrols
    /// selected by `import`. Groups with no selected control are omitted.
    pub fn mapped_catalog_for_import(&self, import: &Import) -> Result<Catalog> {
        let mapper = self.mapper.as_ref();
        let calls = &import.include.id_selectors;
        let mut output = self.catalog.header();

        for group in &self.catalog.groups {
            let mut selected = group.header();

            for control in &group.controls {
                for call in calls {
                    if call.selects_subcontrol() && !call.subcontrol_id.is_empty() {
                        let parent_id = mapper.map_to_control_id(&call.subcontrol_id);
                        if control.id.eq_ignore_ascii_case(&parent_id) {
                            let subcontrol = find_subcontrol(call, &group.controls, mapper)?;
                            add_subcontrol_to_controls(&mut selected, control, subcontrol, mapper);
                        }
                    }

                    if !call.control_id.is_empty() && call.control_id.eq_ignore_ascii_case(&control.id)
                    {
                        add_control_to_group(&mut selected, control);
                    }
                }
            }

            if !selected.controls.is_empty() {
                debug!(
                    "Selected {} controls from group '{}'",
                    selected.controls.len(),
                    selected.title
                );
                output.groups.push(selected);
            }
        }

        Ok(output)
    }
}

/// Apply the class-collision rule for every part of every addition
fn merge_additions(parts: &mut Vec<Part>, additions: &[Add]) {
    for add in additions {
        for incoming in &add.parts {
            let collisions = parts.iter().filter(|p| p.class == incoming.class).count();
            if collisions == 0 {
                parts.push(incoming.clone());
                continue;
            }
            // Renumbered once per colliding part present before the merge
            for _ in 0..collisions {
                *parts = Processor::modify_parts(incoming, parts);
            }
        }
    }
}

/// Find the subcontrol a call selects among the controls of one group
pub fn find_subcontrol<'c>(
    call: &Call,
    controls: &'c [Control],
    mapper: &dyn ControlIdMapper,
) -> Result<&'c Subcontrol> {
    let parent_id = mapper.map_to_control_id(&call.subcontrol_id);
    controls
        .iter()
        .filter(|c| c.id.eq_ignore_ascii_case(&parent_id))
        .flat_map(|c| c.subcontrols.iter())
        .find(|sc| sc.id == call.subcontrol_id)
        .ok_or_else(|| ResolveError::UnresolvedSelector {
            subcontrol_id: call.subcontrol_id.clone(),
        })
}

/// Add a control to a group unless a control with the same id is present.
/// The control is added without its subcontrols.
pub fn add_control_to_group(group: &mut Group, control: &Control) {
    if group.controls.iter().any(|c| c.id == control.id) {
        return;
    }
    group.controls.push(control.with_subcontrols(Vec::new()));
}

/// Attach a subcontrol to its parent control in `group`, adding the parent
/// first when it is not there yet
pub fn add_subcontrol_to_controls(
    group: &mut Group,
    control: &Control,
    subcontrol: &Subcontrol,
    mapper: &dyn ControlIdMapper,
) {
    let parent_id = mapper.map_to_control_id(&subcontrol.id);

    match group
        .controls
        .iter_mut()
        .find(|c| c.id.eq_ignore_ascii_case(&parent_id))
    {
        Some(parent) => {
            if !parent.subcontrols.iter().any(|sc| sc.id == subcontrol.id) {
                parent.subcontrols.push(subcontrol.clone());
            }
        }
        None => group
            .controls
            .push(control.with_subcontrols(vec![subcontrol.clone()])),
    }
}
