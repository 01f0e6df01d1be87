//! Alteration lookup across the import chain

use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, trace};

use super::base_path::set_base_path;
use super::validator::validate_href;
use super::check_cycle;
use super::store::DocumentStore;
use crate::document::Document;
use crate::error::Result;
use crate::model::{Alter, Call, Profile};

/// Whether `alt` targets what `call` selects.
///
/// An alteration names either a control or a subcontrol. It matches a call
/// naming the same id of the same kind, compared exactly. Alterations with
/// both ids set or both empty never match.
pub fn equate_alter(alt: &Alter, call: &Call) -> bool {
    match (alt.control_id.is_empty(), alt.subcontrol_id.is_empty()) {
        (true, false) => alt.subcontrol_id == call.subcontrol_id,
        (false, true) => alt.control_id == call.control_id,
        _ => false,
    }
}

/// Finds the alteration for every selector of a profile, searching the
/// profile itself first and then its imported profiles, depth first.
pub struct AlterResolver {
    documents: Arc<DocumentStore>,
}

impl AlterResolver {
    pub fn new(documents: Arc<DocumentStore>) -> Self {
        Self { documents }
    }

    /// Collect alterations for every selector of every import, in import
    /// and selector order. Selectors without an alteration anywhere in the
    /// chain are skipped. Any href, fetch or parse failure aborts the lookup.
    pub async fn get_alterations(&self, profile: &Profile) -> Result<Vec<Alter>> {
        let mut alterations = Vec::new();

        for import in &profile.imports {
            for call in &import.include.id_selectors {
                if let Some(alt) = local_alter(profile, call) {
                    trace!("Alteration for {:?} declared locally", call);
                    alterations.push(alt.clone());
                    continue;
                }

                match self.search_imports(profile, call, Vec::new()).await? {
                    Some(alt) => alterations.push(alt),
                    None => trace!("No alteration for {:?} in import chain", call),
                }
            }
        }

        debug!("Collected {} alterations", alterations.len());
        Ok(alterations)
    }

    fn find_alter<'a>(
        &'a self,
        profile: &'a Profile,
        call: &'a Call,
        chain: Vec<String>,
    ) -> BoxFuture<'a, Result<Option<Alter>>> {
        async move {
            if let Some(alt) = local_alter(profile, call) {
                return Ok(Some(alt.clone()));
            }
            self.search_imports(profile, call, chain).await
        }
        .boxed()
    }

    fn search_imports<'a>(
        &'a self,
        profile: &'a Profile,
        call: &'a Call,
        chain: Vec<String>,
    ) -> BoxFuture<'a, Result<Option<Alter>>> {
        async move {
            for import in &profile.imports {
                let href = validate_href(import.href.as_ref())?;
                check_cycle(&chain, href)?;

                let imported = match self.documents.load(href).await?.as_ref() {
                    Document::Profile(p) => set_base_path(p.clone(), href.as_str())?,
                    Document::Catalog(_) => continue,
                };

                let mut next_chain = chain.clone();
                next_chain.push(href.to_string());

                if let Some(alt) = self.find_alter(&imported, call, next_chain).await? {
                    debug!("Found alteration for {:?} in {}", call, href);
                    return Ok(Some(alt));
                }
            }
            Ok(None)
        }
        .boxed()
    }
}

fn local_alter<'p>(profile: &'p Profile, call: &Call) -> Option<&'p Alter> {
    profile
        .modify
        .alterations
        .iter()
        .find(|alt| equate_alter(alt, call))
}
