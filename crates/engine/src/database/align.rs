//! Column alignment: routing incoming columns onto relations
//!
//! Greedy first-fit, left to right. Each existing relation can be claimed by
//! at most one column of a batch. A column nobody accepts gets a new
//! relation, and every registered factory whose restriction accepts the new
//! descriptor attaches an index to it. Identity columns are routed to the
//! identity relation only and never create relations.

use super::{AttachedIndex, RelationId, Store};
use relstore_core::{Error, Result, TypeDescriptor};
use relstore_storage::{MaterializedRelation, Relation};
use tracing::{debug, info};

impl Store {
    /// Compute the target relation of each column, creating relations as needed
    pub(crate) fn align_columns(&mut self, metas: &[TypeDescriptor]) -> Result<Vec<RelationId>> {
        if metas.iter().filter(|m| m.is_identity()).count() > 1 {
            return Err(Error::invalid_input(
                "batch carries more than one identity column",
            ));
        }

        let mut claimed = vec![false; self.relations.len()];
        let mut targets = Vec::with_capacity(metas.len());
        for meta in metas {
            if meta.is_identity() {
                targets.push(RelationId::IDENTITY);
                continue;
            }
            let found = self
                .relations
                .iter()
                .enumerate()
                .find(|(pos, rel)| !claimed[*pos] && rel.type_descriptor().accepts(meta))
                .map(|(pos, _)| pos);
            let pos = match found {
                Some(pos) => pos,
                None => {
                    claimed.push(false);
                    self.add_relation(*meta)?
                }
            };
            claimed[pos] = true;
            targets.push(RelationId::from_position(pos));
        }
        Ok(targets)
    }

    /// Append a relation of type `descriptor` and run the factories over it
    ///
    /// Returns the new relation's position in the relation list.
    fn add_relation(&mut self, descriptor: TypeDescriptor) -> Result<usize> {
        let pos = self.relations.len();
        let rid = RelationId::from_position(pos);
        self.relations
            .push(Box::new(MaterializedRelation::new(descriptor)));
        debug!(target: "relstore::db", relation = %rid, %descriptor, "Created relation");

        let relation: &dyn Relation = self.relations[pos].as_ref();
        for factory in &self.factories {
            if !factory.input_type_restriction().accepts(&descriptor) {
                continue;
            }
            let mut index = factory.instantiate(relation);
            index.initialize(relation)?;
            info!(
                target: "relstore::index",
                factory = factory.name(),
                index = index.name(),
                relation = %rid,
                dynamic = index.is_dynamic(),
                "Attached index"
            );
            self.indexes.push(AttachedIndex {
                relation: rid,
                index,
                stale: false,
            });
        }
        Ok(pos)
    }
}
