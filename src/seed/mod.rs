//! Scenario preconditions and cleanup.
//!
//! The remote collections are shared, so preconditions are phrased as
//! "at least N": [`ensure_at_least`] tops a collection up with default
//! fixtures until enough records satisfy a predicate, and never deletes
//! anything to get there. [`purge`] empties a collection outright and
//! [`CreatedGuard`] removes only what a scenario itself created.

use crate::{
    constants::{STATUS_CREATED, STATUS_OK},
    model::Entity,
    request::{EntityRequest, RequestError, expect_status},
};
use tracing::{debug, info, warn};

/// Create default records until at least `minimum` listed records satisfy
/// `predicate`, returning the final matching count.
///
/// The count is re-read from the service after every creation, so a default
/// fixture that never satisfies `predicate` is detected instead of looping
/// forever.
///
/// # Errors
///
/// Returns [`RequestError`] when listing or creating fails, when a create
/// does not answer 201, or [`RequestError::NotFound`] when a freshly created
/// default does not raise the matching count.
pub fn ensure_at_least<E, P>(
    request: &EntityRequest<E>,
    minimum: usize,
    predicate: P,
) -> Result<usize, RequestError>
where
    E: Entity,
    P: Fn(&E) -> bool,
{
    let count_matching = || -> Result<usize, RequestError> {
        Ok(request
            .list_entities()?
            .iter()
            .filter(|&entity| predicate(entity))
            .count())
    };
    let mut matching = count_matching()?;
    debug!(kind = E::KIND, matching, minimum, "checked precondition");
    while matching < minimum {
        let response = request.create_default()?;
        expect_status(&response, STATUS_CREATED)?;
        let now = count_matching()?;
        if now <= matching {
            warn!(kind = E::KIND, "default fixture does not satisfy the predicate");
            return Err(RequestError::NotFound {
                kind: E::KIND,
                key: format!("default fixture matching the precondition ({now} of {minimum})"),
            });
        }
        matching = now;
    }
    info!(kind = E::KIND, matching, minimum, "precondition satisfied");
    Ok(matching)
}

/// Delete every listed record, returning how many were removed.
///
/// Records without an id cannot be addressed and are skipped.
///
/// # Errors
///
/// Returns [`RequestError`] when listing fails or a delete does not answer
/// 200. Records deleted before the failure stay deleted.
pub fn purge<E: Entity>(request: &EntityRequest<E>) -> Result<usize, RequestError> {
    let mut deleted = 0;
    for entity in request.list_entities()? {
        let Some(id) = entity.id() else {
            warn!(kind = E::KIND, "skipping record without an id");
            continue;
        };
        let response = request.delete(id)?;
        expect_status(&response, STATUS_OK)?;
        deleted += 1;
    }
    info!(kind = E::KIND, deleted, "purged collection");
    Ok(deleted)
}

/// Tracks records created during a scenario and deletes them on drop.
///
/// Deletion failures while dropping are logged and otherwise ignored.
#[derive(Debug)]
#[must_use]
pub struct CreatedGuard<E: Entity> {
    request: EntityRequest<E>,
    ids: Vec<String>,
}

impl<E: Entity> CreatedGuard<E> {
    /// Start tracking records for `request`'s collection.
    pub const fn new(request: EntityRequest<E>) -> Self {
        Self {
            request,
            ids: Vec::new(),
        }
    }

    /// Record `id` for deletion.
    pub fn track(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Create `entity` and track the id the service assigns.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the create fails, does not answer 201
    /// or returns an unreadable body.
    pub fn create(&mut self, entity: &E) -> Result<E, RequestError> {
        let response = self.request.create(entity)?;
        expect_status(&response, STATUS_CREATED)?;
        let created = self.request.entity_from_response(&response)?;
        if let Some(id) = created.id() {
            self.track(id);
        }
        Ok(created)
    }

    /// Ids currently tracked, oldest first.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Stop tracking everything without deleting it, returning the ids.
    #[must_use]
    pub fn release(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ids)
    }
}

impl<E: Entity> Drop for CreatedGuard<E> {
    fn drop(&mut self) {
        for id in self.ids.drain(..).rev() {
            match self.request.delete(&id) {
                Ok(response) if response.status() == STATUS_OK => {
                    debug!(kind = E::KIND, %id, "removed scenario record");
                }
                Ok(response) => {
                    warn!(
                        kind = E::KIND,
                        %id,
                        status = response.status(),
                        "cleanup delete rejected"
                    );
                }
                Err(err) => warn!(kind = E::KIND, %id, error = %err, "cleanup delete failed"),
            }
        }
    }
}
