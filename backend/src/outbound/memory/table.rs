//! One entity table: committed rows plus per-transaction staged changes.
//!
//! Reads borrow rows under the table lock and clone only what they return.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{MemoryTransaction, Participant, StagedLinks, TransactionId, lock};
use crate::domain::ports::{RepositoryError, TransactionError};
use crate::domain::{Entity, EntityId, Reference, UniqueKey};

enum Change<E: Entity> {
    Insert(E),
    Update(E),
    Delete(E::Id),
}

impl<E: Entity> Change<E> {
    fn target(&self) -> E::Id {
        match self {
            Self::Insert(row) | Self::Update(row) => row.id(),
            Self::Delete(id) => *id,
        }
    }
}

struct TableState<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    next_id: i32,
    staged: HashMap<TransactionId, Vec<Change<E>>>,
}

impl<E: Entity> TableState<E> {
    fn changes(&self, transaction: Option<TransactionId>) -> &[Change<E>] {
        transaction
            .and_then(|id| self.staged.get(&id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Committed rows overlaid with `transaction`'s staged changes.
    ///
    /// Updates whose target has disappeared are skipped here and reported by
    /// [`Participant::check`].
    fn view(&self, transaction: Option<TransactionId>) -> BTreeMap<E::Id, &E> {
        let mut view: BTreeMap<E::Id, &E> =
            self.rows.iter().map(|(id, row)| (*id, row)).collect();
        for change in self.changes(transaction) {
            match change {
                Change::Insert(row) => {
                    view.insert(row.id(), row);
                }
                Change::Update(row) => {
                    if let Some(slot) = view.get_mut(&row.id()) {
                        *slot = row;
                    }
                }
                Change::Delete(id) => {
                    view.remove(id);
                }
            }
        }
        view
    }

    /// One row as `transaction` sees it.
    fn get(&self, transaction: Option<TransactionId>, id: E::Id) -> Option<&E> {
        self.changes(transaction)
            .iter()
            .filter(|change| change.target() == id)
            .fold(self.rows.get(&id), |current, change| match change {
                Change::Insert(row) => Some(row),
                Change::Update(row) => current.map(|_| row),
                Change::Delete(_) => None,
            })
    }

    fn inserted(&self, transaction: TransactionId, id: E::Id) -> bool {
        self.changes(Some(transaction))
            .iter()
            .any(|change| matches!(change, Change::Insert(row) if row.id() == id))
    }
}

fn apply_changes<E: Entity>(rows: &mut BTreeMap<E::Id, E>, changes: Vec<Change<E>>) {
    for change in changes {
        match change {
            Change::Insert(row) => {
                rows.insert(row.id(), row);
            }
            Change::Update(row) => {
                if let Some(slot) = rows.get_mut(&row.id()) {
                    *slot = row;
                }
            }
            Change::Delete(id) => {
                rows.remove(&id);
            }
        }
    }
}

pub(super) struct InMemoryTable<E: Entity> {
    state: Mutex<TableState<E>>,
}

impl<E: Entity> InMemoryTable<E> {
    pub(super) fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                rows: BTreeMap::new(),
                next_id: 1,
                staged: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TableState<E>> {
        lock(&self.state)
    }

    /// Map every row visible to `transaction`, in id order, keeping the
    /// `Some` results. Rows are only borrowed.
    pub(super) fn select<T>(
        &self,
        transaction: Option<TransactionId>,
        f: impl FnMut(&E) -> Option<T>,
    ) -> Vec<T> {
        self.state()
            .view(transaction)
            .into_values()
            .filter_map(f)
            .collect()
    }

    /// The first visible row, in id order, matching `predicate`.
    pub(super) fn first(
        &self,
        transaction: Option<TransactionId>,
        predicate: impl Fn(&E) -> bool,
    ) -> Option<E> {
        self.state()
            .view(transaction)
            .into_values()
            .find(|row| predicate(*row))
            .cloned()
    }

    pub(super) fn find(&self, transaction: Option<TransactionId>, id: E::Id) -> Option<E> {
        self.state().get(transaction, id).cloned()
    }

    pub(super) fn insert(
        self: &Arc<Self>,
        transaction: &MemoryTransaction,
        draft: E::Draft,
    ) -> Result<E, RepositoryError> {
        let mut state = self.state();
        let raw = state.next_id;
        state.next_id = raw
            .checked_add(1)
            .ok_or_else(|| RepositoryError::invariant(format!("{} ids exhausted", E::KIND)))?;
        let entity = E::from_draft(E::Id::from_raw(raw), draft);
        self.stage(&mut state, transaction, Change::Insert(entity.clone()));
        Ok(entity)
    }

    pub(super) fn update(
        self: &Arc<Self>,
        transaction: &MemoryTransaction,
        entity: &E,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if state.get(Some(transaction.id()), entity.id()).is_none() {
            return Err(RepositoryError::missing(format!(
                "{} {} does not exist",
                E::KIND,
                entity.id()
            )));
        }
        self.stage(&mut state, transaction, Change::Update(entity.clone()));
        Ok(())
    }

    pub(super) fn delete(self: &Arc<Self>, transaction: &MemoryTransaction, id: E::Id) -> Option<E> {
        let mut state = self.state();
        let existing = state.get(Some(transaction.id()), id).cloned()?;
        self.stage(&mut state, transaction, Change::Delete(id));
        Some(existing)
    }

    fn stage(
        self: &Arc<Self>,
        state: &mut TableState<E>,
        transaction: &MemoryTransaction,
        change: Change<E>,
    ) {
        let changes = state.staged.entry(transaction.id()).or_default();
        if changes.is_empty() {
            transaction.enlist(Arc::clone(self) as Arc<dyn Participant>);
        }
        changes.push(change);
    }
}

impl<E: Entity> Participant for InMemoryTable<E> {
    fn kind(&self) -> &'static str {
        E::KIND
    }

    fn check(&self, transaction: TransactionId) -> Result<(), TransactionError> {
        let state = self.state();
        let changes = state.changes(Some(transaction));
        if changes.is_empty() {
            return Ok(());
        }

        for change in changes {
            if let Change::Update(_) | Change::Delete(_) = change {
                let id = change.target();
                if !state.rows.contains_key(&id) && !state.inserted(transaction, id) {
                    return Err(TransactionError::conflict(format!(
                        "{} {id} was removed by another transaction",
                        E::KIND
                    )));
                }
            }
        }

        let mut seen: HashMap<UniqueKey, E::Id> = HashMap::new();
        for row in state.view(Some(transaction)).into_values() {
            for key in row.unique_keys() {
                if let Some(other) = seen.insert(key.clone(), row.id()) {
                    if other != row.id() {
                        return Err(TransactionError::conflict(format!(
                            "{} {} '{}' already exists",
                            E::KIND,
                            key.constraint,
                            key.value
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn staged_links(&self, transaction: TransactionId) -> StagedLinks {
        let state = self.state();
        let mut links = StagedLinks::default();
        for change in state.changes(Some(transaction)) {
            let id = change.target();
            match change {
                Change::Insert(_) | Change::Update(_) => {
                    if let Some(row) = state.get(Some(transaction), id) {
                        links
                            .references
                            .extend(row.references().into_iter().map(|target| (id.get(), target)));
                    }
                }
                Change::Delete(_) => links.removed.push(id.get()),
            }
        }
        links
    }

    fn contains(&self, transaction: TransactionId, id: i32) -> bool {
        self.state()
            .get(Some(transaction), E::Id::from_raw(id))
            .is_some()
    }

    fn referrer(&self, transaction: TransactionId, target: Reference) -> Option<i32> {
        self.state()
            .view(Some(transaction))
            .into_values()
            .find(|row| row.references().contains(&target))
            .map(|row| row.id().get())
    }

    fn apply(&self, transaction: TransactionId) {
        let mut state = self.state();
        if let Some(changes) = state.staged.remove(&transaction) {
            apply_changes(&mut state.rows, changes);
        }
    }

    fn discard(&self, transaction: TransactionId) {
        self.state().staged.remove(&transaction);
    }
}
