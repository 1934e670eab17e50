use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

/// A record kind held by an `EntityStore`.
///
/// Implementors supply identity extraction and the total ordering the
/// store keeps its items in; the associated types name the write payloads
/// and the scope a listing can be narrowed by.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type Payload: Serialize + Debug + Send + Sync + 'static;
    type UpdatePayload: Serialize + Debug + Send + Sync + 'static;
    type Scope: Scope<Self>;

    /// Short plural name used in log fields.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    fn compare(&self, other: &Self) -> Ordering;
}

/// Filter a listing is scoped to.
///
/// A cached view is valid for exactly one scope value; `admits` decides
/// whether a record written elsewhere belongs in that view.
pub trait Scope<E>: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    fn admits(&self, record: &E) -> bool;

    /// Query parameters for the list request. Unset fields are left out.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Unscoped listing: every record belongs.
impl<E> Scope<E> for () {
    fn admits(&self, _record: &E) -> bool {
        true
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
