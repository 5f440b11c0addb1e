//! Group lookup seam.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::group::{ProductGroup, ProductGroupId, ProductGroupRef};

/// Lookup of existing product groups by identity.
///
/// Products never hold groups directly; whenever raw group records need to be
/// turned into references, the caller passes a registry in.
pub trait GroupRegistry {
    fn find_group(&self, id: &ProductGroupId) -> Option<ProductGroupRef>;
}

impl<R> GroupRegistry for Arc<R>
where
    R: GroupRegistry + ?Sized,
{
    fn find_group(&self, id: &ProductGroupId) -> Option<ProductGroupRef> {
        (**self).find_group(id)
    }
}

impl<R> GroupRegistry for &R
where
    R: GroupRegistry + ?Sized,
{
    fn find_group(&self, id: &ProductGroupId) -> Option<ProductGroupRef> {
        (**self).find_group(id)
    }
}

impl<S: BuildHasher> GroupRegistry for HashMap<ProductGroupId, ProductGroup, S> {
    fn find_group(&self, id: &ProductGroupId) -> Option<ProductGroupRef> {
        self.get(id).map(ProductGroup::reference)
    }
}
