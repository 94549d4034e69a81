//! Naming contract shared by every declared resource descriptor

/// A declared resource that can be addressed by a single, recomputable name.
///
/// Nodegroups are addressed by their name, service accounts by
/// `namespace/name`. The name is what include/exclude rules match against
/// and what stack listers report back.
pub trait NamedResource {
    fn name_string(&self) -> String;
}

impl<T: NamedResource + ?Sized> NamedResource for &T {
    fn name_string(&self) -> String {
        (**self).name_string()
    }
}

/// Collects the names of `resources`, preserving their declared order.
pub fn collect_names<T: NamedResource>(resources: &[T]) -> Vec<String> {
    resources.iter().map(NamedResource::name_string).collect()
}
