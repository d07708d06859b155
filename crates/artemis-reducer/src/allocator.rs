//! Name and port allocation for new acceptors and connectors.
//!
//! Both collections allocate independently. Names follow the collection stem
//! (`acceptors0`, `acceptors1`, ...) and skip holes left behind by manual
//! renames; ports start at [`BASE_PORT`] and continue one above the highest
//! port currently present, however that port came to be.

use artemis_crd::broker::{Endpoint, EndpointKind};

/// Port given to the first member of an empty collection.
pub(crate) const BASE_PORT: i32 = 5555;

/// First unused name of the form `<collection><N>` for increasing `N`.
pub(crate) fn next_name(kind: EndpointKind, existing: &[Endpoint]) -> String {
    let stem = kind.collection_name();

    let mut n = 0;
    loop {
        let candidate = format!("{stem}{n}");
        if !existing.iter().any(|member| member.name == candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub(crate) fn next_port(existing: &[Endpoint]) -> i32 {
    existing
        .iter()
        .map(|member| member.port)
        .max()
        .map_or(BASE_PORT, |highest| highest + 1)
}
