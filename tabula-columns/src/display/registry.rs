//! Composition of widget families into one tagged union.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{ColumnsError, Result};
use crate::schema::{ObjectSchema, TaggedUnion};

/// A named group of tagged variants, e.g. the input widgets.
#[derive(Debug, Clone)]
pub struct Family {
    name: &'static str,
    variants: Vec<(&'static str, ObjectSchema)>,
}

impl Family {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            variants: Vec::new(),
        }
    }

    pub fn variant(mut self, tag: &'static str, object: ObjectSchema) -> Self {
        self.variants.push((tag, object));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|(tag, _)| *tag)
    }
}

/// Merge `families` into one union discriminated by `field`.
///
/// A tag may appear once per family. A tag registered by two families is
/// an error unless it is listed in `shared`, in which case the family listed
/// first keeps it.
pub fn compose(
    field: &'static str,
    families: Vec<Family>,
    shared: &[&str],
) -> Result<TaggedUnion> {
    let mut owners: IndexMap<&'static str, &'static str> = IndexMap::new();
    let mut union = TaggedUnion::new(field);

    for Family { name, variants } in families {
        let mut seen = HashSet::new();
        for (tag, object) in variants {
            if !seen.insert(tag) {
                return Err(ColumnsError::DuplicateTag {
                    tag: tag.to_string(),
                    family: name,
                });
            }
            if let Some(first) = owners.get(tag) {
                if shared.contains(&tag) {
                    trace!(tag, kept = *first, dropped = name, "shared tag resolved");
                    continue;
                }
                return Err(ColumnsError::TagCollision {
                    tag: tag.to_string(),
                    first: *first,
                    second: name,
                });
            }
            owners.insert(tag, name);
            union = union.variant(tag, object);
        }
    }
    Ok(union)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(name: &'static str, tags: &[&'static str]) -> Family {
        tags.iter()
            .fold(Family::new(name), |f, &tag| f.variant(tag, ObjectSchema::new()))
    }

    #[test]
    fn disjoint_families_merge_in_order() {
        let union = compose(
            "type",
            vec![family("a", &["x", "y"]), family("b", &["z"])],
            &[],
        )
        .unwrap();
        assert_eq!(union.tags().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn undeclared_collision_is_an_error() {
        let err = compose(
            "type",
            vec![family("static", &["checkbox"]), family("input", &["checkbox"])],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ColumnsError::TagCollision {
                first: "static",
                second: "input",
                ..
            }
        ));
    }

    #[test]
    fn shared_tag_goes_to_first_family() {
        let union = compose(
            "type",
            vec![
                family("static", &["checkbox"]).variant(
                    "range",
                    ObjectSchema::new().field("marker", crate::schema::Schema::boolean()),
                ),
                family("input", &["text", "range"]),
            ],
            &["range"],
        )
        .unwrap();
        assert_eq!(
            union.tags().collect::<Vec<_>>(),
            vec!["checkbox", "range", "text"]
        );
        assert!(union.get("range").unwrap().get("marker").is_some());
    }

    #[test]
    fn duplicate_within_family() {
        let err = compose("type", vec![family("layout", &["grid", "grid"])], &[]).unwrap_err();
        assert!(matches!(err, ColumnsError::DuplicateTag { family: "layout", .. }));
    }
}
