use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ElementId, PropertyValue};
use crate::schema::ElementKind;
use crate::validation::{names, SemanticError, SemanticErrorKind, SemanticValidator, ValidationContext};

const GROUP_NAME_PROP: &str = "groupName";
const DATA_SET_PROP: &str = "dataSet";

/// Group names are unique, ignoring case, within a listing naming scope
///
/// The scope is rooted at the nearest listing that binds a data set, or at
/// the outermost listing when none does. An inner listing with its own data
/// set opens a new scope. Groups are scanned depth-first in slot order; the
/// first occurrence of a name wins and each duplicated name is reported once,
/// on its second occurrence.
pub struct GroupNameValidator;

impl GroupNameValidator {
    /// Check a group about to be added to `listing` under `name`
    pub fn validate_for_adding_group(
        ctx: &ValidationContext<'_>,
        listing: ElementId,
        name: &str,
    ) -> Vec<SemanticError> {
        clash(ctx, listing, None, name)
    }

    /// Check renaming `group` to `name`
    pub fn validate_for_renaming_group(
        ctx: &ValidationContext<'_>,
        group: ElementId,
        name: &str,
    ) -> Vec<SemanticError> {
        match nearest_listing(ctx, group) {
            Some(listing) => clash(ctx, listing, Some(group), name),
            None => Vec::new(),
        }
    }
}

impl SemanticValidator for GroupNameValidator {
    fn name(&self) -> &'static str {
        names::GROUP_NAME
    }

    fn scope(&self, ctx: &ValidationContext<'_>, element: ElementId) -> Option<ElementId> {
        let kind = ctx.state.get(element)?.kind();
        let listing = if ctx.schema.is_kind_of(kind, ElementKind::Listing) {
            element
        } else if ctx.schema.is_kind_of(kind, ElementKind::Group) {
            nearest_listing(ctx, element)?
        } else {
            return None;
        };
        Some(scope_root(ctx, listing))
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let mut first: BTreeMap<String, ElementId> = BTreeMap::new();
        let mut reported = BTreeSet::new();
        let mut errors = Vec::new();
        for (group, name) in groups_in_scope(ctx, element) {
            let key = name.to_lowercase();
            match first.get(&key) {
                None => {
                    first.insert(key, group);
                }
                Some(original) => {
                    if reported.insert(key) {
                        errors.push(
                            SemanticError::new(
                                SemanticErrorKind::DuplicateGroupName,
                                group,
                                names::GROUP_NAME,
                                format!("group name '{}' is already used by {}", name, original),
                            )
                            .with_property(GROUP_NAME_PROP),
                        );
                    }
                }
            }
        }
        errors
    }
}

fn is_listing(ctx: &ValidationContext<'_>, id: ElementId) -> bool {
    ctx.state
        .get(id)
        .is_some_and(|el| ctx.schema.is_kind_of(el.kind(), ElementKind::Listing))
}

fn binds_data_set(ctx: &ValidationContext<'_>, listing: ElementId) -> bool {
    ctx.state
        .get(listing)
        .and_then(|el| el.local_property(DATA_SET_PROP))
        .is_some_and(|v| !v.is_blank())
}

fn nearest_listing(ctx: &ValidationContext<'_>, element: ElementId) -> Option<ElementId> {
    ctx.state
        .containers_of(element)
        .into_iter()
        .find(|id| is_listing(ctx, *id))
}

fn scope_root(ctx: &ValidationContext<'_>, listing: ElementId) -> ElementId {
    let listings: Vec<ElementId> = std::iter::once(listing)
        .chain(
            ctx.state
                .containers_of(listing)
                .into_iter()
                .filter(|id| is_listing(ctx, *id)),
        )
        .collect();
    listings
        .iter()
        .copied()
        .find(|id| binds_data_set(ctx, *id))
        .or_else(|| listings.last().copied())
        .unwrap_or(listing)
}

fn group_name(ctx: &ValidationContext<'_>, group: ElementId) -> Option<String> {
    ctx.state
        .get(group)?
        .local_property(GROUP_NAME_PROP)
        .and_then(PropertyValue::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
}

/// Named groups whose naming scope is rooted at `root`, depth-first
fn groups_in_scope(ctx: &ValidationContext<'_>, root: ElementId) -> Vec<(ElementId, String)> {
    ctx.state
        .subtree(root)
        .into_iter()
        .filter(|id| {
            ctx.state
                .get(*id)
                .is_some_and(|el| ctx.schema.is_kind_of(el.kind(), ElementKind::Group))
        })
        .filter(|group| {
            nearest_listing(ctx, *group).is_some_and(|listing| scope_root(ctx, listing) == root)
        })
        .filter_map(|group| group_name(ctx, group).map(|name| (group, name)))
        .collect()
}

fn clash(
    ctx: &ValidationContext<'_>,
    listing: ElementId,
    except: Option<ElementId>,
    name: &str,
) -> Vec<SemanticError> {
    let key = name.to_lowercase();
    groups_in_scope(ctx, scope_root(ctx, listing))
        .into_iter()
        .filter(|(group, _)| Some(*group) != except)
        .find(|(_, existing)| existing.to_lowercase() == key)
        .map(|(group, _)| {
            vec![SemanticError::new(
                SemanticErrorKind::DuplicateGroupName,
                except.unwrap_or(listing),
                names::GROUP_NAME,
                format!("group name '{}' is already used by {}", name, group),
            )
            .with_property(GROUP_NAME_PROP)]
        })
        .unwrap_or_default()
}
