use std::collections::HashSet;

use lazy_static::lazy_static;
use tracing::debug;

use crate::known;
use crate::lang::Class;

/// A policy deciding which extracted classes end up in the schema.
pub trait ClassFilter {
    fn filter(&self, classes: Vec<Class>) -> Vec<Class>;
}

pub const PRIVATE_MARKER: &str = "//@private";

/// Keeps the root view type and everything deriving from it, except classes marked private
/// and the legacy frame type.
#[derive(Copy, Clone, Debug, Default)]
pub struct ViewExtendersFilter;

impl ViewExtendersFilter {
    fn keep(class: &Class) -> bool {
        if class.class_comments.starts_with(PRIVATE_MARKER) {
            debug!(class = %class.full_name, "skipping private class");
            return false;
        }
        if class.full_name == known::FRAME {
            return false;
        }
        class.full_name == known::VIEW || class.extends(known::VIEW)
    }
}

impl ClassFilter for ViewExtendersFilter {
    fn filter(&self, classes: Vec<Class>) -> Vec<Class> {
        classes.into_iter().filter(Self::keep).collect()
    }
}

lazy_static! {
    static ref ACTION_BAR_TYPES: HashSet<&'static str> = HashSet::from([
        known::ACTION_BAR,
        known::ACTION_ITEM,
        known::ACTION_ITEM_BASE,
        known::BINDABLE,
    ]);
}

/// Keeps the action bar family only.
#[derive(Copy, Clone, Debug, Default)]
pub struct ActionBarFilter;

impl ClassFilter for ActionBarFilter {
    fn filter(&self, classes: Vec<Class>) -> Vec<Class> {
        classes
            .into_iter()
            .filter(|class| ACTION_BAR_TYPES.contains(class.full_name.as_str()))
            .collect()
    }
}

pub fn apply_filters(classes: Vec<Class>, filters: &[Box<dyn ClassFilter>]) -> Vec<Class> {
    filters
        .iter()
        .fold(classes, |classes, filter| filter.filter(classes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Type;

    fn class(name: &str, full_name: &str, comments: &str, bases: &[&str]) -> Class {
        Class::new(
            name,
            full_name,
            comments,
            bases.iter().map(|b| Type::new(*b)).collect(),
            vec![],
        )
    }

    fn names(classes: &[Class]) -> Vec<&str> {
        classes.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn view_extenders() {
        let classes = vec![
            class("View", known::VIEW, "", &[r#""ui/core/proxy".ProxyObject"#]),
            class("Label", r#""ui/label".Label"#, "", &["TextBase", known::VIEW]),
            class("Observable", r#""data/observable".Observable"#, "", &[]),
            class("Frame", known::FRAME, "", &[known::VIEW]),
            class(
                "NativeViewGroup",
                r#""ui/core/view".NativeViewGroup"#,
                "//@private\n/** internal */",
                &[known::VIEW],
            ),
            class(
                "Documented",
                r#""ui/documented".Documented"#,
                "/** //@private is not a marker here */",
                &[known::VIEW],
            ),
        ];

        let kept = ViewExtendersFilter.filter(classes);
        assert_eq!(names(&kept), vec!["View", "Label", "Documented"]);
    }

    #[test]
    fn action_bar_family_only() {
        let classes = vec![
            class("ActionBar", known::ACTION_BAR, "", &[known::VIEW]),
            class("ActionItem", known::ACTION_ITEM, "", &[known::BINDABLE]),
            class("Bindable", known::BINDABLE, "", &[]),
            class("Label", r#""ui/label".Label"#, "", &[known::VIEW]),
            class("ActionItems", r#""ui/action-bar".ActionItems"#, "", &[]),
        ];

        let kept = ActionBarFilter.filter(classes);
        assert_eq!(names(&kept), vec!["ActionBar", "ActionItem", "Bindable"]);
    }

    #[test]
    fn filters_compose_in_order() {
        let classes = vec![
            class("ActionBar", known::ACTION_BAR, "", &[known::VIEW]),
            class("ActionItem", known::ACTION_ITEM, "", &[known::BINDABLE]),
            class("Label", r#""ui/label".Label"#, "", &[known::VIEW]),
        ];
        let filters: Vec<Box<dyn ClassFilter>> =
            vec![Box::new(ViewExtendersFilter), Box::new(ActionBarFilter)];

        assert_eq!(names(&apply_filters(classes.clone(), &filters)), vec!["ActionBar"]);
        assert_eq!(apply_filters(classes, &[]).len(), 3);
    }
}
