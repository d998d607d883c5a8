//! Binding targets and the resolver strategies that produce them.

use std::cell::RefCell;

use ahash::AHashMap;
use tracing::trace;
use weft_bean::Value;

use crate::control::{Control, View};
use crate::convert::ValueKind;

/// Which control capability a binding attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The control's user value cell.
    UserValue,
    /// The single-selection surface of the control's selection model.
    SingleSelection,
    /// The multi-selection surface of the control's selection model.
    MultiSelection,
    /// The control's item collection.
    Items,
}

/// One resolved binding instruction: which control, which model path, which
/// capability, and how values are shaped on the way.
#[derive(Debug, Clone)]
pub struct BindingTarget {
    control_id: String,
    owner_type: &'static str,
    path: String,
    kind: TargetKind,
    format: Option<ValueKind>,
    default_value: Option<Value>,
}

impl BindingTarget {
    #[must_use]
    pub fn new(
        control_id: impl Into<String>,
        owner_type: &'static str,
        path: impl Into<String>,
        kind: TargetKind,
    ) -> Self {
        Self {
            control_id: control_id.into(),
            owner_type,
            path: path.into(),
            kind,
            format: None,
            default_value: None,
        }
    }

    /// Shape of the control-side value; conversions run both ways.
    #[must_use]
    pub fn with_format(mut self, format: ValueKind) -> Self {
        self.format = Some(format);
        self
    }

    /// Seed applied when the model-side value is `Null` at bind time.
    #[must_use]
    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = Some(default_value);
        self
    }

    #[must_use]
    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    #[must_use]
    pub fn owner_type(&self) -> &'static str {
        self.owner_type
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    #[must_use]
    pub fn format(&self) -> Option<ValueKind> {
        self.format
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }
}

/// Picks the richest capability a control offers.
#[must_use]
pub fn target_kind_for(control: &Control) -> TargetKind {
    if control.supports_selection() {
        if control.supports_multi_selection() {
            TargetKind::MultiSelection
        } else {
            TargetKind::SingleSelection
        }
    } else if control.supports_value() {
        TargetKind::UserValue
    } else {
        TargetKind::Items
    }
}

/// Produces binding targets for a (model, view) pair.
pub trait BindingTargetResolver {
    fn resolve(&self, model: &Value, view: &View) -> Vec<BindingTarget>;
}

/// Matches model properties to controls by naming convention.
///
/// For each declared model property, looks up a control with id
/// `prefix + Capitalized(property) + suffix`, falling back to the bare
/// property name. Unmatched properties are skipped silently. Lookups are
/// cached per `(view, property)`.
pub struct NameBasedResolver {
    prefix: String,
    suffix: String,
    cache: RefCell<AHashMap<(String, String), Option<String>>>,
}

impl NameBasedResolver {
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            cache: RefCell::new(AHashMap::new()),
        }
    }

    fn control_for(&self, view: &View, property: &str) -> Option<Control> {
        let key = (view.id().to_owned(), property.to_owned());
        if let Some(cached) = self.cache.borrow().get(&key) {
            trace!(view = view.id(), property, "target resolution served from cache");
            return cached.as_ref().and_then(|id| view.control(id));
        }
        let decorated = format!("{}{}{}", self.prefix, capitalize(property), self.suffix);
        let hit = view
            .control(&decorated)
            .map(|c| (decorated, c))
            .or_else(|| view.control(property).map(|c| (property.to_owned(), c)));
        self.cache
            .borrow_mut()
            .insert(key, hit.as_ref().map(|(id, _)| id.clone()));
        hit.map(|(_, control)| control)
    }

    fn resolve_properties<'a>(
        &self,
        model: &Value,
        view: &View,
        skip: &[String],
        out: &'a mut Vec<BindingTarget>,
    ) {
        let Some(obj) = model.as_object() else {
            return;
        };
        let schema = obj.borrow().schema();
        for property in schema.property_names() {
            if skip.iter().any(|s| s == property) {
                continue;
            }
            if let Some(control) = self.control_for(view, property) {
                out.push(BindingTarget::new(
                    control.id(),
                    schema.name,
                    property,
                    target_kind_for(&control),
                ));
            }
        }
    }
}

impl BindingTargetResolver for NameBasedResolver {
    fn resolve(&self, model: &Value, view: &View) -> Vec<BindingTarget> {
        let mut targets = Vec::new();
        self.resolve_properties(model, view, &[], &mut targets);
        targets
    }
}

/// Matches controls to model properties through an explicit table, with an
/// optional name-based fallback for properties the table leaves unresolved.
pub struct MappingBasedResolver {
    mappings: Vec<(String, String)>,
    disable_name_based: bool,
    fallback: NameBasedResolver,
}

impl MappingBasedResolver {
    /// `mappings` pairs `(control id, model property)` in registration order.
    #[must_use]
    pub fn new(mappings: Vec<(String, String)>, disable_name_based: bool) -> Self {
        Self {
            mappings,
            disable_name_based,
            fallback: NameBasedResolver::new("", ""),
        }
    }
}

impl BindingTargetResolver for MappingBasedResolver {
    fn resolve(&self, model: &Value, view: &View) -> Vec<BindingTarget> {
        let Some(obj) = model.as_object() else {
            return Vec::new();
        };
        let owner = obj.borrow().schema().name;

        let mut targets = Vec::new();
        let mut satisfied = Vec::new();
        for (control_id, property) in &self.mappings {
            if let Some(control) = view.control(control_id) {
                targets.push(BindingTarget::new(
                    control.id(),
                    owner,
                    property.clone(),
                    target_kind_for(&control),
                ));
                satisfied.push(property.clone());
            }
        }
        if !self.disable_name_based {
            self.fallback
                .resolve_properties(model, view, &satisfied, &mut targets);
        }
        targets
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{form_model, form_view};

    #[test]
    fn name_based_matches_decorated_then_exact() {
        let resolver = NameBasedResolver::new("input", "Field");
        let view = View::new(
            "v1",
            vec![
                Control::builder("inputNameField").build(),
                Control::builder("note").build(),
            ],
        );
        let targets = resolver.resolve(&form_model(), &view);
        let ids: Vec<_> = targets.iter().map(BindingTarget::control_id).collect();
        assert_eq!(ids, ["inputNameField", "note"], "unmatched properties skipped");
    }

    #[test]
    fn name_based_reports_model_paths_in_schema_order() {
        let resolver = NameBasedResolver::new("", "");
        let view = form_view();
        let targets = resolver.resolve(&form_model(), &view);
        let paths: Vec<_> = targets.iter().map(BindingTarget::path).collect();
        assert_eq!(
            paths,
            ["name", "status", "note", "count", "choice", "entries", "version"]
        );
    }

    #[test]
    fn resolution_is_cached_per_view_and_property() {
        let resolver = NameBasedResolver::new("", "");
        let view = form_view();
        let first = resolver.resolve(&form_model(), &view);
        let second = resolver.resolve(&form_model(), &view);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn mapping_takes_precedence_and_fallback_fills_the_rest() {
        let resolver = MappingBasedResolver::new(
            vec![("note".to_owned(), "name".to_owned())],
            false,
        );
        let targets = resolver.resolve(&form_model(), &form_view());
        assert_eq!(targets[0].control_id(), "note");
        assert_eq!(targets[0].path(), "name");
        assert!(
            !targets[1..].iter().any(|t| t.path() == "name"),
            "mapped property must not be duplicated by the fallback"
        );
    }

    #[test]
    fn mapping_alone_when_fallback_disabled() {
        let resolver = MappingBasedResolver::new(
            vec![("note".to_owned(), "name".to_owned())],
            true,
        );
        let targets = resolver.resolve(&form_model(), &form_view());
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn kind_follows_control_capabilities() {
        let view = form_view();
        assert_eq!(
            target_kind_for(&view.control("name").unwrap()),
            TargetKind::UserValue
        );
        assert_eq!(
            target_kind_for(&view.control("choice").unwrap()),
            TargetKind::SingleSelection
        );
        assert_eq!(
            target_kind_for(&view.control("entries").unwrap()),
            TargetKind::MultiSelection
        );
    }
}
