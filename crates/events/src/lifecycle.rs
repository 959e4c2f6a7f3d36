use std::borrow::Cow;

pub const ADD: &str = "add";
pub const CHANGE: &str = "change";
pub const REMOVE: &str = "remove";

/// Prefix of per-field change events (`change:<field>`).
pub const FIELD_CHANGE_PREFIX: &str = "change:";

/// Semantic events emitted around persist/remove operations.
///
/// Custom event names are allowed on every channel; these are the ones the
/// lifecycle emitter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent<'a> {
    /// A new document was persisted for the first time.
    Add,
    /// An existing document was persisted with at least one changed field.
    Change,
    /// One field of an existing document changed.
    FieldChange(&'a str),
    /// A document was removed.
    Remove,
}

impl<'a> LifecycleEvent<'a> {
    /// Stable event name used on the channel.
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            LifecycleEvent::Add => Cow::Borrowed(ADD),
            LifecycleEvent::Change => Cow::Borrowed(CHANGE),
            LifecycleEvent::FieldChange(field) => {
                Cow::Owned(format!("{FIELD_CHANGE_PREFIX}{field}"))
            }
            LifecycleEvent::Remove => Cow::Borrowed(REMOVE),
        }
    }

    /// Classify a channel event name. Custom names yield `None`.
    pub fn parse(name: &'a str) -> Option<Self> {
        match name {
            ADD => Some(LifecycleEvent::Add),
            CHANGE => Some(LifecycleEvent::Change),
            REMOVE => Some(LifecycleEvent::Remove),
            _ => name
                .strip_prefix(FIELD_CHANGE_PREFIX)
                .filter(|field| !field.is_empty())
                .map(LifecycleEvent::FieldChange),
        }
    }
}

impl core::fmt::Display for LifecycleEvent<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name())
    }
}
