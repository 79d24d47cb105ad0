//! Optional lifecycle hooks around create/update/patch/delete.
//!
//! Hooks are an explicit capability pattern: an entity overrides the hook
//! methods it cares about *and* declares them in [`Hooks::capabilities`].
//! The capability set is snapshotted into the entity's descriptor once at
//! registration, and handlers dispatch by flag check only, never by
//! per-request type testing.
//!
//! Before-hooks run strictly before the storage call and can veto it.
//! After-hooks run strictly after a completed storage mutation and cannot
//! undo it; their failure is still reported to the caller as a 400, but the
//! mutation stands.

use std::fmt;
use thiserror::Error;

/// Error returned by a hook to veto (before) or flag (after) an operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HookError {
    pub message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of a single hook invocation.
pub type HookResult = Result<(), HookError>;

/// The eight lifecycle hook points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforePatch,
    AfterPatch,
    BeforeDelete,
    AfterDelete,
}

impl Hook {
    /// All hook points, in lifecycle order.
    pub const ALL: [Hook; 8] = [
        Hook::BeforeCreate,
        Hook::AfterCreate,
        Hook::BeforeUpdate,
        Hook::AfterUpdate,
        Hook::BeforePatch,
        Hook::AfterPatch,
        Hook::BeforeDelete,
        Hook::AfterDelete,
    ];

    /// Hook name as surfaced in error messages (e.g. "beforeCreate").
    pub fn name(&self) -> &'static str {
        match self {
            Hook::BeforeCreate => "beforeCreate",
            Hook::AfterCreate => "afterCreate",
            Hook::BeforeUpdate => "beforeUpdate",
            Hook::AfterUpdate => "afterUpdate",
            Hook::BeforePatch => "beforePatch",
            Hook::AfterPatch => "afterPatch",
            Hook::BeforeDelete => "beforeDelete",
            Hook::AfterDelete => "afterDelete",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Hook::BeforeCreate => 1 << 0,
            Hook::AfterCreate => 1 << 1,
            Hook::BeforeUpdate => 1 << 2,
            Hook::AfterUpdate => 1 << 3,
            Hook::BeforePatch => 1 << 4,
            Hook::AfterPatch => 1 << 5,
            Hook::BeforeDelete => 1 << 6,
            Hook::AfterDelete => 1 << 7,
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The set of hooks an entity type implements, stored in its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookSet(u8);

impl HookSet {
    /// No hooks implemented (the default for every entity).
    pub const NONE: HookSet = HookSet(0);

    /// Add a hook to the set (builder-style, const-friendly).
    pub const fn with(self, hook: Hook) -> Self {
        // match instead of Hook::bit so this stays const
        let bit = match hook {
            Hook::BeforeCreate => 1 << 0,
            Hook::AfterCreate => 1 << 1,
            Hook::BeforeUpdate => 1 << 2,
            Hook::AfterUpdate => 1 << 3,
            Hook::BeforePatch => 1 << 4,
            Hook::AfterPatch => 1 << 5,
            Hook::BeforeDelete => 1 << 6,
            Hook::AfterDelete => 1 << 7,
        };
        HookSet(self.0 | bit)
    }

    /// Whether the given hook is implemented.
    pub fn contains(&self, hook: Hook) -> bool {
        self.0 & hook.bit() != 0
    }

    /// Whether no hooks are implemented.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The implemented hooks, in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = Hook> + '_ {
        Hook::ALL.into_iter().filter(|h| self.contains(*h))
    }
}

/// Lifecycle hooks an entity may implement.
///
/// Every method defaults to a no-op success; override the ones you need and
/// declare them in [`capabilities`](Hooks::capabilities) so the dispatcher
/// knows to call them.
///
/// The delete hooks receive a fresh default-constructed instance rather than
/// the stored record; a delete hook that needs the record must fetch it
/// itself. Inherited behavior, kept deliberately (see DESIGN.md).
///
/// # Example
///
/// ```rust,ignore
/// impl Hooks for Article {
///     fn capabilities() -> HookSet {
///         HookSet::NONE.with(Hook::BeforeCreate).with(Hook::AfterCreate)
///     }
///
///     fn before_create(&mut self) -> HookResult {
///         if self.title.is_empty() {
///             return Err(HookError::new("title must not be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Hooks {
    /// The hooks this type implements. Snapshotted into the descriptor at
    /// registration; hooks not declared here are never invoked.
    fn capabilities() -> HookSet
    where
        Self: Sized,
    {
        HookSet::NONE
    }

    fn before_create(&mut self) -> HookResult {
        Ok(())
    }

    fn after_create(&mut self) -> HookResult {
        Ok(())
    }

    fn before_update(&mut self) -> HookResult {
        Ok(())
    }

    fn after_update(&mut self) -> HookResult {
        Ok(())
    }

    fn before_patch(&mut self) -> HookResult {
        Ok(())
    }

    fn after_patch(&mut self) -> HookResult {
        Ok(())
    }

    fn before_delete(&mut self) -> HookResult {
        Ok(())
    }

    fn after_delete(&mut self) -> HookResult {
        Ok(())
    }
}

/// Invoke a hook on an entity if the descriptor's capability set declares it.
///
/// Returns `Ok(())` without touching the entity when the hook is absent.
pub fn invoke<E: Hooks>(entity: &mut E, hooks: HookSet, hook: Hook) -> HookResult {
    if !hooks.contains(hook) {
        return Ok(());
    }
    match hook {
        Hook::BeforeCreate => entity.before_create(),
        Hook::AfterCreate => entity.after_create(),
        Hook::BeforeUpdate => entity.before_update(),
        Hook::AfterUpdate => entity.after_update(),
        Hook::BeforePatch => entity.before_patch(),
        Hook::AfterPatch => entity.after_patch(),
        Hook::BeforeDelete => entity.before_delete(),
        Hook::AfterDelete => entity.after_delete(),
    }
}
