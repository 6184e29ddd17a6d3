//! Mutable-until-frozen lifecycle shared by every configuration entity.
//!
//! Entities start out mutable while configuration is loaded and merged. Before
//! the release pipeline runs, the root is frozen, which cascades to every owned
//! child. From then on every setter fails with
//! [`ConfigurationError::Immutable`], and the tree can be shared read-only.
//!
//! The only way back is [`Freezable::mutate`], a scoped escape hatch that thaws
//! the entity for the duration of one callback and freezes it again afterwards,
//! whether the callback succeeded or not.

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "freeze_tests.rs"]
mod tests;

/// Frozen flag embedded in each entity.
///
/// There is no public way to clear the flag; thawing only happens inside
/// [`Freezable::mutate`]. A clone always starts mutable, so copying entities
/// out of a frozen layer (as merging does) yields editable entities. The flag
/// is lifecycle state and never makes two entities unequal.
#[derive(Debug, Default)]
pub struct FreezeState {
    frozen: bool,
}

impl Clone for FreezeState {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for FreezeState {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for FreezeState {}

impl FreezeState {
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// Fails with `Immutable` when the owning entity is frozen.
    pub fn ensure_mutable(&self, entity: &str) -> ConfigurationResult<()> {
        if self.frozen {
            return Err(ConfigurationError::Immutable {
                entity: entity.to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle operations shared by all configuration entities.
pub trait Freezable {
    /// Short entity name used in error messages, e.g. `"slack"`.
    fn kind(&self) -> &'static str;

    fn freeze_state(&self) -> &FreezeState;

    fn freeze_state_mut(&mut self) -> &mut FreezeState;

    /// Calls `visitor` once for every directly owned child entity.
    ///
    /// Composite entities must override this so freezing cascades.
    fn visit_children(&mut self, _visitor: &mut dyn FnMut(&mut dyn Freezable)) {}

    fn is_frozen(&self) -> bool {
        self.freeze_state().is_frozen()
    }

    fn ensure_mutable(&self) -> ConfigurationResult<()> {
        self.freeze_state().ensure_mutable(self.kind())
    }

    /// Freezes this entity and every owned child. Freezing twice is a no-op.
    fn freeze(&mut self) {
        if self.is_frozen() {
            return;
        }
        self.freeze_state_mut().set_frozen(true);
        self.visit_children(&mut |child: &mut dyn Freezable| child.freeze());
    }

    /// Runs `mutation` with this entity (and its children) temporarily mutable.
    ///
    /// The prior state is restored on every exit path: if the entity was frozen
    /// before the call it is frozen again afterwards, including when `mutation`
    /// returns an error or panics.
    fn mutate<R, F>(&mut self, mutation: F) -> ConfigurationResult<R>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> ConfigurationResult<R>,
    {
        let was_frozen = self.is_frozen();
        if was_frozen {
            set_frozen_all(self, false);
        }

        let mut guard = Refreeze {
            entity: self,
            refreeze: was_frozen,
        };
        mutation(&mut *guard.entity)
    }
}

/// Freezes the tree again when dropped.
struct Refreeze<'a, T: Freezable> {
    entity: &'a mut T,
    refreeze: bool,
}

impl<T: Freezable> Drop for Refreeze<'_, T> {
    fn drop(&mut self) {
        if self.refreeze {
            set_frozen_all(&mut *self.entity, true);
        }
    }
}

fn set_frozen_all(entity: &mut dyn Freezable, frozen: bool) {
    entity.freeze_state_mut().set_frozen(frozen);
    entity.visit_children(&mut |child: &mut dyn Freezable| set_frozen_all(child, frozen));
}

/// Generates frozen-checked setters for `Option` fields.
///
/// ```ignore
/// impl Slack {
///     setters! {
///         set_channel => channel: String,
///         set_connect_timeout => common.timeouts.connect_timeout: u32,
///     }
/// }
/// ```
macro_rules! setters {
    ($($setter:ident => $($field:ident).+ : $ty:ty),* $(,)?) => {
        $(
            pub fn $setter(
                &mut self,
                value: impl Into<$ty>,
            ) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.$($field).+ = Some(value.into());
                Ok(())
            }
        )*
    };
}

pub(crate) use setters;
