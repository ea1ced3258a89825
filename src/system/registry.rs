//! Object table for oid lookup.
//!
//! Every configured object owns one oid. Lookups are type tagged so a
//! command addressed to an oid held by some other kind of object is refused
//! instead of being applied to the wrong state.

use heapless::FnvIndexMap;

use crate::error::{CommandError, Result};
use crate::motion::DEFAULT_QUEUE_DEPTH;
use crate::stepper::{Oid, VirtualStepper};

/// Maximum number of objects (and one past the highest oid).
pub const MAX_OBJECTS: usize = 64;

/// Kind tag of a configured object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ObjectKind {
    /// A virtual stepper owned by this table.
    VirtualStepper,
    /// An oid claimed by another subsystem.
    Foreign(&'static str),
}

enum Object<const Q: usize> {
    VirtualStepper(VirtualStepper<Q>),
    Foreign(&'static str),
}

impl<const Q: usize> Object<Q> {
    fn kind(&self) -> ObjectKind {
        match self {
            Object::VirtualStepper(_) => ObjectKind::VirtualStepper,
            Object::Foreign(name) => ObjectKind::Foreign(*name),
        }
    }
}

/// Oid-indexed table of configured objects.
pub struct ObjectTable<const Q: usize = DEFAULT_QUEUE_DEPTH> {
    objects: FnvIndexMap<Oid, Object<Q>, MAX_OBJECTS>,
}

impl<const Q: usize> Default for ObjectTable<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const Q: usize> ObjectTable<Q> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            objects: FnvIndexMap::new(),
        }
    }

    /// Allocate a virtual stepper at `oid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the oid is out of range or already assigned.
    pub fn alloc_stepper(&mut self, oid: Oid) -> Result<&VirtualStepper<Q>> {
        self.insert(oid, Object::VirtualStepper(VirtualStepper::new(oid)))?;
        self.lookup(oid)
    }

    /// Claim `oid` for an object owned by another subsystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the oid is out of range or already assigned.
    pub fn reserve(&mut self, oid: Oid, kind: &'static str) -> Result<()> {
        self.insert(oid, Object::Foreign(kind))
    }

    /// Look up the virtual stepper at `oid`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::TypeMismatch`] if `oid` is free or holds
    /// another kind of object.
    pub fn lookup(&self, oid: Oid) -> Result<&VirtualStepper<Q>> {
        match self.objects.get(&oid) {
            Some(Object::VirtualStepper(stepper)) => Ok(stepper),
            _ => Err(CommandError::TypeMismatch { oid }.into()),
        }
    }

    /// Check if `oid` is a virtual stepper.
    pub fn verify(&self, oid: Oid) -> bool {
        self.kind(oid) == Some(ObjectKind::VirtualStepper)
    }

    /// Kind of the object at `oid`, if any.
    pub fn kind(&self, oid: Oid) -> Option<ObjectKind> {
        self.objects.get(&oid).map(Object::kind)
    }

    /// Iterate every configured virtual stepper.
    pub fn steppers(&self) -> impl Iterator<Item = &VirtualStepper<Q>> {
        self.objects.values().filter_map(|obj| match obj {
            Object::VirtualStepper(stepper) => Some(stepper),
            Object::Foreign(_) => None,
        })
    }

    /// Number of assigned oids.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if no oid is assigned.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn insert(&mut self, oid: Oid, object: Object<Q>) -> Result<()> {
        if usize::from(oid) >= MAX_OBJECTS {
            return Err(CommandError::InvalidArgument("Invalid oid").into());
        }
        if self.objects.contains_key(&oid) {
            return Err(CommandError::OidInUse { oid }.into());
        }
        self.objects
            .insert(oid, object)
            .map_err(|_| CommandError::InvalidArgument("Object table full"))?;
        Ok(())
    }
}
