//! Named preallocators.

use std::{collections::HashMap, sync::Arc};

use crate::{DefaultPreallocator, Error, FixedRangeSize, Preallocator, Setting};

/// The preallocators that can be referred to by name from a [`Setting`].
#[derive(Default)]
pub struct Registry {
    /// The registered preallocators.
    named: HashMap<String, Arc<dyn Preallocator>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preallocator under the given name, returning the one it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        preallocator: Arc<dyn Preallocator>,
    ) -> Option<Arc<dyn Preallocator>> {
        self.named.insert(name.into(), preallocator)
    }

    /// Obtain the preallocator a setting refers to.
    pub fn resolve(&self, setting: &Setting) -> Result<Arc<dyn Preallocator>, Error> {
        match setting {
            Setting::Default => Ok(Arc::new(DefaultPreallocator)),
            Setting::RangeSize(size) => Ok(Arc::new(FixedRangeSize(*size))),
            Setting::Named(name) => self
                .named
                .get(name)
                .map(Arc::clone)
                .ok_or_else(|| Error::UnknownPreallocator(name.clone())),
        }
    }

    /// Parse and resolve a raw property value in one go.
    pub fn resolve_property(&self, value: Option<&str>) -> Result<Arc<dyn Preallocator>, Error> {
        let setting = Setting::from_property(value)?;
        self.resolve(&setting)
    }
}
