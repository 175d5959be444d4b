//! The library handle.
//!
//! [`Heracles`] owns the registered lenses and the configuration every forest
//! it creates starts from. Parsing runs a lens over text and materializes the
//! result as a [`Forest`]; rendering hands a forest's records back to a lens.

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::lens::Lens;
use crate::native::NativeHeap;
use crate::tree::Forest;

/// Errors raised by the handle itself, as opposed to its lenses.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    /// No lens is registered under the name.
    #[error("Unable to find lens {name}")]
    LensNotFound {
        /// The requested lens name
        name: String,
    },

    /// A lens with the same name is already registered.
    #[error("Lens {name} is already registered")]
    DuplicateLens {
        /// The conflicting lens name
        name: String,
    },

    /// More than one lens accepts the path.
    #[error("Multiple lenses apply to {path}: {}", .lenses.join(", "))]
    MultipleLenses {
        /// The path being resolved
        path: String,
        /// Names of every lens that accepted it
        lenses: Vec<String>,
    },
}

impl HandleError {
    /// Check if this error is a failed lens lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, HandleError::LensNotFound { .. })
    }

    /// Check if this error is an ambiguous lens lookup
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, HandleError::MultipleLenses { .. })
    }
}

impl From<HandleError> for crate::Error {
    fn from(err: HandleError) -> Self {
        crate::Error::Handle(err)
    }
}

/// Lens registry and entry point for parsing and rendering.
pub struct Heracles {
    config: Config,
    lenses: Vec<Box<dyn Lens>>,
}

impl Heracles {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            lenses: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Adds a lens. Names must be unique.
    pub fn register_lens(&mut self, lens: impl Lens + 'static) -> crate::Result<()> {
        if self.lenses.iter().any(|known| known.name() == lens.name()) {
            return Err(HandleError::DuplicateLens {
                name: lens.name().to_string(),
            }
            .into());
        }
        debug!(lens = lens.name(), "Registered lens");
        self.lenses.push(Box::new(lens));
        Ok(())
    }

    /// Registered lenses in registration order.
    pub fn lenses(&self) -> impl Iterator<Item = &(dyn Lens + 'static)> {
        self.lenses.iter().map(|lens| &**lens)
    }

    pub fn lens(&self, name: &str) -> crate::Result<&(dyn Lens + 'static)> {
        self.lenses()
            .find(|lens| lens.name() == name)
            .ok_or_else(|| {
                HandleError::LensNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// The single lens whose filters accept `path`.
    ///
    /// Returns `Ok(None)` when no lens applies.
    pub fn lens_for_path(&self, path: &str) -> crate::Result<Option<&(dyn Lens + 'static)>> {
        let matching: Vec<_> = self.lenses().filter(|lens| lens.applies_to(path)).collect();
        match matching.as_slice() {
            [] => Ok(None),
            [lens] => Ok(Some(*lens)),
            many => Err(HandleError::MultipleLenses {
                path: path.to_string(),
                lenses: many.iter().map(|lens| lens.name().to_string()).collect(),
            }
            .into()),
        }
    }

    /// An empty forest using this handle's configuration.
    pub fn new_tree(&self) -> Forest {
        Forest::with_config(self.config.tree)
    }

    /// Parses `text` with the lens registered as `name`.
    pub fn parse(&self, name: &str, text: &str) -> crate::Result<Forest> {
        let lens = self.lens(name)?;
        self.parse_with(lens, text)
    }

    /// Parses `text` with `lens` into a forest of bound nodes.
    pub fn parse_with(&self, lens: &dyn Lens, text: &str) -> crate::Result<Forest> {
        let mut heap = NativeHeap::new();
        let head = lens.get(&mut heap, text)?;
        debug!(lens = lens.name(), records = heap.live_count(), "Parsed text");
        Forest::from_native(heap, head, self.config.tree)
    }

    /// Renders `forest` with the lens registered as `name`.
    pub fn render(&self, name: &str, forest: &Forest, text: &str) -> crate::Result<String> {
        let lens = self.lens(name)?;
        self.render_with(lens, forest, text)
    }

    pub fn render_with(&self, lens: &dyn Lens, forest: &Forest, text: &str) -> crate::Result<String> {
        let rendered = lens.put(forest.native(), forest.root_head(), text)?;
        debug!(lens = lens.name(), bytes = rendered.len(), "Rendered forest");
        Ok(rendered)
    }

    /// Parses the file at `path` with whichever lens accepts it.
    pub fn parse_path(&self, path: &str, text: &str) -> crate::Result<Option<Forest>> {
        match self.lens_for_path(path)? {
            Some(lens) => self.parse_with(lens, text).map(Some),
            None => Ok(None),
        }
    }
}

impl Default for Heracles {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Heracles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heracles")
            .field("config", &self.config)
            .field("lenses", &self.lenses().map(|lens| lens.name()).collect::<Vec<_>>())
            .finish()
    }
}
