//! Command registry
//!
//! Two-level mapping of category name to command name to command. Both
//! levels keep registration order, which is also the order help lists them
//! in. Command names are unique across all categories.

use crate::{
    core::handler::{Handler, HandlerShape},
    error::{CommanderError, Result},
};
use indexmap::IndexMap;
use tracing::{debug, instrument, warn};

/// A named, described unit of work bound to a handler
#[derive(Debug)]
pub struct Command {
    name: String,
    description: String,
    handler: Handler,
}

impl Command {
    pub fn new(name: impl Into<String>, description: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn shape(&self) -> HandlerShape {
        self.handler.shape()
    }
}

/// Named group of related commands
#[derive(Debug)]
pub struct Category {
    name: String,
    commands: IndexMap<String, Command>,
}

impl Category {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Commands in registration order
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// All registered categories
#[derive(Debug, Default)]
pub struct Registry {
    categories: IndexMap<String, Category>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a category and return a handle for registering into it.
    ///
    /// Adding a name that already exists replaces that category with an
    /// empty one, keeping its position.
    pub fn add_category(&mut self, name: impl Into<String>) -> CategoryMut<'_> {
        let name = name.into();
        if let Some(old) = self
            .categories
            .insert(name.clone(), Category::new(name.clone()))
        {
            warn!(
                "Category '{}' re-added, dropping {} command(s)",
                name,
                old.len()
            );
        } else {
            debug!("Added category '{}'", name);
        }

        CategoryMut {
            registry: self,
            name,
        }
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    /// Categories in registration order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Find a command by exact name across all categories
    pub fn find_command(&self, name: &str) -> Result<(&Category, &Command)> {
        self.categories
            .values()
            .find_map(|cat| cat.get(name).map(|cmd| (cat, cmd)))
            .ok_or_else(|| CommanderError::unknown_command(name))
    }

    #[instrument(skip(self, command), fields(command = %command.name))]
    fn register(&mut self, category: &str, command: Command) -> Result<()> {
        if let Some(schema) = command.handler.schema() {
            schema.validate(&command.name)?;
        }

        if let Some(owner) = self
            .categories
            .values()
            .find(|cat| cat.name != category && cat.commands.contains_key(&command.name))
        {
            return Err(CommanderError::duplicate_command(&command.name, &owner.name));
        }

        let cat = self
            .categories
            .entry(category.to_string())
            .or_insert_with(|| Category::new(category));

        let name = command.name.clone();
        if cat.commands.insert(name.clone(), command).is_some() {
            debug!("Replaced command '{}' in category '{}'", name, category);
        } else {
            debug!("Registered command '{}' in category '{}'", name, category);
        }
        Ok(())
    }
}

/// Registration handle for one category
#[derive(Debug)]
pub struct CategoryMut<'a> {
    registry: &'a mut Registry,
    name: String,
}

impl CategoryMut<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a command, overwriting any command of the same name in this
    /// category. Fails if another category already owns the name or the
    /// handler's flag schema is unusable.
    pub fn register(&mut self, command: Command) -> Result<&mut Self> {
        self.registry.register(&self.name, command)?;
        Ok(self)
    }
}
