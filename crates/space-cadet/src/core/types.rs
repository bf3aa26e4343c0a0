//! Data model shared by the extractor, the reconciler and the display
//!
//! A [`ViewState`] is the thing that gets persisted and rendered: the list of
//! discovered classes plus whatever positions the user gave them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::MatchPolicy;
use super::error::{ExplorerError, Result};

/// Placeholder name for anonymous class declarations
pub const ANONYMOUS_CLASS_NAME: &str = "Unknown";

/// The file a class was declared in
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Source {
    path: String,
}

impl Source {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// A node position on the display surface
///
/// "Not yet placed" is `Option<Position>::None`, never a special value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates survive a JSON round-trip
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A discovered class declaration
///
/// Name and source are fixed at creation; only the position can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    name: String,
    source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
}

impl ClassEntity {
    /// Create an unplaced entity
    pub fn new(name: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            source,
            position: None,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn path(&self) -> &str {
        self.source.path()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    /// Whether this entity has the given merge key
    pub fn has_key(&self, name: &str, path: &str) -> bool {
        self.name == name && self.source.path() == path
    }
}

/// Snapshot of discovered classes and their display positions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    types: Vec<ClassEntity>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[ClassEntity] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn push(&mut self, entity: ClassEntity) {
        self.types.push(entity);
    }

    /// Number of entities with a position
    pub fn placed_count(&self) -> usize {
        self.types.iter().filter(|entity| entity.is_placed()).count()
    }

    /// Find an entity by its `(name, path)` key
    pub fn get(&self, name: &str, path: &str) -> Option<&ClassEntity> {
        self.types.iter().find(|entity| entity.has_key(name, path))
    }

    fn find_index(&self, path: &str, name: Option<&str>, policy: MatchPolicy) -> Option<usize> {
        let by_name = match (policy, name) {
            (MatchPolicy::PathAndName, Some(name)) => Some(name),
            _ => None,
        };
        self.types.iter().position(|entity| match by_name {
            Some(name) => entity.has_key(name, path),
            None => entity.path() == path,
        })
    }

    /// Move the entity matching `path` (and `name`, depending on `policy`)
    ///
    /// Linear scan; the view holds at most a few hundred classes.
    pub fn relocate(
        &mut self,
        path: &str,
        name: Option<&str>,
        position: Position,
        policy: MatchPolicy,
    ) -> Result<&ClassEntity> {
        if !position.is_finite() {
            return Err(ExplorerError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        let index = self
            .find_index(path, name, policy)
            .ok_or_else(|| ExplorerError::ApplyMoveNoMatch {
                path: path.to_string(),
            })?;
        self.types[index].set_position(position);
        Ok(&self.types[index])
    }

    /// Layer positions from `previous` onto entities with the same `(name, path)`
    ///
    /// Positions already set on `self` win. Returns how many were carried over.
    pub fn merge_positions(&mut self, previous: &ViewState) -> usize {
        let mut carried = 0;
        for entity in self.types.iter_mut().filter(|entity| !entity.is_placed()) {
            let placed = previous
                .get(entity.name(), entity.path())
                .and_then(ClassEntity::position);
            if let Some(position) = placed {
                entity.set_position(position);
                carried += 1;
            }
        }
        carried
    }
}

impl From<Vec<ClassEntity>> for ViewState {
    fn from(types: Vec<ClassEntity>) -> Self {
        Self { types }
    }
}

impl FromIterator<ClassEntity> for ViewState {
    fn from_iter<I: IntoIterator<Item = ClassEntity>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ViewState {
    type Item = &'a ClassEntity;
    type IntoIter = std::slice::Iter<'a, ClassEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
