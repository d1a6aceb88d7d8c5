//! Biome resolution from heat/moisture terrain-type pairs.
//!
//! Tile generation only depends on the [`BiomeResolver`] trait; [`BiomeTable`]
//! is a table-driven implementation with name-based registration and a
//! `(heat index, moisture index)` lookup grid.

use hashbrown::HashMap;

use crate::classify::{ColorRaster, TerrainTable, TerrainType, TerrainTypeMap};
use crate::error::TerrainResult;
use crate::field::Grid;
use crate::gradient::Rgba;

/// Unique identifier for a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BiomeId(pub u16);

/// Maps a cell's heat and moisture bands to a biome.
pub trait BiomeResolver {
    /// Biome for a heat/moisture band pair.
    fn resolve(&self, heat: &TerrainType, moisture: &TerrainType) -> BiomeId;

    /// Display color of `biome`, used for the biome visualization.
    fn color(&self, biome: BiomeId) -> Rgba;
}

/// Descriptor of a registered biome.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDef {
    /// Human-readable name (e.g. "tundra").
    pub name: String,
    /// Color used when rendering the biome map.
    pub color: Rgba,
}

/// Errors raised while building a [`BiomeTable`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BiomeTableError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// A lookup entry names a biome that was never registered.
    #[error("unknown biome: {0}")]
    UnknownBiome(String),
}

/// Registry of biomes plus a heat × moisture lookup.
pub struct BiomeTable {
    biomes: Vec<BiomeDef>,
    name_to_id: HashMap<String, BiomeId>,
    lookup: HashMap<(i32, i32), BiomeId>,
    fallback: Option<BiomeId>,
}

impl BiomeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
            lookup: HashMap::new(),
            fallback: None,
        }
    }

    /// Registers a new biome, returning its [`BiomeId`]. The first registered
    /// biome becomes the fallback until [`BiomeTable::set_fallback`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeTableError::DuplicateName`] if a biome with the same name exists.
    pub fn register(&mut self, def: BiomeDef) -> Result<BiomeId, BiomeTableError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(BiomeTableError::DuplicateName(def.name.clone()));
        }
        let id = BiomeId(self.biomes.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.biomes.push(def);
        self.fallback.get_or_insert(id);
        Ok(id)
    }

    /// Assign the biome named `name` to a heat/moisture index pair.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeTableError::UnknownBiome`] if `name` is not registered.
    pub fn assign(
        &mut self,
        heat_index: i32,
        moisture_index: i32,
        name: &str,
    ) -> Result<(), BiomeTableError> {
        let id = self
            .lookup_by_name(name)
            .ok_or_else(|| BiomeTableError::UnknownBiome(name.to_string()))?;
        self.lookup.insert((heat_index, moisture_index), id);
        Ok(())
    }

    /// Biome returned for pairs with no explicit assignment.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeTableError::UnknownBiome`] if `name` is not registered.
    pub fn set_fallback(&mut self, name: &str) -> Result<(), BiomeTableError> {
        let id = self
            .lookup_by_name(name)
            .ok_or_else(|| BiomeTableError::UnknownBiome(name.to_string()))?;
        self.fallback = Some(id);
        Ok(())
    }

    /// Returns the definition for the given biome ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: BiomeId) -> &BiomeDef {
        &self.biomes[id.0 as usize]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BiomeResolver for BiomeTable {
    fn resolve(&self, heat: &TerrainType, moisture: &TerrainType) -> BiomeId {
        self.lookup
            .get(&(heat.index, moisture.index))
            .copied()
            .or(self.fallback)
            .unwrap_or(BiomeId(0))
    }

    fn color(&self, biome: BiomeId) -> Rgba {
        self.biomes
            .get(biome.0 as usize)
            .map_or(Rgba::CLEAR, |def| def.color)
    }
}

/// Resolve the biome of every cell from its heat and moisture bands.
///
/// # Errors
///
/// [`crate::TerrainError::ShapeMismatch`] if the two maps differ in shape.
pub fn resolve_biomes(
    heat_map: &TerrainTypeMap,
    heat_table: &TerrainTable,
    moisture_map: &TerrainTypeMap,
    moisture_table: &TerrainTable,
    resolver: &dyn BiomeResolver,
) -> TerrainResult<Grid<BiomeId>> {
    heat_map.bands().ensure_same_shape(moisture_map.bands())?;
    let (width, height) = heat_map.dimensions();
    Ok(Grid::from_fn(width, height, |x, z| {
        resolver.resolve(
            heat_map.terrain_type(heat_table, x, z),
            moisture_map.terrain_type(moisture_table, x, z),
        )
    }))
}

/// Color every cell by its resolved biome.
pub fn biome_raster(biomes: &Grid<BiomeId>, resolver: &dyn BiomeResolver) -> ColorRaster {
    Grid::from_fn(biomes.width(), biomes.height(), |x, z| {
        resolver.color(*biomes.get(x, z))
    })
}
