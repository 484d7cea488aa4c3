//! Typed descriptors attached to vector features.
//!
//! A descriptor carries the category of a feature plus the attributes the
//! tile-to-mesh stage needs (building height, path type, ...).

use serde::Serialize;

/// Point feature categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Tree,
    Rock,
    Hydrant,
    TransmissionTower,
    UtilityPole,
    Artwork,
    AdColumn,
    WindTurbine,
}

/// Descriptor of a point feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VectorNodeDescriptor {
    pub kind: Option<NodeKind>,
    /// Facing direction in degrees clockwise from north.
    pub direction: Option<f64>,
    /// Height in meters.
    pub height: Option<f64>,
}

/// Line feature categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PolylineKind {
    Path,
    Fence,
    Hedge,
    PowerLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathKind {
    Roadway,
    Footway,
    Cycleway,
    Railway,
    Tramway,
    Runway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathMaterial {
    Asphalt,
    Concrete,
    Dirt,
    Sand,
    Gravel,
    Cobblestone,
    Wood,
}

/// Which side of a line a feature (e.g. a sidewalk) is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Both,
    Left,
    Right,
}

/// Descriptor of a line feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPolylineDescriptor {
    pub kind: PolylineKind,
    pub path_kind: Option<PathKind>,
    pub path_material: Option<PathMaterial>,
    /// Width in meters.
    pub width: Option<f64>,
    /// Height in meters (fences, hedges, power lines).
    pub height: Option<f64>,
    pub min_height: Option<f64>,
    pub lanes_forward: Option<u32>,
    pub lanes_backward: Option<u32>,
    pub side: Option<Side>,
}

impl VectorPolylineDescriptor {
    /// A descriptor with only the category set.
    pub fn new(kind: PolylineKind) -> Self {
        Self {
            kind,
            path_kind: None,
            path_material: None,
            width: None,
            height: None,
            min_height: None,
            lanes_forward: None,
            lanes_backward: None,
            side: None,
        }
    }
}

/// Area feature categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AreaKind {
    Building,
    BuildingPart,
    Asphalt,
    RoadwayIntersection,
    Pavement,
    Water,
    Farmland,
    Grass,
    Sand,
    Rock,
    Pitch,
    ManicuredGrass,
    Helipad,
    Forest,
    Garden,
    Construction,
    BuildingConstruction,
}

impl AreaKind {
    /// Whether features of this category carry an authoritative,
    /// self-contained outline.
    ///
    /// Such outlines must come from the tile that owns them: copies that a
    /// provider returns for a neighboring tile are clipped, and overlapping
    /// copies are deduplicated.
    pub fn requires_authoritative_outline(&self) -> bool {
        matches!(self, AreaKind::Building | AreaKind::BuildingPart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IntersectionMaterial {
    Asphalt,
    Concrete,
    Cobblestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PitchKind {
    Football,
    Basketball,
    Tennis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoofType {
    Flat,
    Hipped,
    Gabled,
    Pyramidal,
    Onion,
    Dome,
    Round,
    Skillion,
    Mansard,
    QuadrupleSaltbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoofOrientation {
    Along,
    Across,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FacadeMaterial {
    Plaster,
    Brick,
    Wood,
    Glass,
    Mirror,
    CementBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoofMaterial {
    Default,
    Tiles,
    Metal,
    Concrete,
    Thatch,
    Eternit,
    Grass,
    Glass,
    Tar,
}

/// Building attributes of building and building-part areas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingAttributes {
    pub levels: Option<f64>,
    /// Total height in meters, roof included.
    pub height: Option<f64>,
    pub min_height: Option<f64>,
    pub roof_height: Option<f64>,
    pub roof_type: RoofType,
    pub roof_orientation: Option<RoofOrientation>,
    /// Roof direction in degrees clockwise from north.
    pub roof_direction: Option<f64>,
    pub roof_angle: Option<f64>,
    pub facade_material: FacadeMaterial,
    /// Facade color as `0xRRGGBB`.
    pub facade_color: Option<u32>,
    pub roof_material: RoofMaterial,
    /// Roof color as `0xRRGGBB`.
    pub roof_color: Option<u32>,
    pub windows: bool,
}

impl Default for BuildingAttributes {
    fn default() -> Self {
        Self {
            levels: None,
            height: None,
            min_height: None,
            roof_height: None,
            roof_type: RoofType::Flat,
            roof_orientation: None,
            roof_direction: None,
            roof_angle: None,
            facade_material: FacadeMaterial::Plaster,
            facade_color: None,
            roof_material: RoofMaterial::Default,
            roof_color: None,
            windows: true,
        }
    }
}

/// Descriptor of an area feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorAreaDescriptor {
    pub kind: AreaKind,
    pub label: Option<String>,
    pub intersection_material: Option<IntersectionMaterial>,
    pub pitch_kind: Option<PitchKind>,
    pub building: Option<BuildingAttributes>,
}

impl VectorAreaDescriptor {
    /// A descriptor with only the category set.
    pub fn new(kind: AreaKind) -> Self {
        Self {
            kind,
            label: None,
            intersection_material: None,
            pitch_kind: None,
            building: None,
        }
    }

    /// A building or building part descriptor.
    pub fn building(kind: AreaKind, attributes: BuildingAttributes) -> Self {
        Self {
            building: Some(attributes),
            ..Self::new(kind)
        }
    }
}
