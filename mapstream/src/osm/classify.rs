//! Tag classification into feature descriptors.

use super::tags::{
    is_yes, parse_color, parse_direction, parse_length, parse_levels, parse_u32, Tags,
};
use crate::vector::{
    AreaKind, BuildingAttributes, FacadeMaterial, IntersectionMaterial, NodeKind, PathKind,
    PathMaterial, PitchKind, PolylineKind, RoofMaterial, RoofOrientation, RoofType, Side,
    VectorAreaDescriptor, VectorNodeDescriptor, VectorPolylineDescriptor,
};

/// Default lane width used when a road has no explicit width, in meters.
const LANE_WIDTH: f64 = 3.0;

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

/// Descriptor for a standalone node, `None` when the node is not a feature.
pub fn node_descriptor(tags: &Tags) -> Option<VectorNodeDescriptor> {
    let kind = match (
        tag(tags, "natural"),
        tag(tags, "emergency"),
        tag(tags, "power"),
        tag(tags, "tourism"),
        tag(tags, "advertising"),
    ) {
        (Some("tree"), ..) => NodeKind::Tree,
        (Some("stone" | "rock"), ..) => NodeKind::Rock,
        (_, Some("fire_hydrant"), ..) => NodeKind::Hydrant,
        (_, _, Some("tower"), ..) => NodeKind::TransmissionTower,
        (_, _, Some("pole"), ..) => NodeKind::UtilityPole,
        (_, _, Some("generator"), ..) if tag(tags, "generator:source") == Some("wind") => {
            NodeKind::WindTurbine
        }
        (_, _, _, Some("artwork"), _)
            if matches!(tag(tags, "artwork_type"), Some("statue" | "sculpture") | None) =>
        {
            NodeKind::Artwork
        }
        (.., Some("column")) => NodeKind::AdColumn,
        _ => return None,
    };

    Some(VectorNodeDescriptor {
        kind: Some(kind),
        direction: tag(tags, "direction").and_then(parse_direction),
        height: tag(tags, "height").and_then(parse_length),
    })
}

fn path_kind(tags: &Tags) -> Option<PathKind> {
    if let Some(highway) = tag(tags, "highway") {
        return match highway {
            "motorway" | "trunk" | "primary" | "secondary" | "tertiary" | "unclassified"
            | "residential" | "service" | "living_street" | "track" | "motorway_link"
            | "trunk_link" | "primary_link" | "secondary_link" | "tertiary_link" => {
                Some(PathKind::Roadway)
            }
            "footway" | "path" | "pedestrian" | "steps" | "bridleway" => Some(PathKind::Footway),
            "cycleway" => Some(PathKind::Cycleway),
            _ => None,
        };
    }
    if let Some(railway) = tag(tags, "railway") {
        return match railway {
            "rail" | "light_rail" | "subway" | "narrow_gauge" | "monorail" => {
                Some(PathKind::Railway)
            }
            "tram" => Some(PathKind::Tramway),
            _ => None,
        };
    }
    match tag(tags, "aeroway") {
        Some("runway" | "taxiway") => Some(PathKind::Runway),
        _ => None,
    }
}

fn path_material(surface: &str) -> Option<PathMaterial> {
    Some(match surface {
        "asphalt" | "paved" => PathMaterial::Asphalt,
        "concrete" | "concrete:plates" | "concrete:lanes" => PathMaterial::Concrete,
        "dirt" | "earth" | "ground" | "mud" | "unpaved" => PathMaterial::Dirt,
        "sand" => PathMaterial::Sand,
        "gravel" | "fine_gravel" | "pebblestone" | "compacted" => PathMaterial::Gravel,
        "cobblestone" | "sett" | "paving_stones" | "unhewn_cobblestone" => PathMaterial::Cobblestone,
        "wood" => PathMaterial::Wood,
        _ => return None,
    })
}

/// Lane split of a road: `(forward, backward)`.
fn lanes(tags: &Tags) -> (Option<u32>, Option<u32>) {
    let forward = tag(tags, "lanes:forward").and_then(parse_u32);
    let backward = tag(tags, "lanes:backward").and_then(parse_u32);
    if forward.is_some() || backward.is_some() {
        return (forward, backward);
    }

    let Some(total) = tag(tags, "lanes").and_then(parse_u32) else {
        return (None, None);
    };
    if is_yes(tags.get("oneway")) {
        return (Some(total), Some(0));
    }
    let forward = total.div_ceil(2);
    (Some(forward), Some(total - forward))
}

fn sidewalk_side(tags: &Tags) -> Option<Side> {
    match tag(tags, "sidewalk") {
        Some("both") => Some(Side::Both),
        Some("left") => Some(Side::Left),
        Some("right") => Some(Side::Right),
        _ => None,
    }
}

/// Descriptor for a linear way, `None` when the way is not a line feature.
pub fn polyline_descriptor(tags: &Tags) -> Option<VectorPolylineDescriptor> {
    if let Some(kind) = path_kind(tags) {
        let (lanes_forward, lanes_backward) = lanes(tags);
        let width = tag(tags, "width").and_then(parse_length).or_else(|| {
            let total = lanes_forward.unwrap_or(0) + lanes_backward.unwrap_or(0);
            (kind == PathKind::Roadway && total > 0).then(|| total as f64 * LANE_WIDTH)
        });
        return Some(VectorPolylineDescriptor {
            path_kind: Some(kind),
            path_material: tag(tags, "surface").and_then(path_material),
            width,
            lanes_forward,
            lanes_backward,
            side: sidewalk_side(tags),
            ..VectorPolylineDescriptor::new(PolylineKind::Path)
        });
    }

    let kind = match (tag(tags, "barrier"), tag(tags, "power")) {
        (Some("fence" | "wall"), _) => PolylineKind::Fence,
        (Some("hedge"), _) => PolylineKind::Hedge,
        (_, Some("line" | "minor_line")) => PolylineKind::PowerLine,
        _ => return None,
    };

    Some(VectorPolylineDescriptor {
        height: tag(tags, "height").and_then(parse_length),
        min_height: tag(tags, "min_height").and_then(parse_length),
        width: tag(tags, "width").and_then(parse_length),
        ..VectorPolylineDescriptor::new(kind)
    })
}

fn roof_type(shape: &str) -> Option<RoofType> {
    Some(match shape {
        "flat" => RoofType::Flat,
        "hipped" | "half-hipped" => RoofType::Hipped,
        "gabled" => RoofType::Gabled,
        "pyramidal" => RoofType::Pyramidal,
        "onion" => RoofType::Onion,
        "dome" => RoofType::Dome,
        "round" => RoofType::Round,
        "skillion" => RoofType::Skillion,
        "mansard" => RoofType::Mansard,
        "quadruple_saltbox" => RoofType::QuadrupleSaltbox,
        _ => return None,
    })
}

fn facade_material(material: &str) -> Option<FacadeMaterial> {
    Some(match material {
        "plaster" | "stucco" => FacadeMaterial::Plaster,
        "brick" => FacadeMaterial::Brick,
        "wood" | "timber_framing" => FacadeMaterial::Wood,
        "glass" => FacadeMaterial::Glass,
        "mirror" => FacadeMaterial::Mirror,
        "cement_block" | "concrete" => FacadeMaterial::CementBlock,
        _ => return None,
    })
}

fn roof_material(material: &str) -> Option<RoofMaterial> {
    Some(match material {
        "roof_tiles" | "tile" | "tiles" => RoofMaterial::Tiles,
        "metal" | "metal_sheet" | "copper" => RoofMaterial::Metal,
        "concrete" => RoofMaterial::Concrete,
        "thatch" => RoofMaterial::Thatch,
        "eternit" => RoofMaterial::Eternit,
        "grass" | "plants" => RoofMaterial::Grass,
        "glass" => RoofMaterial::Glass,
        "tar_paper" | "tar" => RoofMaterial::Tar,
        _ => return None,
    })
}

/// Building types that are rendered without windows.
fn has_windows(tags: &Tags, building: &str) -> bool {
    if tag(tags, "window") == Some("no") {
        return false;
    }
    !matches!(
        building,
        "garage" | "garages" | "shed" | "storage_tank" | "silo" | "hangar" | "roof" | "carport"
    )
}

/// Building attributes from tags.
pub fn building_attributes(tags: &Tags, building: &str) -> BuildingAttributes {
    BuildingAttributes {
        levels: tag(tags, "building:levels").and_then(parse_levels),
        height: tag(tags, "height").and_then(parse_length),
        min_height: tag(tags, "min_height").and_then(parse_length),
        roof_height: tag(tags, "roof:height").and_then(parse_length),
        roof_type: tag(tags, "roof:shape")
            .and_then(roof_type)
            .unwrap_or(RoofType::Flat),
        roof_orientation: match tag(tags, "roof:orientation") {
            Some("along") => Some(RoofOrientation::Along),
            Some("across") => Some(RoofOrientation::Across),
            _ => None,
        },
        roof_direction: tag(tags, "roof:direction").and_then(parse_direction),
        roof_angle: tag(tags, "roof:angle").and_then(|v| v.trim().parse().ok()),
        facade_material: tag(tags, "building:material")
            .and_then(facade_material)
            .unwrap_or(FacadeMaterial::Plaster),
        facade_color: tag(tags, "building:colour").and_then(parse_color),
        roof_material: tag(tags, "roof:material")
            .and_then(roof_material)
            .unwrap_or(RoofMaterial::Default),
        roof_color: tag(tags, "roof:colour").and_then(parse_color),
        windows: has_windows(tags, building),
    }
}

fn pitch_kind(sport: Option<&str>) -> Option<PitchKind> {
    match sport {
        Some("soccer" | "football") => Some(PitchKind::Football),
        Some("basketball") => Some(PitchKind::Basketball),
        Some("tennis") => Some(PitchKind::Tennis),
        _ => None,
    }
}

fn intersection_material(surface: Option<&str>) -> IntersectionMaterial {
    match surface {
        Some("concrete") => IntersectionMaterial::Concrete,
        Some("sett" | "cobblestone" | "paving_stones") => IntersectionMaterial::Cobblestone,
        _ => IntersectionMaterial::Asphalt,
    }
}

/// Descriptor for a closed way or multipolygon, `None` when the tags do not
/// describe an area.
pub fn area_descriptor(tags: &Tags) -> Option<VectorAreaDescriptor> {
    if let Some(building) = tag(tags, "building") {
        if building == "no" {
            return None;
        }
        if building == "construction" {
            return Some(VectorAreaDescriptor::new(AreaKind::BuildingConstruction));
        }
        return Some(VectorAreaDescriptor::building(
            AreaKind::Building,
            building_attributes(tags, building),
        ));
    }
    if let Some(part) = tag(tags, "building:part") {
        if part == "no" {
            return None;
        }
        return Some(VectorAreaDescriptor::building(
            AreaKind::BuildingPart,
            building_attributes(tags, part),
        ));
    }

    let kind = match (
        tag(tags, "natural"),
        tag(tags, "landuse"),
        tag(tags, "leisure"),
        tag(tags, "amenity"),
    ) {
        (Some("water"), ..) | (_, Some("reservoir" | "basin"), ..) => AreaKind::Water,
        (Some("wood"), ..) | (_, Some("forest"), ..) => AreaKind::Forest,
        (Some("sand" | "beach"), ..) => AreaKind::Sand,
        (Some("bare_rock" | "scree"), ..) => AreaKind::Rock,
        (Some("grassland" | "heath" | "scrub"), ..) | (_, Some("grass" | "meadow"), ..) => {
            AreaKind::Grass
        }
        (_, Some("farmland" | "orchard" | "vineyard" | "allotments"), ..) => AreaKind::Farmland,
        (_, Some("construction"), ..) => AreaKind::Construction,
        (_, _, Some("pitch"), _) => {
            return Some(VectorAreaDescriptor {
                pitch_kind: pitch_kind(tag(tags, "sport")),
                ..VectorAreaDescriptor::new(AreaKind::Pitch)
            });
        }
        (_, _, Some("park" | "golf_course"), _) => AreaKind::ManicuredGrass,
        (_, _, Some("garden"), _) => AreaKind::Garden,
        (_, _, _, Some("parking")) => AreaKind::Asphalt,
        _ => {
            if tag(tags, "aeroway") == Some("helipad") {
                AreaKind::Helipad
            } else if tag(tags, "area:highway").is_some() {
                if tag(tags, "junction") == Some("yes") {
                    return Some(VectorAreaDescriptor {
                        intersection_material: Some(intersection_material(tag(tags, "surface"))),
                        ..VectorAreaDescriptor::new(AreaKind::RoadwayIntersection)
                    });
                }
                AreaKind::Asphalt
            } else if tag(tags, "place") == Some("square")
                || (tag(tags, "highway") == Some("pedestrian") && is_yes(tags.get("area")))
            {
                AreaKind::Pavement
            } else {
                return None;
            }
        }
    };

    Some(VectorAreaDescriptor {
        label: tags.get("name").cloned(),
        ..VectorAreaDescriptor::new(kind)
    })
}
