//! INI parsing: `Ini` → `ConfigFile`.
//!
//! Starts from defaults and overlays every key present in the file.

use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::MAX_ZOOM;

pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [tiles]
    if let Some(section) = ini.section(Some("tiles")) {
        if let Some(v) = parse_value(section, "tiles", "max_resident", "must be a non-negative integer")? {
            config.tiles.max_resident = v;
        }
        if let Some(v) = parse_zoom(section, "data_zoom")? {
            config.tiles.data_zoom = v;
        }
        if let Some(v) = parse_zoom(section, "height_zoom")? {
            config.tiles.height_zoom = v;
        }
        if let Some(v) = parse_value::<f64>(section, "tiles", "frustum_far", "must be a distance in meters")? {
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid("tiles", "frustum_far", &v.to_string(), "must be positive"));
            }
            config.tiles.frustum_far = v;
        }
        if config.tiles.height_zoom > config.tiles.data_zoom {
            return Err(invalid(
                "tiles",
                "height_zoom",
                &config.tiles.height_zoom.to_string(),
                "must not exceed data_zoom",
            ));
        }
    }

    // [overpass]
    if let Some(section) = ini.section(Some("overpass")) {
        if let Some(v) = non_empty(section, "url") {
            config.overpass.url = v;
        }
        if let Some(v) = section.get("use_cached_tiles") {
            config.overpass.use_cached_tiles = parse_bool(v)
                .ok_or_else(|| invalid("overpass", "use_cached_tiles", v, "must be true or false"))?;
        }
        config.overpass.tile_server = non_empty(section, "tile_server").or(config.overpass.tile_server);
        if let Some(v) = parse_value::<f64>(section, "overpass", "request_margin", "must be a number of tiles")? {
            if !(v.is_finite() && v >= 0.0) {
                return Err(invalid("overpass", "request_margin", &v.to_string(), "must not be negative"));
            }
            config.overpass.request_margin = v;
        }
        if config.overpass.use_cached_tiles && config.overpass.tile_server.is_none() {
            return Err(invalid(
                "overpass",
                "tile_server",
                "",
                "required when use_cached_tiles = true",
            ));
        }
    }

    // [vector_tiles]
    if let Some(section) = ini.section(Some("vector_tiles")) {
        config.vector_tiles.url = non_empty(section, "url");
        config.vector_tiles.access_token = non_empty(section, "access_token");
        if let Some(url) = &config.vector_tiles.url {
            check_template("vector_tiles", url)?;
        }
    }

    // [elevation]
    if let Some(section) = ini.section(Some("elevation")) {
        if let Some(v) = non_empty(section, "url") {
            check_template("elevation", &v)?;
            config.elevation.url = v;
        }
    }

    // [http]
    if let Some(section) = ini.section(Some("http")) {
        if let Some(v) = parse_value::<u64>(section, "http", "timeout", "must be a positive integer (seconds)")? {
            if v == 0 {
                return Err(invalid("http", "timeout", "0", "must be a positive integer (seconds)"));
            }
            config.http.timeout = v;
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(section: &Properties, key: &str) -> Option<String> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_value<T: FromStr>(
    section: &Properties,
    name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| invalid(name, key, v, reason)),
    }
}

fn parse_zoom(section: &Properties, key: &str) -> Result<Option<u8>, ConfigFileError> {
    let reason = format!("must be a zoom level between 0 and {}", MAX_ZOOM);
    let zoom = parse_value::<u8>(section, "tiles", key, &reason)?;
    match zoom {
        Some(z) if z > MAX_ZOOM => Err(invalid("tiles", key, &z.to_string(), &reason)),
        other => Ok(other),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn check_template(section: &str, url: &str) -> Result<(), ConfigFileError> {
    if ["{z}", "{x}", "{y}"].iter().all(|p| url.contains(p)) {
        Ok(())
    } else {
        Err(invalid(section, "url", url, "must contain {z}, {x} and {y} placeholders"))
    }
}
