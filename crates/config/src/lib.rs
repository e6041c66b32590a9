//! Scenario models and loaders for Terminus.
//!
//! A scenario file (YAML, or TOML when the extension is `.toml`) describes
//! the bodies known to the in-memory ephemeris, the plate models loaded for
//! topographic targets, and the terminator request to run.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use terminus_core::constants::SSB_CODE;
use terminus_core::matrix::{IDENTITY, Matrix3};
use terminus_core::time::{TimeError, parse_epoch};
use terminus_core::units::deg_to_rad;
use terminus_ephemeris::{
    AberrationCorrection, Body, BodyRecord, CatalogEphemeris, EphemerisError, Orientation,
    Trajectory, normalize_name,
};
use terminus_method::{MethodError, MethodSpec};
use terminus_surface::obj::load_obj;
use terminus_surface::{PlateModel, PlateSurfaceStore, SurfaceError};
use terminus_terminator::{CorrectionLocus, TerminatorError, TerminatorRequest};
use thiserror::Error;
use tracing::debug;

/// Top-level scenario document.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceConfig>,
    pub request: RequestConfig,
}

/// A body reference written either as an integer code or a name.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum BodyRef {
    Code(i32),
    Name(String),
}

impl BodyRef {
    fn to_body(&self) -> Body {
        match self {
            BodyRef::Code(code) => Body::Code(*code),
            BodyRef::Name(name) => body_from_str(name),
        }
    }
}

/// An epoch written as ET seconds or as a TDB calendar string.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum EpochConfig {
    Seconds(f64),
    Calendar(String),
}

impl Default for EpochConfig {
    fn default() -> Self {
        EpochConfig::Seconds(0.0)
    }
}

impl EpochConfig {
    pub fn seconds(&self) -> Result<f64, TimeError> {
        match self {
            EpochConfig::Seconds(et) => Ok(*et),
            EpochConfig::Calendar(text) => parse_epoch(text),
        }
    }
}

/// Body models for the in-memory ephemeris.
#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub code: i32,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub radii_km: Option<[f64; 3]>,
    #[serde(default)]
    pub trajectory: Option<TrajectoryConfig>,
    #[serde(default)]
    pub orientation: Option<OrientationConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum TrajectoryConfig {
    /// Uniform motion relative to `center`.
    #[serde(rename = "linear")]
    Linear {
        center: BodyRef,
        #[serde(default)]
        epoch: EpochConfig,
        position_km: [f64; 3],
        #[serde(default)]
        velocity_km_s: [f64; 3],
    },
    /// Circular orbit about `center`; `node` points at phase zero.
    #[serde(rename = "circular")]
    Circular {
        center: BodyRef,
        radius_km: f64,
        period_s: f64,
        #[serde(default)]
        epoch: EpochConfig,
        #[serde(default)]
        phase_deg: f64,
        #[serde(default = "default_pole")]
        pole: [f64; 3],
        #[serde(default = "default_node")]
        node: [f64; 3],
    },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum OrientationConfig {
    /// Constant J2000 to body-fixed rotation; identity when omitted.
    #[serde(rename = "fixed")]
    Fixed {
        #[serde(default)]
        matrix: Option<Matrix3>,
    },
    /// IAU-style pole and prime meridian model.
    #[serde(rename = "iau")]
    Iau {
        pole_ra_deg: f64,
        #[serde(default)]
        pole_ra_rate_deg_per_century: f64,
        pole_dec_deg: f64,
        #[serde(default)]
        pole_dec_rate_deg_per_century: f64,
        prime_meridian_deg: f64,
        rotation_rate_deg_per_day: f64,
    },
}

/// Additional body-fixed frame sharing a body's orientation model.
#[derive(Debug, Deserialize, Clone)]
pub struct FrameConfig {
    pub name: String,
    pub center: BodyRef,
}

/// One plate model for a body.
#[derive(Debug, Deserialize, Clone)]
pub struct SurfaceConfig {
    pub body: BodyRef,
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    pub shape: SurfaceShapeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum SurfaceShapeConfig {
    /// Wavefront OBJ file; relative paths are resolved against the scenario
    /// file's directory.
    #[serde(rename = "obj")]
    Obj { path: PathBuf },
    /// Latitude/longitude tessellation of an ellipsoid (the body's radii when
    /// `radii_km` is omitted).
    #[serde(rename = "tessellated")]
    Tessellated {
        #[serde(default)]
        radii_km: Option<[f64; 3]>,
        bands: usize,
        slices: usize,
    },
}

/// Terminator request as written in scenario files. Angles are in degrees
/// except the DSK search step and tolerance, which are radians.
#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    pub method: String,
    #[serde(alias = "source")]
    pub illumination_source: String,
    pub target: String,
    pub observer: String,
    pub epoch: EpochConfig,
    pub frame: String,
    #[serde(default = "default_correction")]
    pub aberration_correction: String,
    #[serde(default = "default_locus")]
    pub locus: String,
    #[serde(default = "default_pole")]
    pub reference_vector: [f64; 3],
    #[serde(default = "default_cut_count")]
    pub cut_count: usize,
    #[serde(default)]
    pub roll_step_deg: Option<f64>,
    #[serde(default)]
    pub search_step: Option<f64>,
    #[serde(default)]
    pub solution_tolerance: Option<f64>,
    #[serde(default)]
    pub max_points: Option<usize>,
}

fn default_pole() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

fn default_node() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

fn default_correction() -> String {
    "NONE".to_string()
}

fn default_locus() -> String {
    "CENTER".to_string()
}

fn default_cut_count() -> usize {
    1
}

/// Errors that can occur while loading or building scenarios.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid epoch: {0}")]
    Epoch(#[from] TimeError),
    #[error("invalid method: {0}")]
    Method(#[from] MethodError),
    #[error("invalid ephemeris setting: {0}")]
    Ephemeris(#[from] EphemerisError),
    #[error("invalid request: {0}")]
    Request(#[from] TerminatorError),
    #[error("failed to build surface: {0}")]
    Surface(#[from] SurfaceError),
    #[error("{0}")]
    Invalid(String),
}

/// Providers and request assembled from a scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: Option<String>,
    pub ephemeris: CatalogEphemeris,
    pub surfaces: PlateSurfaceStore,
    pub request: TerminatorRequest,
}

/// Load a scenario document. Relative OBJ paths are made relative to the
/// scenario file's directory.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    let mut config: ScenarioConfig = load_document(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for surface in &mut config.surfaces {
        if let SurfaceShapeConfig::Obj { path: obj_path } = &mut surface.shape {
            if obj_path.is_relative() {
                *obj_path = base.join(&*obj_path);
            }
        }
    }
    debug!(
        path = %path.display(),
        bodies = config.bodies.len(),
        surfaces = config.surfaces.len(),
        "loaded scenario"
    );
    Ok(config)
}

/// Load and build a scenario in one step.
pub fn load_and_build<P: AsRef<Path>>(path: P) -> Result<Scenario, ConfigError> {
    load_scenario(path)?.build()
}

fn load_document<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

impl ScenarioConfig {
    pub fn build(&self) -> Result<Scenario, ConfigError> {
        let ephemeris = self.build_ephemeris()?;
        let surfaces = self.build_surfaces()?;
        let request = self.request.build()?;
        Ok(Scenario {
            name: self.name.clone(),
            ephemeris,
            surfaces,
            request,
        })
    }

    /// Name and alias lookup over the configured bodies.
    fn body_codes(&self) -> HashMap<String, i32> {
        let mut codes = HashMap::from([
            ("SSB".to_string(), SSB_CODE),
            ("SOLAR SYSTEM BARYCENTER".to_string(), SSB_CODE),
        ]);
        for body in &self.bodies {
            codes.insert(normalize_name(&body.name), body.code);
            for alias in &body.aliases {
                codes.insert(normalize_name(alias), body.code);
            }
        }
        codes
    }

    fn resolve(&self, codes: &HashMap<String, i32>, body: &BodyRef) -> Result<i32, ConfigError> {
        match body.to_body() {
            Body::Code(code) => Ok(code),
            Body::Name(name) => codes
                .get(&name)
                .copied()
                .ok_or_else(|| ConfigError::Invalid(format!("unknown body `{name}`"))),
        }
    }

    pub fn build_ephemeris(&self) -> Result<CatalogEphemeris, ConfigError> {
        let codes = self.body_codes();
        let mut catalog = CatalogEphemeris::new();
        for body in &self.bodies {
            let mut record = BodyRecord::new(body.code, &body.name);
            if let Some(radii) = body.radii_km {
                record = record.with_radii(radii);
            }
            if let Some(trajectory) = &body.trajectory {
                record = record.with_trajectory(self.trajectory(&codes, trajectory)?);
            }
            if let Some(orientation) = &body.orientation {
                record = record.with_orientation(orientation.build());
            }
            catalog.insert(record);
            for alias in &body.aliases {
                catalog.add_alias(alias, body.code);
            }
        }
        for frame in &self.frames {
            let center = self.resolve(&codes, &frame.center)?;
            catalog.add_body_fixed_frame(&frame.name, center);
        }
        Ok(catalog)
    }

    fn trajectory(
        &self,
        codes: &HashMap<String, i32>,
        config: &TrajectoryConfig,
    ) -> Result<Trajectory, ConfigError> {
        Ok(match config {
            TrajectoryConfig::Linear {
                center,
                epoch,
                position_km,
                velocity_km_s,
            } => Trajectory::Linear {
                center: self.resolve(codes, center)?,
                epoch: epoch.seconds()?,
                position_km: *position_km,
                velocity_km_s: *velocity_km_s,
            },
            TrajectoryConfig::Circular {
                center,
                radius_km,
                period_s,
                epoch,
                phase_deg,
                pole,
                node,
            } => {
                if !(*radius_km > 0.0 && *period_s > 0.0) {
                    return Err(ConfigError::Invalid(
                        "circular trajectories need a positive radius and period".to_string(),
                    ));
                }
                Trajectory::Circular {
                    center: self.resolve(codes, center)?,
                    radius_km: *radius_km,
                    period_s: *period_s,
                    epoch: epoch.seconds()?,
                    phase_rad: deg_to_rad(*phase_deg),
                    pole: *pole,
                    node: *node,
                }
            }
        })
    }

    pub fn build_surfaces(&self) -> Result<PlateSurfaceStore, ConfigError> {
        let codes = self.body_codes();
        let mut store = PlateSurfaceStore::new();
        for surface in &self.surfaces {
            let body = self.resolve(&codes, &surface.body)?;
            let model = match &surface.shape {
                SurfaceShapeConfig::Obj { path } => load_obj(path, body, surface.id)?,
                SurfaceShapeConfig::Tessellated {
                    radii_km,
                    bands,
                    slices,
                } => {
                    let radii = radii_km
                        .or_else(|| {
                            self.bodies
                                .iter()
                                .find(|config| config.code == body)
                                .and_then(|config| config.radii_km)
                        })
                        .ok_or_else(|| {
                            ConfigError::Invalid(format!(
                                "surface {} needs radii_km: body {body} has no radii",
                                surface.id
                            ))
                        })?;
                    PlateModel::from_ellipsoid(body, surface.id, radii, *bands, *slices)?
                }
            };
            store.insert(model);
            if let Some(name) = &surface.name {
                store.name_surface(name, surface.id, body);
            }
        }
        Ok(store)
    }
}

impl OrientationConfig {
    fn build(&self) -> Orientation {
        match self {
            OrientationConfig::Fixed { matrix } => Orientation::Fixed(matrix.unwrap_or(IDENTITY)),
            OrientationConfig::Iau {
                pole_ra_deg,
                pole_ra_rate_deg_per_century,
                pole_dec_deg,
                pole_dec_rate_deg_per_century,
                prime_meridian_deg,
                rotation_rate_deg_per_day,
            } => Orientation::Iau {
                pole_ra_deg: *pole_ra_deg,
                pole_ra_rate_deg_per_century: *pole_ra_rate_deg_per_century,
                pole_dec_deg: *pole_dec_deg,
                pole_dec_rate_deg_per_century: *pole_dec_rate_deg_per_century,
                prime_meridian_deg: *prime_meridian_deg,
                rotation_rate_deg_per_day: *rotation_rate_deg_per_day,
            },
        }
    }
}

impl RequestConfig {
    pub fn build(&self) -> Result<TerminatorRequest, ConfigError> {
        let method = MethodSpec::parse(&self.method)?;
        let correction: AberrationCorrection = self.aberration_correction.parse()?;
        let locus: CorrectionLocus = self.locus.parse()?;
        let mut request = TerminatorRequest::new(
            method,
            body_from_str(&self.illumination_source),
            body_from_str(&self.target),
            body_from_str(&self.observer),
            &self.frame,
            self.epoch.seconds()?,
        )
        .with_correction(correction, locus)
        .with_cuts(self.reference_vector, self.cut_count);
        if let Some(step) = self.roll_step_deg {
            request = request.with_roll_step(deg_to_rad(step));
        }
        if let Some(step) = self.search_step {
            request.search_step = step;
        }
        if let Some(tolerance) = self.solution_tolerance {
            request.solution_tolerance = tolerance;
        }
        if let Some(max_points) = self.max_points {
            request.max_points = max_points;
        }
        Ok(request)
    }
}

fn body_from_str(text: &str) -> Body {
    text.parse().unwrap_or_else(|never| match never {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;
    use std::io::Write;
    use terminus_ephemeris::EphemerisProvider;
    use terminus_surface::SurfaceProvider;

    const YAML: &str = r#"
name: phobos
bodies:
  - name: SUN
    code: 10
    radii_km: [696000.0, 696000.0, 696000.0]
    trajectory: { type: linear, center: SSB, position_km: [0.0, 0.0, 0.0] }
  - name: PHOBOS
    code: 401
    aliases: [M1]
    radii_km: [13.0, 11.4, 9.1]
    trajectory: { type: linear, center: 10, position_km: [2.28e8, 0.0, 0.0] }
    orientation: { type: fixed }
  - name: MGS
    code: -94
    trajectory:
      type: circular
      center: m1
      radius_km: 100.0
      period_s: 3600.0
surfaces:
  - body: PHOBOS
    id: 1
    name: Phobos low res
    shape: { type: tessellated, bands: 10, slices: 20 }
request:
  method: umbral/tangent/dsk/unprioritized/surfaces="PHOBOS LOW RES"
  source: SUN
  target: PHOBOS
  observer: MGS
  epoch: "2000 JAN 01 12:00:10 TDB"
  frame: IAU_PHOBOS
  aberration_correction: lt+s
  cut_count: 4
"#;

    #[test]
    fn yaml_scenario_builds_providers_and_request() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let scenario = load_and_build(file.path()).unwrap();

        let phobos = scenario.ephemeris.body_code(&Body::named("m1")).unwrap();
        assert_eq!(phobos, 401);
        assert!(scenario.ephemeris.frame("iau_phobos").is_ok());
        assert!(scenario.surfaces.has_data(401, &Default::default()));
        assert_eq!(scenario.surfaces.registry().code_for("phobos low res", 401), Some(1));

        let request = &scenario.request;
        assert_relative_eq!(request.epoch, 10.0);
        assert_eq!(request.aberration_correction, AberrationCorrection::LtS);
        assert_eq!(request.cut_count, 4);
        assert_relative_eq!(request.roll_step, TAU / 4.0);
        assert_eq!(request.illumination_source, Body::named("sun"));
    }

    #[test]
    fn toml_scenarios_are_selected_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[[bodies]]
name = "MARS"
code = 499
radii_km = [3396.19, 3396.19, 3376.2]
orientation = {{ type = "iau", pole_ra_deg = 317.68, pole_dec_deg = 52.89, prime_meridian_deg = 176.63, rotation_rate_deg_per_day = 350.892 }}

[request]
method = "PENUMBRAL/GUIDED/ELLIPSOID"
illumination_source = "SUN"
target = "MARS"
observer = "EARTH"
epoch = 0.0
frame = "IAU_MARS"
cut_count = 3
roll_step_deg = 90.0
"#
        )
        .unwrap();
        let config = load_scenario(file.path()).unwrap();
        let request = config.request.build().unwrap();
        assert_relative_eq!(request.roll_step, std::f64::consts::FRAC_PI_2);
        assert!(config.build_ephemeris().unwrap().frame("IAU_MARS").is_ok());
    }

    #[test]
    fn bad_method_and_unknown_centers_are_reported() {
        let mut config: ScenarioConfig = serde_yaml::from_str(YAML).unwrap();
        config.request.method = "UMBRAL/DSK".to_string();
        assert!(matches!(config.request.build(), Err(ConfigError::Method(_))));

        config.bodies[2].trajectory = Some(TrajectoryConfig::Linear {
            center: BodyRef::Name("DEIMOS".to_string()),
            epoch: EpochConfig::default(),
            position_km: [0.0; 3],
            velocity_km_s: [0.0; 3],
        });
        assert!(matches!(config.build_ephemeris(), Err(ConfigError::Invalid(_))));
    }
}
