// src/params/resolver.rs

//! Derive every role's [`ParameterSet`] from one [`SharedConfig`].

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::model::{Overrides, ProcessSettings};
use crate::errors::{LaunchError, Result};
use crate::params::{ParameterSet, ParameterSetBuilder, SharedConfig};
use crate::types::{roles, RoleName};

/// Resolver output: one parameter set per role.
pub type ResolvedParameters = BTreeMap<RoleName, ParameterSet>;

/// Node parameter names written by the resolver.
pub mod names {
    pub const USE_SIM_TIME: &str = "use_sim_time";
    pub const PUBLISH_TFS: &str = "publish_tfs";
    pub const SAM_NOT_CV: &str = "sam_not_cv";
    pub const MARKER_LENGTH: &str = "marker_length";
    pub const CORNER_MEASUREMENT_SIGMA: &str = "corner_measurement_sigma";
    pub const MAP_LOAD: &str = "marker_map_load_full_filename";
    pub const MAP_SAVE: &str = "marker_map_save_full_filename";
    pub const MAKE_NOT_USE_MAP: &str = "make_not_use_map";

    pub const RVIZ_CONFIG: &str = "rviz_config";

    pub const DRONE_IP: &str = "drone_ip";
    pub const COMMAND_PORT: &str = "command_port";
    pub const DRONE_PORT: &str = "drone_port";
    pub const DATA_PORT: &str = "data_port";
    pub const VIDEO_PORT: &str = "video_port";

    pub const STAMP_MSGS_WITH_CURRENT_TIME: &str = "stamp_msgs_with_current_time";
    pub const MAP_INIT_POSE_Z: &str = "map_init_pose_z";
    pub const PUBLISH_TFS_PER_MARKER: &str = "publish_tfs_per_marker";
    pub const PUBLISH_IMAGE_MARKED: &str = "publish_image_marked";

    pub const PUBLISH_MARKER_VISUALIZATIONS: &str = "publish_marker_visualizations";
    pub const MARKER_MAP_PUBLISH_FREQUENCY_HZ: &str = "marker_map_publish_frequency_hz";
    pub const MAP_INIT_STYLE: &str = "map_init_style";
    pub const MAP_INIT_ID: &str = "map_init_id";
}

/// Parameters whose value comes from [`SharedConfig`]. Overrides may not
/// touch them.
pub const SHARED_PARAMETERS: [&str; 8] = [
    names::USE_SIM_TIME,
    names::PUBLISH_TFS,
    names::SAM_NOT_CV,
    names::MARKER_LENGTH,
    names::CORNER_MEASUREMENT_SIGMA,
    names::MAP_LOAD,
    names::MAP_SAVE,
    names::MAKE_NOT_USE_MAP,
];

/// The nodes declare their switches as integers.
fn flag(b: bool) -> i64 {
    i64::from(b)
}

/// Pure function from shared settings + per-role settings to parameter sets.
#[derive(Debug, Clone, Copy)]
pub struct ParameterResolver<'a> {
    settings: &'a ProcessSettings,
    overrides: &'a Overrides,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(settings: &'a ProcessSettings, overrides: &'a Overrides) -> Self {
        Self {
            settings,
            overrides,
        }
    }

    /// Produce one parameter set per role.
    ///
    /// Validation happens up front, so an error means no set was produced.
    pub fn resolve(&self, shared: &SharedConfig) -> Result<ResolvedParameters> {
        shared.validate()?;
        check_overrides(self.overrides)?;

        info!(
            algorithm = %shared.algorithm,
            map_path = %shared.map_path,
            make_map = shared.make_map,
            marker_length = shared.marker_length,
            "resolving launch parameters"
        );

        let mut out = ResolvedParameters::new();
        out.insert(
            roles::VISUALIZER.to_string(),
            self.finish(roles::VISUALIZER, self.visualizer())?,
        );
        out.insert(
            roles::DRIVER.to_string(),
            self.finish(roles::DRIVER, self.driver())?,
        );
        out.insert(
            roles::LOCALIZER.to_string(),
            self.finish(roles::LOCALIZER, self.localizer(shared))?,
        );
        out.insert(
            roles::MAPPER.to_string(),
            self.finish(roles::MAPPER, self.mapper(shared))?,
        );

        // Overrides for roles outside the stock set still yield a set; plan
        // assembly decides whether the catalogue knows the role.
        for role in self.overrides.keys() {
            if !out.contains_key(role) {
                debug!(role = %role, "role only present in overrides");
                out.insert(role.clone(), self.finish(role, ParameterSetBuilder::new())?);
            }
        }

        Ok(out)
    }

    fn finish(&self, role: &str, mut builder: ParameterSetBuilder) -> Result<ParameterSet> {
        if let Some(ov) = self.overrides.get(role) {
            for (name, value) in ov {
                debug!(role, param = %name, %value, "applying parameter override");
                builder = builder.replace(name, value.clone())?;
            }
        }
        builder.build()
    }

    fn visualizer(&self) -> ParameterSetBuilder {
        ParameterSetBuilder::new().set(
            names::RVIZ_CONFIG,
            self.settings.visualizer.rviz_config.as_str(),
        )
    }

    fn driver(&self) -> ParameterSetBuilder {
        let d = &self.settings.driver;
        // The driver declares its ports as strings.
        ParameterSetBuilder::new()
            .set(names::DRONE_IP, d.drone_ip.as_str())
            .set(names::COMMAND_PORT, d.command_port.to_string())
            .set(names::DRONE_PORT, d.drone_port.to_string())
            .set(names::DATA_PORT, d.data_port.to_string())
            .set(names::VIDEO_PORT, d.video_port.to_string())
    }

    fn localizer(&self, shared: &SharedConfig) -> ParameterSetBuilder {
        let l = &self.settings.localizer;
        perception_common(shared)
            .set(
                names::STAMP_MSGS_WITH_CURRENT_TIME,
                flag(l.stamp_msgs_with_current_time),
            )
            .set(names::MAP_INIT_POSE_Z, l.map_init_pose_z)
            .set(names::PUBLISH_TFS_PER_MARKER, flag(l.publish_tfs_per_marker))
            .set(names::PUBLISH_IMAGE_MARKED, flag(l.publish_image_marked))
    }

    fn mapper(&self, shared: &SharedConfig) -> ParameterSetBuilder {
        let m = &self.settings.mapper;
        perception_common(shared)
            .set(names::MAP_SAVE, shared.map_path.as_str())
            .set(names::MAP_LOAD, shared.map_path.as_str())
            .set(names::MAKE_NOT_USE_MAP, flag(shared.make_map))
            .set_opt(
                names::PUBLISH_MARKER_VISUALIZATIONS,
                m.publish_marker_visualizations.map(flag),
            )
            .set_opt(
                names::MARKER_MAP_PUBLISH_FREQUENCY_HZ,
                m.marker_map_publish_frequency_hz,
            )
            .set_opt(names::MAP_INIT_STYLE, m.map_init_style)
            .set_opt(names::MAP_INIT_ID, m.map_init_id)
    }
}

/// Entries every perception node takes from the shared config.
fn perception_common(shared: &SharedConfig) -> ParameterSetBuilder {
    ParameterSetBuilder::new()
        .set(names::USE_SIM_TIME, shared.use_sim_time)
        .set(names::PUBLISH_TFS, flag(shared.publish_tfs))
        .set(names::SAM_NOT_CV, shared.algorithm.sam_not_cv())
        .set(names::MARKER_LENGTH, shared.marker_length)
        .set(
            names::CORNER_MEASUREMENT_SIGMA,
            shared.corner_measurement_sigma,
        )
}

fn check_overrides(overrides: &Overrides) -> Result<()> {
    for (role, params) in overrides {
        if let Some(name) = params
            .keys()
            .find(|n| SHARED_PARAMETERS.contains(&n.as_str()))
        {
            return Err(LaunchError::invalid(format!(
                "[overrides.{role}] sets '{name}', which is derived from [shared]; set it there instead"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterValue;
    use crate::types::Algorithm;

    fn resolve_with(shared: &SharedConfig, overrides: &Overrides) -> Result<ResolvedParameters> {
        let settings = ProcessSettings::default();
        ParameterResolver::new(&settings, overrides).resolve(shared)
    }

    #[test]
    fn stock_scenario_matches_expected_parameters() {
        let shared = SharedConfig {
            algorithm: Algorithm::Alternate,
            map_path: "/cfg/map.yaml".to_string(),
            make_map: false,
            marker_length: 0.1627,
            corner_measurement_sigma: 1.0,
            ..SharedConfig::default()
        };
        let out = resolve_with(&shared, &Overrides::new()).unwrap();

        assert_eq!(
            out.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["driver", "localizer", "mapper", "visualizer"]
        );

        for role in [roles::LOCALIZER, roles::MAPPER] {
            assert_eq!(
                out[role].get(names::SAM_NOT_CV),
                Some(&ParameterValue::Int(1)),
                "{role} must run the alternate backend"
            );
        }

        let mapper = &out[roles::MAPPER];
        let path = ParameterValue::Str("/cfg/map.yaml".into());
        assert_eq!(mapper.get(names::MAP_LOAD), Some(&path));
        assert_eq!(mapper.get(names::MAP_SAVE), Some(&path));
        assert_eq!(mapper.get(names::MAKE_NOT_USE_MAP), Some(&ParameterValue::Int(0)));
        assert!(!out[roles::DRIVER].contains(names::SAM_NOT_CV));
    }

    #[test]
    fn legacy_algorithm_maps_to_zero() {
        let shared = SharedConfig {
            algorithm: Algorithm::Legacy,
            make_map: true,
            ..SharedConfig::default()
        };
        let out = resolve_with(&shared, &Overrides::new()).unwrap();
        assert_eq!(
            out[roles::LOCALIZER].get(names::SAM_NOT_CV),
            Some(&ParameterValue::Int(0))
        );
        assert_eq!(
            out[roles::MAPPER].get(names::MAKE_NOT_USE_MAP),
            Some(&ParameterValue::Int(1))
        );
    }

    #[test]
    fn invalid_shared_config_yields_nothing() {
        let shared = SharedConfig {
            marker_length: -0.1,
            ..SharedConfig::default()
        };
        assert!(matches!(
            resolve_with(&shared, &Overrides::new()),
            Err(LaunchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn overrides_replace_or_extend_role_parameters() {
        let mut overrides = Overrides::new();
        overrides.entry("localizer".into()).or_default().extend([
            ("publish_image_marked".to_string(), ParameterValue::Int(0)),
            ("base_frame_id".to_string(), ParameterValue::Str("base_link".into())),
        ]);

        let out = resolve_with(&SharedConfig::default(), &overrides).unwrap();
        let loc = &out[roles::LOCALIZER];
        assert_eq!(loc.get("publish_image_marked"), Some(&ParameterValue::Int(0)));
        assert_eq!(loc.get("base_frame_id"), Some(&ParameterValue::Str("base_link".into())));
    }

    #[test]
    fn overriding_a_shared_parameter_is_rejected() {
        let mut overrides = Overrides::new();
        overrides
            .entry("mapper".into())
            .or_default()
            .insert(names::MARKER_LENGTH.into(), ParameterValue::Float(0.2));

        assert!(matches!(
            resolve_with(&SharedConfig::default(), &overrides),
            Err(LaunchError::InvalidConfiguration(msg)) if msg.contains("marker_length")
        ));
    }

    #[test]
    fn overrides_for_unknown_role_produce_a_set() {
        let mut overrides = Overrides::new();
        overrides
            .entry("recorder".into())
            .or_default()
            .insert("topics".into(), ParameterValue::Str("/tf".into()));

        let out = resolve_with(&SharedConfig::default(), &overrides).unwrap();
        assert!(out["recorder"].contains("topics"));
    }

    #[test]
    fn override_may_not_change_a_parameter_type() {
        let mut overrides = Overrides::new();
        overrides
            .entry("localizer".into())
            .or_default()
            .insert(names::PUBLISH_IMAGE_MARKED.into(), ParameterValue::Bool(true));

        assert!(matches!(
            resolve_with(&SharedConfig::default(), &overrides),
            Err(LaunchError::InvalidConfiguration(msg)) if msg.contains("publish_image_marked")
        ));
    }
}
