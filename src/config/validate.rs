// src/config/validate.rs

use crate::config::model::{
    DriverSettings, LaunchConfig, MapperSettings, ProcessSettings, RawLaunchConfig,
    SupervisorOptions, SupervisorSection, VisualizerSettings,
};
use crate::errors::{LaunchError, Result};
use crate::params::shared::ensure_positive_finite;
use crate::plan::Catalogue;
use crate::types::parse_duration;

impl TryFrom<RawLaunchConfig> for LaunchConfig {
    type Error = LaunchError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        raw.shared.validate()?;
        validate_visualizer(&raw.visualizer)?;
        validate_driver(&raw.driver)?;
        validate_mapper(&raw.mapper)?;
        if !raw.localizer.map_init_pose_z.is_finite() {
            return Err(LaunchError::invalid(
                "localizer.map_init_pose_z must be a finite number",
            ));
        }
        let supervisor = parse_supervisor(&raw.supervisor)?;

        let mut catalogue = Catalogue::fiducial_vlam();
        for (role, ov) in raw.process.iter() {
            catalogue.apply_override(role, ov)?;
        }

        Ok(LaunchConfig {
            shared: raw.shared,
            settings: ProcessSettings {
                visualizer: raw.visualizer,
                driver: raw.driver,
                localizer: raw.localizer,
                mapper: raw.mapper,
            },
            overrides: raw.overrides,
            catalogue,
            supervisor,
        })
    }
}

fn validate_visualizer(v: &VisualizerSettings) -> Result<()> {
    if v.rviz_config.trim().is_empty() {
        return Err(LaunchError::invalid("visualizer.rviz_config must be non-empty"));
    }
    Ok(())
}

fn validate_driver(d: &DriverSettings) -> Result<()> {
    if d.drone_ip.trim().is_empty() {
        return Err(LaunchError::invalid("driver.drone_ip must be non-empty"));
    }
    let ports = [
        ("drone_port", d.drone_port),
        ("command_port", d.command_port),
        ("data_port", d.data_port),
        ("video_port", d.video_port),
    ];
    for (name, port) in ports {
        if port == 0 {
            return Err(LaunchError::invalid(format!(
                "driver.{name} must be in 1..=65535 (got 0)"
            )));
        }
    }
    Ok(())
}

fn validate_mapper(m: &MapperSettings) -> Result<()> {
    if let Some(hz) = m.marker_map_publish_frequency_hz {
        ensure_positive_finite("mapper.marker_map_publish_frequency_hz", hz)?;
    }
    if let Some(style) = m.map_init_style {
        if !(0..=2).contains(&style) {
            return Err(LaunchError::invalid(format!(
                "mapper.map_init_style must be 0, 1 or 2 (got {style})"
            )));
        }
    }
    Ok(())
}

fn parse_supervisor(s: &SupervisorSection) -> Result<SupervisorOptions> {
    let grace_period = parse_duration(&s.grace_period)
        .map_err(|e| LaunchError::invalid(format!("supervisor.grace_period: {e}")))?;
    if grace_period.is_zero() {
        return Err(LaunchError::invalid(
            "supervisor.grace_period must be greater than zero",
        ));
    }
    let startup_window = parse_duration(&s.startup_window)
        .map_err(|e| LaunchError::invalid(format!("supervisor.startup_window: {e}")))?;

    Ok(SupervisorOptions {
        grace_period,
        startup_window,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = LaunchConfig::try_from(RawLaunchConfig::default()).unwrap();
        assert_eq!(cfg.supervisor.grace_period, Duration::from_secs(5));
        assert_eq!(cfg.supervisor.startup_window, Duration::from_millis(100));
        assert_eq!(cfg.catalogue, Catalogue::fiducial_vlam());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut raw = RawLaunchConfig::default();
        raw.driver.video_port = 0;
        assert!(matches!(
            LaunchConfig::try_from(raw),
            Err(LaunchError::InvalidConfiguration(msg)) if msg.contains("video_port")
        ));
    }

    #[test]
    fn zero_grace_period_is_rejected() {
        let mut raw = RawLaunchConfig::default();
        raw.supervisor.grace_period = "0s".into();
        assert!(LaunchConfig::try_from(raw).is_err());
    }

    #[test]
    fn out_of_range_map_init_style_is_rejected() {
        let mut raw = RawLaunchConfig::default();
        raw.mapper.map_init_style = Some(3);
        assert!(LaunchConfig::try_from(raw).is_err());
    }
}
