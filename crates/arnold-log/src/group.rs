use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One extraction group of a [`LogSummary`](crate::ir::LogSummary).
///
/// The name of each variant is the snake_case key of its field in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    RenderInfo,
    WorkerInfo,
    PluginInfo,
    ColourSpace,
    SceneInfo,
    SampleInfo,
    ProgressInfo,
    SceneCreation,
    RenderTime,
    RenderDuration,
    MemoryStats,
    RayStats,
    ShaderStats,
    GeometryStats,
    TextureStats,
    Diagnostics,
}

impl Group {
    /// Every group, in summary order.
    pub const ALL: [Group; 16] = [
        Group::RenderInfo,
        Group::WorkerInfo,
        Group::PluginInfo,
        Group::ColourSpace,
        Group::SceneInfo,
        Group::SampleInfo,
        Group::ProgressInfo,
        Group::SceneCreation,
        Group::RenderTime,
        Group::RenderDuration,
        Group::MemoryStats,
        Group::RayStats,
        Group::ShaderStats,
        Group::GeometryStats,
        Group::TextureStats,
        Group::Diagnostics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Group::RenderInfo => "render_info",
            Group::WorkerInfo => "worker_info",
            Group::PluginInfo => "plugin_info",
            Group::ColourSpace => "colour_space",
            Group::SceneInfo => "scene_info",
            Group::SampleInfo => "sample_info",
            Group::ProgressInfo => "progress_info",
            Group::SceneCreation => "scene_creation",
            Group::RenderTime => "render_time",
            Group::RenderDuration => "render_duration",
            Group::MemoryStats => "memory_stats",
            Group::RayStats => "ray_stats",
            Group::ShaderStats => "shader_stats",
            Group::GeometryStats => "geometry_stats",
            Group::TextureStats => "texture_stats",
            Group::Diagnostics => "diagnostics",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Group::ALL
            .into_iter()
            .find(|group| group.name() == wanted)
            .ok_or_else(|| Error::UnknownGroup(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for group in Group::ALL {
            assert_eq!(group.name().parse::<Group>(), Ok(group));
        }
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_dashes() {
        assert_eq!("Memory-Stats".parse::<Group>(), Ok(Group::MemoryStats));
    }

    #[test]
    fn test_unknown_group() {
        let err = "lighting".parse::<Group>().unwrap_err();
        assert_eq!(err, Error::UnknownGroup("lighting".into()));
        assert_eq!(err.to_string(), "unknown extraction group `lighting`");
    }
}
