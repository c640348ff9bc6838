use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder stored in text fields of the metadata groups when no line matched.
pub const NOT_FOUND: &str = "Can't parse details from log.";

fn not_found() -> String {
    NOT_FOUND.to_string()
}

/// General render metadata: frame, camera, output and headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInfo {
    pub frame_number: String,
    pub camera: String,
    /// `"WxH"`.
    pub resolution: String,
    /// Size of the scene file read, in decimal megabytes (`"12.35 MB"`).
    pub file_size: String,
    pub date_time: String,
    /// Raw `H:MM.SS` token of the `render done in` line.
    pub render_time: String,
    /// Peak memory with its unit suffix, e.g. `"3784.42MB"`.
    pub memory_used: String,
    /// `"N"` or `"N (M deep)"`.
    pub aov_count: String,
    pub cpu_gpu: String,
    pub output_file: String,
}

impl Default for RenderInfo {
    fn default() -> Self {
        Self {
            frame_number: not_found(),
            camera: not_found(),
            resolution: not_found(),
            file_size: not_found(),
            date_time: not_found(),
            render_time: not_found(),
            memory_used: not_found(),
            aov_count: not_found(),
            cpu_gpu: not_found(),
            output_file: not_found(),
        }
    }
}

/// Hardware and software of the machine that rendered the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub cpu: String,
    pub core_count: String,
    pub worker_ram: String,
    pub host_application: String,
    /// Trailing `Maya <version>` token of the host application line.
    pub host_version: String,
    pub arnold_version: String,
}

impl Default for WorkerInfo {
    fn default() -> Self {
        Self {
            cpu: not_found(),
            core_count: not_found(),
            worker_ram: not_found(),
            host_application: not_found(),
            host_version: not_found(),
            arnold_version: not_found(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColourSpace {
    pub colour_space: String,
    pub ocio_config: String,
}

impl Default for ColourSpace {
    fn default() -> Self {
        Self {
            colour_space: not_found(),
            ocio_config: not_found(),
        }
    }
}

/// Scene contents as reported at node initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneInfo {
    pub no_of_lights: String,
    pub no_of_objects: String,
    pub no_of_alembics: String,
    pub node_init_time: String,
}

/// Sample counts and ray depths. Empty strings mean the setting was not logged
/// or was disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub aa: String,
    pub diffuse: String,
    pub specular: String,
    pub transmission: String,
    pub volume: String,
    pub total: String,
    pub bssrdf: String,
    pub transparency: String,
}

/// Rays per pixel reached at each completion percentage.
///
/// Keys are the percentage zero-padded to three digits so that lexical order
/// matches numeric order (`"005"`, `"010"`, ..., `"100"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressInfo(pub BTreeMap<String, u64>);

impl ProgressInfo {
    /// Rays per pixel at `percent`, given as its three-digit key.
    pub fn get(&self, percent: &str) -> Option<u64> {
        self.0.get(percent).copied()
    }

    /// Number of percentages reported.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no progress line was found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(percent, rays_per_pixel)` pairs in ascending percentage order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(percent, rays)| (percent.as_str(), *rays))
    }

    pub(crate) fn record(&mut self, percent: String, rays_per_pixel: u64) {
        self.0.insert(percent, rays_per_pixel);
    }
}

/// Scene creation breakdown, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneCreation {
    pub scene_creation: f64,
    pub plugin_loading: f64,
    pub ass_parsing: f64,
    pub unaccounted: f64,
}

/// Frame time breakdown, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderTime {
    pub frame_time: f64,
    pub rendering: f64,
    pub pixel_rendering: f64,
    pub node_init: f64,
    pub sanity_checks: f64,
    pub driver_init_close: f64,
    pub subdivision: f64,
    pub threads_blocked: f64,
    pub mesh_processing: f64,
    pub displacement: f64,
    pub accel_building: f64,
    pub importance_maps: f64,
    pub output_driver: f64,
    pub license_checkout_time: f64,
    pub unaccounted: f64,
}

/// Memory breakdown from the end-of-render report, in megabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    #[serde(rename = "peak_CPU_memory_used")]
    pub peak_cpu_memory_used: f64,
    pub at_startup: f64,
    #[serde(rename = "AOV_samples")]
    pub aov_samples: f64,
    pub output_buffers: f64,
    pub framebuffers: f64,
    pub node_overhead: f64,
    pub message_passing: f64,
    pub memory_pools: f64,
    pub geometry: f64,
    pub polymesh: f64,
    pub vertices: f64,
    pub vertex_indices: f64,
    pub packed_normals: f64,
    pub normal_indices: f64,
    pub uv_coords: f64,
    pub uv_coords_idxs: f64,
    pub uniform_indices: f64,
    pub userdata: f64,
    pub subdivs: f64,
    pub accel_structs: f64,
    pub skydome_importance_map: f64,
    pub strings: f64,
    pub texture_cache: f64,
    pub profiler: f64,
    pub backtrace_handler: f64,
    pub unaccounted: f64,
    /// `peak memory used:` summary of older builds, e.g. `"3.2 GB"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_memory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayStats {
    pub camera: u64,
    pub shadow: u64,
    pub specular_reflect: u64,
    pub specular_transmit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderStats {
    pub primary: u64,
    pub transparent_shadow: u64,
    pub background: u64,
    pub light_filter: u64,
    pub importance: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryStats {
    pub polymesh_count: u64,
    pub proc_count: u64,
    pub triangle_count: u64,
    pub subdivision_surfaces: u64,
    pub curve_count: u64,
    pub polygon_count: u64,
}

/// OpenImageIO texture cache statistics. Sizes are in gigabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureStats {
    pub peak_cache_memory: f64,
    pub pixel_data_read: f64,
    pub unique_images: u64,
    pub duplicate_images: u64,
    pub constant_value_images: u64,
    pub broken_invalid_images: u64,
    /// Texture names from `not found` warnings, in log order.
    pub missing_textures: Vec<String>,
    /// From a `texture ... count: N` line (older builds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_count: Option<u64>,
    /// From a `texture size: X GB` line (older builds), unit included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<String>,
}

/// Plugins loaded from one search path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginLoadBlock {
    pub path: String,
    /// `uses Arnold` lines, in log order.
    pub descriptions: Vec<String>,
    /// The closing `loaded N plugins ...` line.
    pub summary: Option<String>,
    pub plugin_count: Option<u64>,
}

impl PluginLoadBlock {
    /// An empty block for plugins loaded from `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Node names from `<library>: <name> uses Arnold <version>` descriptions.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.descriptions
            .iter()
            .filter_map(|line| {
                let (head, _) = line.split_once(" uses Arnold")?;
                let name = head.rsplit_once(": ").map_or(head, |(_, name)| name);
                let name = name.trim();
                (!name.is_empty()).then_some(name)
            })
            .collect()
    }
}

/// Plugin load blocks in the order their path was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginInfo {
    pub blocks: Vec<PluginLoadBlock>,
}

impl PluginInfo {
    /// The block loaded from `path`, if any.
    pub fn get(&self, path: &str) -> Option<&PluginLoadBlock> {
        self.blocks.iter().find(|block| block.path == path)
    }

    /// Search paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|block| block.path.as_str())
    }

    /// Number of distinct search paths.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no plugin block was completed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Sum of the `loaded N plugins` counts over all blocks.
    pub fn total_plugins(&self) -> u64 {
        self.blocks.iter().filter_map(|block| block.plugin_count).sum()
    }

    /// Stores `block`, replacing an earlier block with the same path in place.
    pub(crate) fn insert(&mut self, block: PluginLoadBlock) {
        match self.blocks.iter_mut().find(|existing| existing.path == block.path) {
            Some(existing) => *existing = block,
            None => self.blocks.push(block),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        })
    }
}

/// Coarse subject of a diagnostic, inferred from keywords in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Texture,
    Geometry,
    Shader,
    License,
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticCategory::Texture => "texture",
            DiagnosticCategory::Geometry => "geometry",
            DiagnosticCategory::Shader => "shader",
            DiagnosticCategory::License => "license",
            DiagnosticCategory::General => "general",
        })
    }
}

/// A warning or error line, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub category: DiagnosticCategory,
}

/// Total render time from the `render done in` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDuration {
    pub seconds: f64,
    /// Human-readable form, see [`format_time`](crate::convert::format_time).
    pub display: String,
}

/// Every extraction group of one log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub render_info: RenderInfo,
    pub worker_info: WorkerInfo,
    pub plugin_info: PluginInfo,
    pub colour_space: ColourSpace,
    pub scene_info: SceneInfo,
    pub sample_info: SampleInfo,
    pub progress_info: ProgressInfo,
    pub scene_creation: SceneCreation,
    pub render_time: RenderTime,
    pub render_duration: RenderDuration,
    pub memory_stats: MemoryStats,
    pub ray_stats: RayStats,
    pub shader_stats: ShaderStats,
    pub geometry_stats: GeometryStats,
    pub texture_stats: TextureStats,
    pub diagnostics: Vec<Diagnostic>,
}
