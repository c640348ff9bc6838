use std::ops::Range;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use crate::convert::{
    bytes_to_megabytes, format_time, parse_or_default, time_to_seconds, to_gigabytes,
};
use crate::diagnostics;
use crate::group::Group;
use crate::ir::{
    ColourSpace, Diagnostic, GeometryStats, LogSummary, MemoryStats, PluginInfo, ProgressInfo,
    RayStats, RenderDuration, RenderInfo, RenderTime, SampleInfo, SceneCreation, SceneInfo,
    Severity, ShaderStats, TextureStats, WorkerInfo,
};
use crate::patterns::{
    self, ColourField, Field, GeometryField, MemoryField, MemorySummaryField, RayField, RenderField,
    RenderTimeField, SampleField, SceneCreationField, SceneField, ShaderField, TextureField,
    WorkerField,
};
use crate::plugins;

/// Extracts statistics from the text of one Arnold render log.
///
/// The parser owns the log text and splits it into lines once, at
/// construction. Every extraction method scans those lines independently and
/// returns a fresh record, so methods can be called in any order, any number
/// of times, with identical results.
///
/// No method fails. Fields that no line matched keep their documented
/// defaults, and tokens that match but do not parse as numbers fall back to
/// zero. When several lines match the same field, the last one wins, so the
/// final report of a multi-frame log takes precedence over earlier ones.
#[derive(Debug, Clone, Default)]
pub struct LogParser {
    text: String,
    lines: Vec<Range<usize>>,
}

impl From<&str> for LogParser {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for LogParser {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl LogParser {
    /// Creates a parser over the full text of a log.
    ///
    /// # Arguments
    ///
    /// * `text` - The whole log, already decoded. Lines may end in `\n` or `\r\n`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = line_ranges(&text);
        log::debug!("split render log into {} lines ({} bytes)", lines.len(), text.len());
        Self { text, lines }
    }

    /// The raw log text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines, counting a final line without a terminator.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The log's lines, in order, without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|range| &self.text[range.clone()])
    }

    /// Runs one group's pattern table over every line and hands each match to
    /// `assign`.
    ///
    /// `section` is the header of the report section the group lives in.
    /// Fields flagged [`Field::section_scoped`] only match between that header
    /// and the next blank message or other section header.
    fn scan<F: Field>(
        &self,
        table: &[(F, Regex)],
        section: Option<&Regex>,
        mut assign: impl FnMut(F, &Captures<'_>),
    ) {
        let mut in_section = false;
        let mut matches = 0usize;

        for line in self.lines() {
            if let Some(header) = section {
                if header.is_match(line) {
                    in_section = true;
                } else if patterns::SECTION_HEADER.is_match(line) || message(line).is_empty() {
                    in_section = false;
                }
            }

            for (field, pattern) in table {
                if field.section_scoped() && !in_section {
                    continue;
                }
                if !field.admits(line) {
                    continue;
                }
                if let Some(caps) = pattern.captures(line) {
                    matches += 1;
                    assign(*field, &caps);
                }
            }
        }

        log::trace!("{} pattern matches over {} lines", matches, self.lines.len());
    }

    /// Render metadata: frame, camera, resolution, scene file size, start
    /// date, render time, peak memory, AOV count, device and output file.
    pub fn render_info(&self) -> RenderInfo {
        let mut info = RenderInfo::default();
        self.scan(patterns::RENDER_INFO.as_slice(), None, |field, caps| {
            let value = capture(caps, 1);
            match field {
                RenderField::FrameNumber => info.frame_number = value.to_string(),
                RenderField::Camera => info.camera = value.to_string(),
                RenderField::Resolution => {
                    info.resolution = format!("{}x{}", value, capture(caps, 2));
                }
                RenderField::FileSize => info.file_size = bytes_to_megabytes(value),
                RenderField::DateTime => info.date_time = value.to_string(),
                RenderField::RenderTime => info.render_time = value.to_string(),
                RenderField::MemoryUsed => info.memory_used = value.to_string(),
                RenderField::AovCount => {
                    info.aov_count = match caps.get(2) {
                        Some(deep) => format!("{} ({} deep)", value, deep.as_str()),
                        None => value.to_string(),
                    };
                }
                RenderField::CpuGpu => info.cpu_gpu = value.to_string(),
                RenderField::OutputFile => info.output_file = value.to_string(),
            }
        });
        info
    }

    /// Hardware of the render worker plus host application and Arnold build.
    ///
    /// CPU, core count and RAM are only read from lines mentioning both
    /// `cores` and `logical`.
    pub fn worker_info(&self) -> WorkerInfo {
        let mut info = WorkerInfo::default();
        self.scan(patterns::WORKER_INFO.as_slice(), None, |field, caps| {
            let value = capture(caps, 1);
            match field {
                WorkerField::Cpu => info.cpu = value.to_string(),
                WorkerField::CoreCount => info.core_count = value.to_string(),
                WorkerField::WorkerRam => info.worker_ram = value.to_string(),
                WorkerField::HostApplication => {
                    info.host_application = value.to_string();
                    if let Some(version) = caps.get(2) {
                        info.host_version = version.as_str().to_string();
                    }
                }
                WorkerField::ArnoldVersion => info.arnold_version = value.to_string(),
            }
        });
        info
    }

    /// Plugin load blocks, keyed by the directory they were loaded from.
    ///
    /// Scanning stops at the first `[ass]` line: plugins are always loaded
    /// before the scene file is read.
    pub fn plugin_info(&self) -> PluginInfo {
        plugins::collect(self.lines())
    }

    /// Rendering colour space and the OCIO config it came from.
    pub fn colour_space(&self) -> ColourSpace {
        let mut info = ColourSpace::default();
        self.scan(patterns::COLOUR_SPACE.as_slice(), None, |field, caps| {
            let value = capture(caps, 1).to_string();
            match field {
                ColourField::ColourSpace => info.colour_space = value,
                ColourField::OcioConfig => info.ocio_config = value,
            }
        });
        info
    }

    /// Light, object and alembic counts plus node initialization time.
    pub fn scene_info(&self) -> SceneInfo {
        let mut info = SceneInfo::default();
        self.scan(patterns::SCENE_INFO.as_slice(), None, |field, caps| {
            let value = capture(caps, 1).to_string();
            match field {
                SceneField::Lights => info.no_of_lights = value,
                SceneField::Objects => info.no_of_objects = value,
                SceneField::Alembics => info.no_of_alembics = value,
                SceneField::NodeInitTime => info.node_init_time = value,
            }
        });
        info
    }

    /// AA samples and per-ray-type samples or depths.
    ///
    /// A `<disabled>` ray type leaves its field untouched.
    pub fn sample_info(&self) -> SampleInfo {
        let mut info = SampleInfo::default();
        self.scan(patterns::SAMPLE_INFO.as_slice(), None, |field, caps| {
            let Some(value) = caps.get(1).map(|m| m.as_str().to_string()) else {
                return;
            };
            match field {
                SampleField::Aa => info.aa = value,
                SampleField::Diffuse => info.diffuse = value,
                SampleField::Specular => info.specular = value,
                SampleField::Transmission => info.transmission = value,
                SampleField::Volume => info.volume = value,
                SampleField::Total => info.total = value,
                SampleField::Bssrdf => info.bssrdf = value,
                SampleField::Transparency => info.transparency = value,
            }
        });
        info
    }

    /// Rays per pixel at each reported completion percentage.
    pub fn progress_info(&self) -> ProgressInfo {
        let mut progress = ProgressInfo::default();
        for line in self.lines() {
            if let Some(caps) = patterns::PROGRESS.captures(line) {
                let percent = format!("{:0>3}", capture(&caps, 1));
                progress.record(percent, parse_or_default(capture(&caps, 2)));
            }
        }
        progress
    }

    /// Scene creation breakdown in seconds.
    pub fn scene_creation(&self) -> SceneCreation {
        let mut times = SceneCreation::default();
        self.scan(
            patterns::SCENE_CREATION.as_slice(),
            Some(&*patterns::SCENE_CREATION_HEADER),
            |field, caps| {
                let seconds = time_to_seconds(capture(caps, 1));
                match field {
                    SceneCreationField::SceneCreation => times.scene_creation = seconds,
                    SceneCreationField::PluginLoading => times.plugin_loading = seconds,
                    SceneCreationField::AssParsing => times.ass_parsing = seconds,
                    SceneCreationField::Unaccounted => times.unaccounted = seconds,
                }
            },
        );
        times
    }

    /// Frame time breakdown in seconds.
    pub fn render_time(&self) -> RenderTime {
        let mut times = RenderTime::default();
        self.scan(
            patterns::RENDER_TIME.as_slice(),
            Some(&*patterns::FRAME_TIME_HEADER),
            |field, caps| {
                let seconds = time_to_seconds(capture(caps, 1));
                let slot = match field {
                    RenderTimeField::FrameTime => &mut times.frame_time,
                    RenderTimeField::Rendering => &mut times.rendering,
                    RenderTimeField::PixelRendering => &mut times.pixel_rendering,
                    RenderTimeField::NodeInit => &mut times.node_init,
                    RenderTimeField::SanityChecks => &mut times.sanity_checks,
                    RenderTimeField::DriverInitClose => &mut times.driver_init_close,
                    RenderTimeField::Subdivision => &mut times.subdivision,
                    RenderTimeField::ThreadsBlocked => &mut times.threads_blocked,
                    RenderTimeField::MeshProcessing => &mut times.mesh_processing,
                    RenderTimeField::Displacement => &mut times.displacement,
                    RenderTimeField::AccelBuilding => &mut times.accel_building,
                    RenderTimeField::ImportanceMaps => &mut times.importance_maps,
                    RenderTimeField::OutputDriver => &mut times.output_driver,
                    RenderTimeField::LicenseCheckoutTime => &mut times.license_checkout_time,
                    RenderTimeField::Unaccounted => &mut times.unaccounted,
                };
                *slot = seconds;
            },
        );
        times
    }

    /// Total render time from the `render done in` line, with its display form.
    ///
    /// Both the clock form (`0:08.500`, `1:02:03.500`) and the
    /// `8.50 seconds` form of older builds are read. The last such line wins.
    pub fn render_duration(&self) -> RenderDuration {
        let mut seconds = 0.0;
        for line in self.lines() {
            if let Some(caps) = patterns::RENDER_DONE.captures(line) {
                seconds = match caps.get(1) {
                    Some(clock) => time_to_seconds(clock.as_str()),
                    None => parse_or_default(capture(&caps, 2)),
                };
            }
        }
        RenderDuration {
            seconds,
            display: format_time(seconds),
        }
    }

    /// Memory breakdown in megabytes.
    ///
    /// The `peak/texture/geometry memory used:` summaries of older builds are
    /// kept verbatim, unit included, in the optional summary fields.
    pub fn memory_stats(&self) -> MemoryStats {
        let mut stats = MemoryStats::default();
        self.scan(
            patterns::MEMORY_STATS.as_slice(),
            Some(&*patterns::MEMORY_HEADER),
            |field, caps| {
                let megabytes: f64 = parse_or_default(capture(caps, 1));
                let slot = match field {
                    MemoryField::PeakCpuMemoryUsed => &mut stats.peak_cpu_memory_used,
                    MemoryField::AtStartup => &mut stats.at_startup,
                    MemoryField::AovSamples => &mut stats.aov_samples,
                    MemoryField::OutputBuffers => &mut stats.output_buffers,
                    MemoryField::Framebuffers => &mut stats.framebuffers,
                    MemoryField::NodeOverhead => &mut stats.node_overhead,
                    MemoryField::MessagePassing => &mut stats.message_passing,
                    MemoryField::MemoryPools => &mut stats.memory_pools,
                    MemoryField::Geometry => &mut stats.geometry,
                    MemoryField::Polymesh => &mut stats.polymesh,
                    MemoryField::Vertices => &mut stats.vertices,
                    MemoryField::VertexIndices => &mut stats.vertex_indices,
                    MemoryField::PackedNormals => &mut stats.packed_normals,
                    MemoryField::NormalIndices => &mut stats.normal_indices,
                    MemoryField::UvCoords => &mut stats.uv_coords,
                    MemoryField::UvCoordsIdxs => &mut stats.uv_coords_idxs,
                    MemoryField::UniformIndices => &mut stats.uniform_indices,
                    MemoryField::Userdata => &mut stats.userdata,
                    MemoryField::Subdivs => &mut stats.subdivs,
                    MemoryField::AccelStructs => &mut stats.accel_structs,
                    MemoryField::SkydomeImportanceMap => &mut stats.skydome_importance_map,
                    MemoryField::Strings => &mut stats.strings,
                    MemoryField::TextureCache => &mut stats.texture_cache,
                    MemoryField::Profiler => &mut stats.profiler,
                    MemoryField::BacktraceHandler => &mut stats.backtrace_handler,
                    MemoryField::Unaccounted => &mut stats.unaccounted,
                };
                *slot = megabytes;
            },
        );
        self.scan(patterns::MEMORY_SUMMARY.as_slice(), None, |field, caps| {
            let value = Some(capture(caps, 1).to_string());
            match field {
                MemorySummaryField::Peak => stats.peak_memory = value,
                MemorySummaryField::Texture => stats.texture_memory = value,
                MemorySummaryField::Geometry => stats.geometry_memory = value,
            }
        });
        stats
    }

    /// Ray counts per ray type.
    pub fn ray_stats(&self) -> RayStats {
        let mut stats = RayStats::default();
        self.scan(patterns::RAY_STATS.as_slice(), None, |field, caps| {
            let count = parse_or_default(capture(caps, 1));
            match field {
                RayField::Camera => stats.camera = count,
                RayField::Shadow => stats.shadow = count,
                RayField::SpecularReflect => stats.specular_reflect = count,
                RayField::SpecularTransmit => stats.specular_transmit = count,
            }
        });
        stats
    }

    /// Shader call counts per shading context.
    pub fn shader_stats(&self) -> ShaderStats {
        let mut stats = ShaderStats::default();
        self.scan(patterns::SHADER_STATS.as_slice(), None, |field, caps| {
            let count = parse_or_default(capture(caps, 1));
            match field {
                ShaderField::Primary => stats.primary = count,
                ShaderField::TransparentShadow => stats.transparent_shadow = count,
                ShaderField::Background => stats.background = count,
                ShaderField::LightFilter => stats.light_filter = count,
                ShaderField::Importance => stats.importance = count,
            }
        });
        stats
    }

    /// Geometry counts: polymeshes, procedurals, triangles, subdivision
    /// surfaces, curves and polygons.
    pub fn geometry_stats(&self) -> GeometryStats {
        let mut stats = GeometryStats::default();
        self.scan(patterns::GEOMETRY_STATS.as_slice(), None, |field, caps| {
            let count = parse_or_default(capture(caps, 1));
            match field {
                GeometryField::Polymeshes => stats.polymesh_count = count,
                GeometryField::Procs => stats.proc_count = count,
                GeometryField::Triangles => stats.triangle_count = count,
                GeometryField::SubdivisionSurfaces => stats.subdivision_surfaces = count,
                GeometryField::Curves => stats.curve_count = count,
                GeometryField::Polygons => stats.polygon_count = count,
            }
        });
        stats
    }

    /// Texture cache statistics plus textures reported missing.
    ///
    /// The `texture count:` and `texture size:` lines of older builds fill
    /// the optional `texture_count` and `total_size` fields.
    pub fn texture_stats(&self) -> TextureStats {
        let mut stats = TextureStats::default();
        self.scan(patterns::TEXTURE_STATS.as_slice(), None, |field, caps| {
            let value = capture(caps, 1);
            match field {
                TextureField::PeakCacheMemory => {
                    stats.peak_cache_memory = to_gigabytes(value, capture(caps, 2));
                }
                TextureField::PixelDataRead => {
                    stats.pixel_data_read = to_gigabytes(value, capture(caps, 2));
                }
                TextureField::UniqueImages => stats.unique_images = parse_or_default(value),
                TextureField::DuplicateImages => stats.duplicate_images = parse_or_default(value),
                TextureField::ConstantValueImages => {
                    stats.constant_value_images = parse_or_default(value);
                }
                TextureField::BrokenInvalidImages => {
                    stats.broken_invalid_images = parse_or_default(value);
                }
                TextureField::TextureCount => stats.texture_count = Some(parse_or_default(value)),
                TextureField::TotalSize => stats.total_size = Some(value.to_string()),
            }
        });
        stats.missing_textures = self
            .lines()
            .filter_map(diagnostics::missing_texture)
            .map(str::to_string)
            .collect();
        stats
    }

    /// Warning and error lines, in log order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lines().filter_map(diagnostics::classify).collect()
    }

    /// Warning lines only, in log order.
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics_of(Severity::Warning)
    }

    /// Error lines only, in log order.
    pub fn errors(&self) -> Vec<Diagnostic> {
        self.diagnostics_of(Severity::Error)
    }

    fn diagnostics_of(&self, severity: Severity) -> Vec<Diagnostic> {
        self.lines()
            .filter_map(diagnostics::classify)
            .filter(|diagnostic| diagnostic.severity == severity)
            .collect()
    }

    /// Runs every extraction and bundles the results.
    pub fn summarize(&self) -> LogSummary {
        LogSummary {
            render_info: self.render_info(),
            worker_info: self.worker_info(),
            plugin_info: self.plugin_info(),
            colour_space: self.colour_space(),
            scene_info: self.scene_info(),
            sample_info: self.sample_info(),
            progress_info: self.progress_info(),
            scene_creation: self.scene_creation(),
            render_time: self.render_time(),
            render_duration: self.render_duration(),
            memory_stats: self.memory_stats(),
            ray_stats: self.ray_stats(),
            shader_stats: self.shader_stats(),
            geometry_stats: self.geometry_stats(),
            texture_stats: self.texture_stats(),
            diagnostics: self.diagnostics(),
        }
    }

    /// Runs a single extraction and returns it as JSON.
    ///
    /// # Arguments
    ///
    /// * `group` - Which extraction to run.
    ///
    /// # Returns
    ///
    /// The group's record serialized with the same field names as
    /// [`LogSummary`].
    pub fn extract(&self, group: Group) -> Value {
        match group {
            Group::RenderInfo => to_json(&self.render_info()),
            Group::WorkerInfo => to_json(&self.worker_info()),
            Group::PluginInfo => to_json(&self.plugin_info()),
            Group::ColourSpace => to_json(&self.colour_space()),
            Group::SceneInfo => to_json(&self.scene_info()),
            Group::SampleInfo => to_json(&self.sample_info()),
            Group::ProgressInfo => to_json(&self.progress_info()),
            Group::SceneCreation => to_json(&self.scene_creation()),
            Group::RenderTime => to_json(&self.render_time()),
            Group::RenderDuration => to_json(&self.render_duration()),
            Group::MemoryStats => to_json(&self.memory_stats()),
            Group::RayStats => to_json(&self.ray_stats()),
            Group::ShaderStats => to_json(&self.shader_stats()),
            Group::GeometryStats => to_json(&self.geometry_stats()),
            Group::TextureStats => to_json(&self.texture_stats()),
            Group::Diagnostics => to_json(&self.diagnostics()),
        }
    }
}

/// Text of a log line after the timestamp/memory prefix, i.e. after the first
/// `|`. Lines without a pipe are returned whole. Always trimmed.
pub(crate) fn message(line: &str) -> &str {
    line.split_once('|').map_or(line, |(_, rest)| rest).trim()
}

fn capture<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn to_json<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_else(|err| {
        log::warn!("failed to serialize extraction result: {}", err);
        Value::Null
    })
}

/// Byte ranges of each line, excluding `\n` / `\r\n` terminators.
fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for chunk in text.split_inclusive('\n') {
        let body = chunk.strip_suffix('\n').unwrap_or(chunk);
        let body = body.strip_suffix('\r').unwrap_or(body);
        ranges.push(start..start + body.len());
        start += chunk.len();
    }
    ranges
}
