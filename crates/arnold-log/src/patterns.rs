//! Precompiled pattern tables, one per extraction group.
//!
//! Each table is an ordered list of `(field, regex)` pairs. A group scan runs
//! every pair of its table against every line and dispatches on the field of
//! the pattern that matched. Tables are compiled once on first use and shared
//! by all parsers.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) type PatternTable<F> = Vec<(F, Regex)>;

/// Per-field matching rules consulted by the group scan.
pub(crate) trait Field: Copy {
    /// Cheap substring gate run before the regex.
    fn admits(self, _line: &str) -> bool {
        true
    }

    /// Fields that only match inside their group's report section.
    fn section_scoped(self) -> bool {
        false
    }
}

fn compile<F: Copy>(entries: &[(F, &str)]) -> PatternTable<F> {
    entries
        .iter()
        .map(|&(field, source)| (field, Regex::new(source).unwrap()))
        .collect()
}

/// `<label>  <H:MM.SS>` row of a timing breakdown.
macro_rules! timed_row {
    ($label:literal) => {
        concat!(
            r"(?:^|\|)\s*",
            $label,
            r"\s+(\d+:\d+(?::\d+)?(?:\.\d+)?)"
        )
    };
}

/// `<label>  <float>MB` row of the memory report.
macro_rules! memory_row {
    ($label:literal) => {
        concat!(r"(?:^|\|)\s*", $label, r"\s+(\d+(?:\.\d+)?)\s*MB")
    };
}

/// `<label>  <integer> (...)` row of a statistics table. The count must be
/// followed by whitespace or the end of the line so that memory rows such as
/// `polymesh 36.00MB` are not taken as counts.
macro_rules! count_row {
    ($label:literal) => {
        concat!(r"(?:^|\|)\s*", $label, r"\s+(\d+)(?:\s|$)")
    };
}

// --- section headers ---

pub(crate) static SCENE_CREATION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\|)\s*scene creation time\b").unwrap());

pub(crate) static FRAME_TIME_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\|)\s*frame time\b").unwrap());

pub(crate) static MEMORY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\|)\s*peak CPU memory used\b").unwrap());

/// Any header that starts a report section.
pub(crate) static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\|)\s*(?:scene creation time|frame time|peak CPU memory used)\b").unwrap()
});

// --- render info ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderField {
    FrameNumber,
    Camera,
    Resolution,
    FileSize,
    DateTime,
    RenderTime,
    MemoryUsed,
    AovCount,
    CpuGpu,
    OutputFile,
}

impl Field for RenderField {}

pub(crate) static RENDER_INFO: Lazy<PatternTable<RenderField>> = Lazy::new(|| {
    compile(&[
        (RenderField::FrameNumber, r"rendering frame\(s\): (\d+)"),
        (RenderField::Camera, r#"camera\s+"([^"]+)""#),
        (
            RenderField::Resolution,
            r"rendering\s+image\s+at\s+(\d+)\s+x\s+(\d+)",
        ),
        (RenderField::FileSize, r"read (\d+) bytes"),
        (RenderField::DateTime, r"log started (.+ \d{4})"),
        (
            RenderField::RenderTime,
            r"render done in (\d+:\d+(?::\d+)?\.\d+)",
        ),
        (RenderField::MemoryUsed, r"peak CPU memory used\s+([\d.]+MB)"),
        (
            RenderField::AovCount,
            r"preparing\s+(\d+)\s+AOVs?(?:.*\((\d+)\s+deep\s+AOVs?\))?",
        ),
        (RenderField::CpuGpu, r"using\s+(CPU|GPU)"),
        (RenderField::OutputFile, r"writing file `([^`]+)'"),
    ])
});

/// Total render time, either as a clock token (`0:08.500`, `1:02:03.500`) or
/// in the `8.50 seconds` form of older builds.
pub(crate) static RENDER_DONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)render done in (?:(\d+:\d+(?::\d+)?\.\d+)|(\d+(?:\.\d+)?) seconds)").unwrap()
});

// --- worker info ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerField {
    Cpu,
    CoreCount,
    WorkerRam,
    HostApplication,
    ArnoldVersion,
}

impl Field for WorkerField {
    fn admits(self, line: &str) -> bool {
        match self {
            WorkerField::Cpu | WorkerField::CoreCount | WorkerField::WorkerRam => {
                line.contains("cores") && line.contains("logical")
            }
            WorkerField::HostApplication | WorkerField::ArnoldVersion => true,
        }
    }
}

pub(crate) static WORKER_INFO: Lazy<PatternTable<WorkerField>> = Lazy::new(|| {
    compile(&[
        (WorkerField::Cpu, r"(?:^|\|)\s*\d+\s+x\s+(.*?)\s+\("),
        (WorkerField::CoreCount, r"\(([^()]+cores[^()]+)\)"),
        (WorkerField::WorkerRam, r"with\s+(\d+MB)"),
        (
            WorkerField::HostApplication,
            r"host application:\s*(.*?)(?:\s+Maya\s+([\d.]+))?$",
        ),
        (WorkerField::ArnoldVersion, r"(Arnold\s+\d+\.\d+\.\d+\.\d+)"),
    ])
});

// --- colour space ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColourField {
    ColourSpace,
    OcioConfig,
}

impl Field for ColourField {}

pub(crate) static COLOUR_SPACE: Lazy<PatternTable<ColourField>> = Lazy::new(|| {
    compile(&[
        (
            ColourField::ColourSpace,
            r#"rendering color space is\s+"([^"]+)""#,
        ),
        (
            ColourField::OcioConfig,
            r"from the OCIO environment variable (\S+)",
        ),
    ])
});

// --- scene info ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SceneField {
    Lights,
    Objects,
    Alembics,
    NodeInitTime,
}

impl Field for SceneField {}

pub(crate) static SCENE_INFO: Lazy<PatternTable<SceneField>> = Lazy::new(|| {
    compile(&[
        (SceneField::Lights, r"there are (\d+) lights?"),
        (SceneField::Objects, r"and (\d+) objects"),
        (SceneField::Alembics, r"\|\s+(\d+)\s+alembic"),
        (SceneField::NodeInitTime, r"node init\s+([\d:.]+)"),
    ])
});

// --- sample info ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SampleField {
    Aa,
    Diffuse,
    Specular,
    Transmission,
    Volume,
    Total,
    Bssrdf,
    Transparency,
}

impl Field for SampleField {}

pub(crate) static SAMPLE_INFO: Lazy<PatternTable<SampleField>> = Lazy::new(|| {
    compile(&[
        (SampleField::Aa, r",\s*(\d+)\s+AA samples"),
        (
            SampleField::Diffuse,
            r"diffuse\s+(?:samples\s+(\d+)\s+/ depth\s+(\d+)|<disabled(?: by depth)?>)",
        ),
        (
            SampleField::Specular,
            r"specular\s+(?:samples\s+(\d+)\s+/ depth\s+(\d+)|<disabled(?: by depth)?>)",
        ),
        (
            SampleField::Transmission,
            r"transmission\s+(?:samples\s+(\d+)\s+/ depth\s+(\d+)|<disabled(?: by depth)?>)",
        ),
        (
            SampleField::Volume,
            r"volume indirect\s+(?:samples\s+(\d+)\s+/ depth\s+(\d+)|<disabled(?: by depth)?>)",
        ),
        (SampleField::Total, r"total\s+depth\s+(\d+)"),
        (SampleField::Bssrdf, r"bssrdf\s+<([^>]+)>"),
        (SampleField::Transparency, r"transparency\s+depth\s+(\d+)"),
    ])
});

// --- progress ---

pub(crate) static PROGRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)% done - (\d+) rays/pixel").unwrap());

// --- scene creation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SceneCreationField {
    SceneCreation,
    PluginLoading,
    AssParsing,
    Unaccounted,
}

impl Field for SceneCreationField {
    fn section_scoped(self) -> bool {
        self == SceneCreationField::Unaccounted
    }
}

pub(crate) static SCENE_CREATION: Lazy<PatternTable<SceneCreationField>> = Lazy::new(|| {
    compile(&[
        (
            SceneCreationField::SceneCreation,
            timed_row!("scene creation time"),
        ),
        (SceneCreationField::PluginLoading, timed_row!("plugin loading")),
        (SceneCreationField::AssParsing, timed_row!("ass parsing")),
        (SceneCreationField::Unaccounted, timed_row!("unaccounted")),
    ])
});

// --- render time ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderTimeField {
    FrameTime,
    Rendering,
    PixelRendering,
    NodeInit,
    SanityChecks,
    DriverInitClose,
    Subdivision,
    ThreadsBlocked,
    MeshProcessing,
    Displacement,
    AccelBuilding,
    ImportanceMaps,
    OutputDriver,
    LicenseCheckoutTime,
    Unaccounted,
}

impl Field for RenderTimeField {
    fn section_scoped(self) -> bool {
        self == RenderTimeField::Unaccounted
    }
}

pub(crate) static RENDER_TIME: Lazy<PatternTable<RenderTimeField>> = Lazy::new(|| {
    compile(&[
        (RenderTimeField::FrameTime, timed_row!("frame time")),
        (RenderTimeField::Rendering, timed_row!("rendering")),
        (RenderTimeField::PixelRendering, timed_row!("pixel rendering")),
        (RenderTimeField::NodeInit, timed_row!("node init")),
        (RenderTimeField::SanityChecks, timed_row!("sanity checks")),
        (
            RenderTimeField::DriverInitClose,
            timed_row!("driver init/close"),
        ),
        (RenderTimeField::Subdivision, timed_row!("subdivision")),
        (RenderTimeField::ThreadsBlocked, timed_row!("threads blocked")),
        (RenderTimeField::MeshProcessing, timed_row!("mesh processing")),
        (RenderTimeField::Displacement, timed_row!("displacement")),
        (RenderTimeField::AccelBuilding, timed_row!(r"accel\.? building")),
        (RenderTimeField::ImportanceMaps, timed_row!("importance maps")),
        (RenderTimeField::OutputDriver, timed_row!("output driver")),
        (
            RenderTimeField::LicenseCheckoutTime,
            timed_row!("license checkout(?: time)?"),
        ),
        (RenderTimeField::Unaccounted, timed_row!("unaccounted")),
    ])
});

// --- memory ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemoryField {
    PeakCpuMemoryUsed,
    AtStartup,
    AovSamples,
    OutputBuffers,
    Framebuffers,
    NodeOverhead,
    MessagePassing,
    MemoryPools,
    Geometry,
    Polymesh,
    Vertices,
    VertexIndices,
    PackedNormals,
    NormalIndices,
    UvCoords,
    UvCoordsIdxs,
    UniformIndices,
    Userdata,
    Subdivs,
    AccelStructs,
    SkydomeImportanceMap,
    Strings,
    TextureCache,
    Profiler,
    BacktraceHandler,
    Unaccounted,
}

impl Field for MemoryField {
    fn section_scoped(self) -> bool {
        self == MemoryField::Unaccounted
    }
}

pub(crate) static MEMORY_STATS: Lazy<PatternTable<MemoryField>> = Lazy::new(|| {
    compile(&[
        (
            MemoryField::PeakCpuMemoryUsed,
            memory_row!("peak CPU memory used"),
        ),
        (MemoryField::AtStartup, memory_row!("at startup")),
        (MemoryField::AovSamples, memory_row!("AOV samples")),
        (MemoryField::OutputBuffers, memory_row!("output buffers")),
        (MemoryField::Framebuffers, memory_row!("framebuffers")),
        (MemoryField::NodeOverhead, memory_row!("node overhead")),
        (MemoryField::MessagePassing, memory_row!("message passing")),
        (MemoryField::MemoryPools, memory_row!("memory pools")),
        (MemoryField::Geometry, memory_row!("geometry")),
        (MemoryField::Polymesh, memory_row!("polymesh")),
        (MemoryField::Vertices, memory_row!("vertices")),
        (MemoryField::VertexIndices, memory_row!("vertex indices")),
        (MemoryField::PackedNormals, memory_row!("packed normals")),
        (MemoryField::NormalIndices, memory_row!("normal indices")),
        (MemoryField::UvCoords, memory_row!("uv coords")),
        (MemoryField::UvCoordsIdxs, memory_row!("uv coords idxs")),
        (MemoryField::UniformIndices, memory_row!("uniform indices")),
        (MemoryField::Userdata, memory_row!("userdata")),
        (MemoryField::Subdivs, memory_row!("subdivs")),
        (MemoryField::AccelStructs, memory_row!(r"accel\.? structs")),
        (
            MemoryField::SkydomeImportanceMap,
            memory_row!("skydome importance map"),
        ),
        (MemoryField::Strings, memory_row!("strings")),
        (MemoryField::TextureCache, memory_row!("texture cache")),
        (MemoryField::Profiler, memory_row!("profiler")),
        (MemoryField::BacktraceHandler, memory_row!("backtrace handler")),
        (MemoryField::Unaccounted, memory_row!("unaccounted")),
    ])
});

/// One-line memory summaries written by older Arnold builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemorySummaryField {
    Peak,
    Texture,
    Geometry,
}

impl Field for MemorySummaryField {}

pub(crate) static MEMORY_SUMMARY: Lazy<PatternTable<MemorySummaryField>> = Lazy::new(|| {
    compile(&[
        (
            MemorySummaryField::Peak,
            r"(?i)peak memory used:\s+(\d+(?:\.\d+)?\s*[GMK]B)",
        ),
        (
            MemorySummaryField::Texture,
            r"(?i)texture memory used:\s+(\d+(?:\.\d+)?\s*[GMK]B)",
        ),
        (
            MemorySummaryField::Geometry,
            r"(?i)geometry memory used:\s+(\d+(?:\.\d+)?\s*[GMK]B)",
        ),
    ])
});

// --- ray / shader / geometry tables ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RayField {
    Camera,
    Shadow,
    SpecularReflect,
    SpecularTransmit,
}

impl Field for RayField {}

pub(crate) static RAY_STATS: Lazy<PatternTable<RayField>> = Lazy::new(|| {
    compile(&[
        (RayField::Camera, count_row!("camera")),
        (RayField::Shadow, count_row!("shadow")),
        (RayField::SpecularReflect, count_row!("specular_reflect")),
        (RayField::SpecularTransmit, count_row!("specular_transmit")),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShaderField {
    Primary,
    TransparentShadow,
    Background,
    LightFilter,
    Importance,
}

impl Field for ShaderField {}

pub(crate) static SHADER_STATS: Lazy<PatternTable<ShaderField>> = Lazy::new(|| {
    compile(&[
        (ShaderField::Primary, count_row!("primary")),
        (ShaderField::TransparentShadow, count_row!("transparent_shadow")),
        (ShaderField::Background, count_row!("background")),
        (ShaderField::LightFilter, count_row!("light_filter")),
        (ShaderField::Importance, count_row!("importance")),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GeometryField {
    Polymeshes,
    Procs,
    Triangles,
    SubdivisionSurfaces,
    Curves,
    Polygons,
}

impl Field for GeometryField {}

pub(crate) static GEOMETRY_STATS: Lazy<PatternTable<GeometryField>> = Lazy::new(|| {
    compile(&[
        (GeometryField::Polymeshes, count_row!("polymesh(?:es)?")),
        (GeometryField::Procs, count_row!("procs?")),
        (GeometryField::Triangles, count_row!("triangles")),
        (
            GeometryField::SubdivisionSurfaces,
            count_row!("subdivision surfaces"),
        ),
        (GeometryField::Curves, count_row!("curves")),
        (GeometryField::Polygons, count_row!("polygons")),
    ])
});

// --- textures ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureField {
    PeakCacheMemory,
    PixelDataRead,
    UniqueImages,
    DuplicateImages,
    ConstantValueImages,
    BrokenInvalidImages,
    TextureCount,
    TotalSize,
}

impl Field for TextureField {
    fn admits(self, line: &str) -> bool {
        let counted = contains_ignore_case(line, "texture") && contains_ignore_case(line, "count:");
        match self {
            TextureField::TextureCount => counted,
            TextureField::TotalSize => !counted && contains_ignore_case(line, "texture size"),
            _ => true,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

pub(crate) static TEXTURE_STATS: Lazy<PatternTable<TextureField>> = Lazy::new(|| {
    compile(&[
        (
            TextureField::PeakCacheMemory,
            r"Peak cache memory\s*:\s*(\d+(?:\.\d+)?)\s*([KMG]B)",
        ),
        (
            TextureField::PixelDataRead,
            r"Pixel data read\s*:\s*(\d+(?:\.\d+)?)\s*([KMG]B)",
        ),
        (TextureField::UniqueImages, r"Images\s*:\s*(\d+)\s+unique"),
        (
            TextureField::DuplicateImages,
            r"(\d+)\s+(?:was|were)\s+(?:an\s+)?exact\s+duplicates?",
        ),
        (
            TextureField::ConstantValueImages,
            r"(\d+)\s+(?:was|were)\s+constant-valued",
        ),
        (
            TextureField::BrokenInvalidImages,
            r"Broken or invalid files\s*:\s*(\d+)",
        ),
        (TextureField::TextureCount, r"count:\s*(\d+)"),
        (
            TextureField::TotalSize,
            r"size:\s*(\d+(?:\.\d+)?\s*[GMK]B)",
        ),
    ])
});

/// Quoted texture name in a `not found` warning.
pub(crate) static MISSING_TEXTURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)texture\s+"([^"]+)""#).unwrap());

// --- plugins ---

pub(crate) static LOADED_PLUGINS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"loaded\s+(\d+)\s+plugins").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_compile() {
        assert_eq!(RENDER_INFO.len(), 10);
        assert_eq!(WORKER_INFO.len(), 5);
        assert_eq!(COLOUR_SPACE.len(), 2);
        assert_eq!(SCENE_INFO.len(), 4);
        assert_eq!(SAMPLE_INFO.len(), 8);
        assert_eq!(SCENE_CREATION.len(), 4);
        assert_eq!(RENDER_TIME.len(), 15);
        assert_eq!(MEMORY_STATS.len(), 26);
        assert_eq!(RAY_STATS.len(), 4);
        assert_eq!(SHADER_STATS.len(), 5);
        assert_eq!(GEOMETRY_STATS.len(), 6);
        assert_eq!(MEMORY_SUMMARY.len(), 3);
        assert_eq!(TEXTURE_STATS.len(), 8);
        Lazy::force(&PROGRESS);
        Lazy::force(&RENDER_DONE);
        Lazy::force(&SECTION_HEADER);
        Lazy::force(&SCENE_CREATION_HEADER);
        Lazy::force(&FRAME_TIME_HEADER);
        Lazy::force(&MEMORY_HEADER);
        Lazy::force(&MISSING_TEXTURE);
        Lazy::force(&LOADED_PLUGINS);
    }

    #[test]
    fn test_count_row_rejects_memory_rows() {
        let (_, polymeshes) = GEOMETRY_STATS
            .iter()
            .find(|(field, _)| *field == GeometryField::Polymeshes)
            .unwrap();
        assert!(!polymeshes.is_match("|   polymesh                 36.00MB"));
        assert!(polymeshes.is_match("|  polymeshes                    115 (  100.00)"));
    }

    #[test]
    fn test_memory_row_does_not_confuse_prefixes() {
        let (_, uv_coords) = MEMORY_STATS
            .iter()
            .find(|(field, _)| *field == MemoryField::UvCoords)
            .unwrap();
        let caps = uv_coords.captures("|    uv coords idxs           3.00MB");
        assert!(caps.is_none());
        let caps = uv_coords.captures("|    uv coords                4.00MB").unwrap();
        assert_eq!(&caps[1], "4.00");
    }

    #[test]
    fn test_worker_prefilter() {
        assert!(WorkerField::Cpu.admits("1 x Xeon (16 cores, 32 logical) with 65536MB"));
        assert!(!WorkerField::Cpu.admits("1 x Xeon (16 cores) with 65536MB"));
        assert!(WorkerField::ArnoldVersion.admits("anything"));
    }

    #[test]
    fn test_texture_summary_prefilter() {
        assert!(TextureField::TextureCount.admits("| Texture count: 12"));
        assert!(!TextureField::TextureCount.admits("| Texture size: 1.5 GB"));
        assert!(TextureField::TotalSize.admits("| Texture size: 1.5 GB"));
        assert!(!TextureField::TotalSize.admits("| texture size count: 3"));
        assert!(!TextureField::TotalSize.admits("| cache size: 1.5 GB"));
    }

    #[test]
    fn test_render_done_forms() {
        let caps = RENDER_DONE.captures("| render done in 1:02:03.500").unwrap();
        assert_eq!(&caps[1], "1:02:03.500");
        let caps = RENDER_DONE.captures("| Render done in 8.50 seconds").unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(&caps[2], "8.50");
        assert!(RENDER_DONE.captures("| render done").is_none());
    }
}
