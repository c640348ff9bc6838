use crate::convert::parse_or_default;
use crate::ir::{PluginInfo, PluginLoadBlock};
use crate::parser::message;
use crate::patterns::LOADED_PLUGINS;

/// Start of the scene-description segment. Plugins are never loaded after it.
pub(crate) const ASS_SECTION_MARKER: &str = "[ass]";

const LOADING_MARKER: &str = "loading plugins from";
const USES_MARKER: &str = "uses Arnold";

/// Collects plugin load blocks.
///
/// A block opens on `loading plugins from <path>`, gathers every following
/// `uses Arnold` line and closes on the `loaded N plugins` summary. A block
/// that is never closed is dropped, unless a new block opens while it holds
/// descriptions.
pub(crate) fn collect<'a>(lines: impl IntoIterator<Item = &'a str>) -> PluginInfo {
    let mut info = PluginInfo::default();
    let mut pending: Option<PluginLoadBlock> = None;

    for line in lines {
        if line.contains(ASS_SECTION_MARKER) {
            log::trace!("reached scene section, stopping plugin scan");
            break;
        }

        if line.contains(LOADING_MARKER) {
            if let Some(block) = pending.take()
                && !block.descriptions.is_empty()
            {
                store(&mut info, block);
            }
            pending = Some(PluginLoadBlock::new(load_path(line)));
            continue;
        }

        let Some(block) = pending.as_mut() else {
            continue;
        };

        if line.contains(USES_MARKER) {
            block.descriptions.push(message(line).to_string());
        } else if is_load_summary(line)
            && let Some(mut block) = pending.take()
        {
            block.summary = Some(message(line).to_string());
            block.plugin_count = LOADED_PLUGINS
                .captures(line)
                .map(|caps| parse_or_default(&caps[1]));
            store(&mut info, block);
        }
    }

    if let Some(block) = pending {
        log::debug!("dropping unterminated plugin block for {:?}", block.path);
    }
    info
}

fn store(info: &mut PluginInfo, block: PluginLoadBlock) {
    if block.path.is_empty() {
        log::debug!("plugin block without a load path, skipping");
        return;
    }
    log::debug!(
        "plugin block {:?}: {} descriptions",
        block.path,
        block.descriptions.len()
    );
    info.insert(block);
}

fn is_load_summary(line: &str) -> bool {
    line.contains("loaded") && line.contains("plugins")
}

/// Path named by a `loading plugins from` line. Accepts both
/// `loading plugins from /dir ...` and `loading plugins from | /dir`.
fn load_path(line: &str) -> String {
    let rest = line
        .split_once(LOADING_MARKER)
        .map_or("", |(_, rest)| rest)
        .trim_start();
    let rest = rest.strip_prefix('|').unwrap_or(rest);
    rest.trim().trim_end_matches("...").trim_end().to_string()
}
