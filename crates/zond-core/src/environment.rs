/// Host details attached to every hit: screen geometry, color depth, locale.
pub trait Environment: Send + Sync {
    /// Available screen size in pixels, reported as `sr=<w>x<h>`.
    fn screen_size(&self) -> (u32, u32);

    /// Color depth in bits, reported as `sd=<n>-bits`.
    fn color_depth(&self) -> u32;

    /// Locale tag, reported as `ul`.
    fn locale(&self) -> String;
}

/// Environment backed by host process state.
///
/// Screen geometry is not discoverable from a plain process, so the defaults
/// match a common desktop; embedders with real display information override
/// the fields or supply their own [`Environment`].
#[derive(Clone, Debug)]
pub struct HostEnvironment {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            depth: 24,
        }
    }
}

impl Environment for HostEnvironment {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn color_depth(&self) -> u32 {
        self.depth
    }

    fn locale(&self) -> String {
        std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LANG"))
            .ok()
            .and_then(|raw| normalize_locale(&raw))
            .unwrap_or_else(|| "en-US".to_string())
    }
}

/// Normalize a POSIX locale string ("en_US.UTF-8") to a wire tag ("en-US").
fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.split('.').next()?.trim();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}
