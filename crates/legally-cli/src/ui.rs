use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::GlobalFlags;

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub progress: bool,
    pub notifications: bool,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let _ = UI_PREFS.set(resolve(flags, std::io::stderr().is_terminal()));
}

fn resolve(flags: &GlobalFlags, stderr_is_tty: bool) -> UiPrefs {
    UiPrefs {
        progress: stderr_is_tty && !flags.quiet,
        notifications: !flags.quiet,
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        progress: false,
        notifications: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn flags(quiet: bool) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            quiet,
            verbose: false,
        }
    }

    #[test]
    fn quiet_disables_progress_and_notifications() {
        let prefs = resolve(&flags(true), true);
        assert!(!prefs.progress);
        assert!(!prefs.notifications);
    }

    #[test]
    fn progress_needs_a_terminal() {
        assert!(!resolve(&flags(false), false).progress);
        assert!(resolve(&flags(false), true).progress);
    }
}
