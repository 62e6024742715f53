//! One-time licensing notice
//!
//! The host owns a single [`LicenseNotice`] created at start-up and passes it
//! mutably to whoever emits the notice; `&mut self` makes the single writer
//! explicit. The transport core never reads it.

use tracing::info;

const NOTICE: &str = "Mixpanel integration: usage is subject to the Mixpanel terms of service";

#[derive(Debug, Default)]
pub struct LicenseNotice {
    emitted: bool,
}

impl LicenseNotice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the notice the first time; returns whether this call emitted it.
    pub fn emit_once(&mut self) -> bool {
        if self.emitted {
            return false;
        }
        info!(notice = NOTICE, "license_notice");
        self.emitted = true;
        true
    }

    pub fn has_emitted(&self) -> bool {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_only_once() {
        let mut notice = LicenseNotice::new();
        assert!(!notice.has_emitted());
        assert!(notice.emit_once());
        assert!(!notice.emit_once());
        assert!(notice.has_emitted());
    }
}
