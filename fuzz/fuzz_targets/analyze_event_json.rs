#![no_main]

use fk_analysis::{Analysis, AnalysisConfig, RunInfo, Runner};
use fk_core::Event;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(event) = serde_json::from_slice::<Event>(data) else {
        return;
    };

    // No input may panic a selection or the finalization pass.
    for name in AnalysisConfig::names() {
        let Ok(cfg) = AnalysisConfig::default_for(name) else {
            continue;
        };
        let Ok(analysis) = cfg.build() else {
            continue;
        };
        let mut runner = Runner::new(analysis);
        runner.process(&event);
        runner.finalize(&RunInfo::UNKNOWN);
        let _ = runner.analysis().outputs();
    }
});
