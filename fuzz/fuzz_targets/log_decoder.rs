#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlite_query_log::decoder::decode;
use sqlite_query_log::stats::aggregate;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Every non-empty line is either an observation or a reported error
        let report = decode(input);
        let lines = input
            .split('\n')
            .filter(|l| !l.is_empty() && *l != "\r")
            .count();
        assert_eq!(report.observations.len() + report.errors.len(), lines);

        let _ = aggregate(&report.observations, 0);
    }
});
