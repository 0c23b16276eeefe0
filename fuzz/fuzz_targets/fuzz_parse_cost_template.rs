#![no_main]
use chrono::TimeZone;
use chrono_tz::Europe::Copenhagen;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic; whatever parses must evaluate to a finite value
    if let Ok(template) = energidataservice::pricing::CostTemplate::parse(text)
        && let Some(now) = Copenhagen.with_ymd_and_hms(2024, 3, 31, 2, 0, 0).earliest()
        && let Ok(value) = template.evaluate(now)
    {
        assert!(value.is_finite());
    }
});
