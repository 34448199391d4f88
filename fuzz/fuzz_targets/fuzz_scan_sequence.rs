//! Fuzz target: `DecisionEngine` over arbitrary scan sequences
//!
//! Each 8-byte record of the input is one control-loop iteration: a UID
//! selector, four UID bytes, a monotonic step and a
//! calendar step (the top bit of which toggles clock sync).  Asserts the
//! engine never panics, never grants beyond the daily maximum, never
//! grants inside the cooldown, and keeps its lifetime counter monotonic.
//!
//! cargo fuzz run fuzz_scan_sequence

#![no_main]

use libfuzzer_sys::fuzz_target;
use rfidgate::access::credential::Uid;
use rfidgate::access::engine::{DecisionEngine, ScanEvent, Verdict};
use rfidgate::config::SystemConfig;

const T0: i64 = 1_700_000_000;

fuzz_target!(|data: &[u8]| {
    let Some((&max, data)) = data.split_first() else {
        return;
    };
    let config = SystemConfig {
        max_daily_scans: u16::from(max % 8) + 1,
        ..SystemConfig::default()
    };
    let cooldown = u64::from(config.cooldown_ms);
    let mut engine = DecisionEngine::from_config(&config);

    let mut mono: u64 = 0;
    let mut cal: i64 = T0;
    let mut synced = false;
    let mut last_grant: Option<u64> = None;
    let mut lifetime = 0;

    for rec in data.chunks_exact(8) {
        mono += u64::from(u16::from_le_bytes([rec[5], rec[6]]));
        cal += i64::from(rec[7] & 0x7F) * 1_000;
        if rec[7] & 0x80 != 0 {
            synced = !synced;
        }
        let calendar = synced.then_some(cal);

        let _ = engine.roll_window(calendar);

        // 0 = no card, 1 = the factory credential so grants actually
        // happen, 2/3 = a 3- or 4-byte UID from the input.
        let uid = match rec[0] % 4 {
            0 => continue,
            1 => Uid::from_slice(&[0xD3, 0xF8, 0x02, 0x1E]),
            n => Uid::from_slice(&rec[1..1 + usize::from(n)]),
        };
        let Ok(uid) = uid else { continue };

        let d = engine.decide(&ScanEvent {
            uid,
            monotonic_ms: mono,
            calendar_secs: calendar,
        });

        if d.verdict == Verdict::Granted {
            if let Some(prev) = last_grant {
                assert!(mono - prev >= cooldown, "grant inside cooldown");
            }
            last_grant = Some(mono);
            lifetime += 1;
            assert_eq!(d.sequence, Some(lifetime));
        }
        assert!(engine.granted_today() <= config.max_daily_scans);
        assert_eq!(engine.lifetime_grants(), lifetime);
    }
});
