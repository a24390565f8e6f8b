#![no_main]

use std::sync::Arc;

use codec::{CodecLimits, CoreProtocol, Registry, Session};
use libfuzzer_sys::fuzz_target;
use wire::Limits;
use world::WorldTable;

fuzz_target!(|data: &[u8]| {
    let Ok(registry) = Registry::with_protocol(&CoreProtocol) else {
        return;
    };
    let mut session = Session::with_limits(
        Arc::new(registry),
        Arc::new(WorldTable::new()),
        Limits::for_testing(),
        CodecLimits::for_testing(),
    );

    // Each leading byte sizes the next chunk pushed into the session.
    let mut idx = 0usize;
    while idx < data.len() && idx < 4096 {
        let len = (data[idx] as usize % 120).saturating_add(1);
        idx += 1;
        let end = (idx + len).min(data.len());
        for result in session.push(&data[idx..end]) {
            let _ = result;
        }
        idx = end;
    }

    let _ = session.world().snapshot();
    session.teardown();
    assert!(session.world().is_empty());
});
