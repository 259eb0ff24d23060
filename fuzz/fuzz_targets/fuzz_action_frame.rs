#![no_main]

use libfuzzer_sys::fuzz_target;
use vaultlink_core::{ActionReply, RemoteAction};

fuzz_target!(|data: &[u8]| {
    if let Ok(action) = serde_json::from_slice::<RemoteAction>(data) {
        // Accessors must hold for every parseable action.
        let _ = action.kind();
        let _ = action.access();
        let _ = action.item_id();

        // Round-trip through the wire encoding.
        let json = serde_json::to_vec(&action).unwrap();
        let action2: RemoteAction = serde_json::from_slice(&json).unwrap();
        assert_eq!(action, action2);
    }

    if let Ok(reply) = serde_json::from_slice::<ActionReply>(data) {
        let json = serde_json::to_vec(&reply).unwrap();
        let reply2: ActionReply = serde_json::from_slice(&json).unwrap();
        assert_eq!(reply, reply2);
    }
});
