//! Code generated by `tonic-build` from `protos/tts.proto` and `protos/stt.proto`.
//! Regenerated on every build; do not hand-edit.

pub mod tts {
    include!("gateway.tts.rs");
}

pub mod stt {
    include!("gateway.stt.rs");
}
