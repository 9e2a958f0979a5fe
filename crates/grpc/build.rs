fn main() {
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .out_dir("src/generated")
        .compile_protos(&["protos/tts.proto", "protos/stt.proto"], &["protos/"])
        .unwrap_or_else(|e| panic!("failed to compile protos: {e}"));

    println!("cargo:rerun-if-changed=protos/tts.proto");
    println!("cargo:rerun-if-changed=protos/stt.proto");
}
