fn main() {
    // カメラ機能有効時のみGStreamerのリンクパスを設定（Windows/MSVC環境向け）
    if std::env::var("CARGO_FEATURE_CAMERA").is_ok() {
        if let Ok(root) = std::env::var("GSTREAMER_1_0_ROOT_MSVC_X86_64") {
            let libpath = format!("{}\\lib", root.trim_end_matches('\\'));
            println!("cargo:rustc-link-search=native={}", libpath);
            println!("cargo:rerun-if-env-changed=GSTREAMER_1_0_ROOT_MSVC_X86_64");
        }
    }

    tauri_build::build()
}
