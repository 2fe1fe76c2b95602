fn main() {
    println!("cargo:rerun-if-changed=logo/logo.ico");

    #[cfg(target_os = "windows")]
    {
        if std::path::Path::new("logo/logo.ico").exists() {
            let mut res = winres::WindowsResource::new();
            res.set_icon("logo/logo.ico");
            res.compile().expect("Failed to compile Windows resources");
        }
    }
}
