fn main() {
    println!("cargo:rerun-if-env-changed=GUROBI_PATH");

    #[cfg(feature = "gurobi")]
    if let Ok(path) = std::env::var("GUROBI_PATH") {
        println!("cargo:rustc-link-search={path}");
    }
}
