use std::env;
use std::path::PathBuf;

// Records where cargo puts this crate's rlib and its dependencies, so a program that
// rebuilds itself can link against the same artifacts.
fn main() {
  println!("cargo:rerun-if-changed=build.rs");

  let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
    return;
  };

  // <target>/<profile>/build/stitch-lib-<hash>/out
  if let Some(profile_dir) = out_dir.ancestors().nth(3) {
    println!("cargo:rustc-env=STITCH_LIB_DEPS_DIR={}", profile_dir.join("deps").display());
  }
}
