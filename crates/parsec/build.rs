use rustc_version::{version_meta, Channel};

// NOTE: This is used to activate the 'nightly' feature described in the Cargo.toml file, as we want
//       to support using the on_unimplemented messages on `Parser`.
fn main() {
    if let Ok(meta) = version_meta() {
        if meta.channel == Channel::Nightly {
            println!("cargo:rustc-cfg=feature=\"nightly\"");
        }
    }
}
